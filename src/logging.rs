//! Structured logging helpers for interception events.
//!
//! All events go through the `tracing` crate so that a test binary can
//! decide what to see with a subscriber; see [`init_tracing`].

use crate::config::LoggingConfig;
use crate::mock::ScopeMode;
use crate::object::ObjectId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted before `RUST_LOG`
pub const LOG_ENV_VAR: &str = "PARTIALMOCK_LOG";

/// Environment variable that switches the test subscriber to JSON output
pub const LOG_JSON_ENV_VAR: &str = "PARTIALMOCK_LOG_JSON";

const FALLBACK_FILTER: &str = "partialmock=warn";

/// Install a subscriber suited for test binaries.
///
/// Output goes through the libtest capture writer. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .or_else(|| {
            config
                .filter
                .as_deref()
                .and_then(|directives| EnvFilter::try_new(directives).ok())
        })
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_FILTER));

    let use_json = std::env::var(LOG_JSON_ENV_VAR).is_ok() || config.json.unwrap_or(false);

    let result = if use_json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_test_writer()
            .with_target(true)
            .with_level(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_level(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
    };

    if result.is_err() {
        tracing::trace!("Tracing subscriber already installed");
    }
}

/// Log scope activation.
pub fn log_scope_registered(test_case: ObjectId, class: &str) {
    tracing::info!(test_case = %test_case, class, "Scope registered");
}

/// Log scope teardown.
pub fn log_scope_wiped(objects: usize, methods: usize) {
    tracing::info!(objects, methods, "Scope wiped");
}

pub fn log_wipe_listeners(count: usize) {
    tracing::debug!(count, "Running wipe listeners");
}

/// Log a slot definition.
pub fn log_mock_defined(slot: &str, mode: ScopeMode) {
    tracing::debug!(slot, mode = %mode, "Mock defined");
}

/// Log that a slot was installed on an object.
pub fn log_hook_installed(object: ObjectId, method: &str, slot: &str, mode: ScopeMode) {
    tracing::debug!(object = %object, method, slot, mode = %mode, "Hook installed");
}

pub fn log_backup_saved(object: ObjectId, method: &str, backup_key: &str, inherited: bool) {
    tracing::debug!(object = %object, method, backup_key, inherited, "Original saved");
}

pub fn log_method_restored(object: ObjectId, method: &str) {
    tracing::debug!(object = %object, method, "Original restored");
}

pub fn log_interceptor_dropped(object: ObjectId, restored: usize) {
    tracing::debug!(object = %object, restored, "Interceptor dropped");
}

pub fn log_backup_invoked(object: ObjectId, method: &str, args: usize) {
    tracing::debug!(object = %object, method, args, "Invoking original");
}

/// Log an intercepted invocation.
pub fn log_intercepted_call(object: ObjectId, method: &str, slot: &str, args: usize) {
    tracing::trace!(object = %object, method, slot, args, "Intercepted call");
}

/// Log a call that reached a replacement after its scope was gone.
pub fn log_call_outside_scope(object: ObjectId, method: &str, slot: &str) {
    tracing::warn!(
        object = %object,
        method,
        slot,
        "Intercepted call outside an active scope; not recorded"
    );
}

pub fn log_teardown_wrapped(test_case: ObjectId, method: &str) {
    tracing::debug!(test_case = %test_case, method, "Teardown wrapped");
}

/// Log a failure while unwinding the teardown wrapper.
pub fn log_teardown_cleanup_failed(error: &dyn std::fmt::Display) {
    tracing::error!(error = %error, "Cleanup after teardown failed");
}
