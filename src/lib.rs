//! Temporarily replace methods on live objects for the duration of a test.
//!
//! A test registers itself with [`setup_for`], defines replacement
//! implementations in named slots with [`define_mock`], and installs them onto
//! methods of concrete objects with [`hook`]. Every change is reverted by
//! [`wipe`], which the test case's own `teardown` method calls automatically
//! once [`setup_for`] has wrapped it.
//!
//! Objects live in the small dynamic object model of the [`object`] module:
//! method calls are explicit lookups in a per-object dispatch table, which is
//! what makes rebinding a single object's method possible.

pub mod config;
pub mod interceptor;
pub mod logging;
pub mod mock;
pub mod object;
pub mod scope;

use miette::Diagnostic;

pub use config::ScopeConfig;
pub use interceptor::{BackupPattern, InterceptorRegistry, MethodInterceptor};
pub use mock::{CallContext, CallRecord, Mock, MockSlotTable, ScopeMode};
pub use object::{Class, ClassBuilder, Method, Object, ObjectId, Value};
pub use scope::handle::{
    calls, current_method, current_object, define_caller_mock, define_instance_mock, define_mock,
    get, hook, hooked_methods, invoke_backup, is_active, on_wipe, restore, restore_all, set,
    setup_for, setup_for_with, slots, test_case, wipe,
};
pub use scope::{inspect, ScopeSnapshot};

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, MockError>;

/// Errors raised by interception operations and by method bodies
#[derive(Debug, Clone, PartialEq, thiserror::Error, Diagnostic)]
pub enum MockError {
    #[error("already set up for a test case object")]
    #[diagnostic(
        code(partialmock::already_registered),
        help("Only one scope can be active per thread. Let the test case's teardown run, or call `wipe`, before calling `setup_for` again.")
    )]
    AlreadyRegistered,

    #[error("not set up for a test case object")]
    #[diagnostic(
        code(partialmock::not_registered),
        help("Call `setup_for(&test_case)` at the start of the test, before any other operation.")
    )]
    NotRegistered,

    #[error("already have a mock method in slot '{0}'")]
    #[diagnostic(
        code(partialmock::slot_already_defined),
        help("Slots are defined once per scope. Pick a different slot name or reuse the existing definition.")
    )]
    SlotAlreadyDefined(String),

    #[error("unknown slot '{0}'")]
    #[diagnostic(
        code(partialmock::unknown_slot),
        help("Define the slot with `define_mock` before hooking it.")
    )]
    UnknownSlot(String),

    #[error("unknown method '{method}' for instance of {class}")]
    #[diagnostic(
        code(partialmock::no_such_method),
        help("Only methods the object can already respond to (directly, through a mixin or a superclass) can be hooked.")
    )]
    NoSuchMethod { class: String, method: String },

    #[error("{}", not_hooked_message(.object, .method.as_deref()))]
    #[diagnostic(
        code(partialmock::not_hooked),
        help("`restore`, `restore_all` and `invoke_backup` only work on methods that are currently hooked.")
    )]
    NotHooked {
        object: ObjectId,
        method: Option<String>,
    },

    #[error("caller-scoped mock for '{method}' invoked while another caller-scoped mock is running")]
    #[diagnostic(
        code(partialmock::nested_caller_scope),
        help("The current object/method context holds a single entry. Use an instance-scoped mock for calls made from inside a caller-scoped mock.")
    )]
    NestedCallerScope { method: String },

    #[error("invalid backup pattern '{0}'")]
    #[diagnostic(
        code(partialmock::invalid_backup_pattern),
        help("Backup patterns must contain the placeholder `<meth>`, e.g. \"saved method <meth>\".")
    )]
    InvalidBackupPattern(String),

    #[error("configuration error: {0}")]
    #[diagnostic(
        code(partialmock::config),
        help("Check that .partialmock.toml is readable and valid TOML.")
    )]
    Config(String),

    #[error("{0}")]
    #[diagnostic(code(partialmock::raised))]
    Raised(String),
}

impl MockError {
    /// Error raised from inside a method body
    pub fn raised(message: impl Into<String>) -> Self {
        MockError::Raised(message.into())
    }
}

fn not_hooked_message(object: &ObjectId, method: Option<&str>) -> String {
    match method {
        Some(method) => format!("method '{method}' of object {object} has not been hooked"),
        None => format!("object {object} has no hooked methods"),
    }
}
