//! The thread's single scope handle and the public API operating on it.
//!
//! No borrow of the handle is held while user code runs (replacements,
//! originals, wipe listeners), so that code may call back into this API.

use super::state::{ScopeSnapshot, TestScopeState};
use crate::config::ScopeConfig;
use crate::interceptor::MethodInterceptor;
use crate::logging;
use crate::mock::{CallRecord, Mock, ScopeMode};
use crate::object::{Method, Object, Value};
use crate::{MockError, Result};
use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    static SCOPE: RefCell<Option<TestScopeState>> = const { RefCell::new(None) };
}

fn with_scope<R>(f: impl FnOnce(&TestScopeState) -> Result<R>) -> Result<R> {
    SCOPE.with(|cell| {
        let scope = cell.borrow();
        let state = scope.as_ref().ok_or(MockError::NotRegistered)?;
        f(state)
    })
}

fn with_scope_mut<R>(f: impl FnOnce(&mut TestScopeState) -> Result<R>) -> Result<R> {
    SCOPE.with(|cell| {
        let mut scope = cell.borrow_mut();
        let state = scope.as_mut().ok_or(MockError::NotRegistered)?;
        f(state)
    })
}

/// Register `test_case` with the default configuration.
///
/// The test case's `teardown` is wrapped so that running it also calls
/// [`wipe`].
pub fn setup_for(test_case: &Object) -> Result<()> {
    setup_for_with(test_case, ScopeConfig::default())
}

/// Register `test_case` using `config`.
pub fn setup_for_with(test_case: &Object, config: ScopeConfig) -> Result<()> {
    SCOPE.with(|cell| {
        let mut scope = cell.borrow_mut();
        if scope.is_some() {
            return Err(MockError::AlreadyRegistered);
        }
        let teardown = teardown_wrapper(config.interception.teardown_method.clone());
        let state = TestScopeState::new(test_case, config, teardown)?;
        *scope = Some(state);
        logging::log_scope_registered(test_case.id(), test_case.class_name());
        Ok(())
    })
}

/// Whether a scope is active on this thread
pub fn is_active() -> bool {
    SCOPE.with(|cell| cell.borrow().is_some())
}

/// The registered test case
pub fn test_case() -> Result<Object> {
    with_scope(|state| Ok(state.test_case().clone()))
}

/// Run `f` on a snapshot of the active scope.
///
/// The snapshot is taken before `f` runs, so `f` may call back into this API;
/// changes it makes are not reflected in the snapshot it was given.
pub fn inspect<R>(f: impl FnOnce(&ScopeSnapshot) -> R) -> Result<R> {
    let snapshot = with_scope(|state| Ok(state.snapshot()))?;
    Ok(f(&snapshot))
}

/// Define `mock` in `slot`. A slot can be defined once per scope.
pub fn define_mock(slot: impl Into<String>, mock: Mock) -> Result<()> {
    with_scope_mut(|state| state.define_mock(slot, mock))
}

/// Define a replacement that runs with the hooked object as its receiver.
pub fn define_instance_mock<F>(slot: impl Into<String>, body: F) -> Result<()>
where
    F: Fn(&Object, &[Value]) -> Result<Value> + 'static,
{
    define_mock(slot, Mock::instance(body))
}

/// Define a replacement that runs in the defining scope; see [`current_object`].
pub fn define_caller_mock<F>(slot: impl Into<String>, body: F) -> Result<()>
where
    F: Fn(&[Value]) -> Result<Value> + 'static,
{
    define_mock(slot, Mock::caller(body))
}

/// Hook the mock in `slot` onto `object` as `method`.
///
/// The original is saved the first time a given object/method pair is
/// hooked; hooking the same pair again only swaps the active replacement.
pub fn hook(slot: &str, object: &Object, method: &str) -> Result<()> {
    with_scope_mut(|state| state.hook(slot, object, method))
}

/// Invoke `object`'s original `method`. Only possible while it is hooked.
pub fn invoke_backup(object: &Object, method: &str, args: &[Value]) -> Result<Value> {
    let original = with_scope(|state| state.original(object, method))?;
    logging::log_backup_invoked(object.id(), method, args.len());
    original(object, args)
}

/// Restore the original `method` of `object`.
pub fn restore(object: &Object, method: &str) -> Result<()> {
    with_scope_mut(|state| state.restore(object, method))
}

/// Restore every hooked method of `object`; returns their names.
pub fn restore_all(object: &Object) -> Result<Vec<String>> {
    with_scope_mut(|state| state.restore_all(object))
}

/// Methods of `object` currently hooked, sorted
pub fn hooked_methods(object: &Object) -> Result<Vec<String>> {
    with_scope(|state| Ok(state.hooked_methods(object)))
}

/// The object the running caller-scoped mock stands in for.
///
/// `None` outside a caller-scoped mock.
pub fn current_object() -> Result<Option<Object>> {
    with_scope(|state| Ok(state.context().object().cloned()))
}

/// The method the running caller-scoped mock replaces.
///
/// `None` outside a caller-scoped mock.
pub fn current_method() -> Result<Option<String>> {
    with_scope(|state| Ok(state.context().method().map(str::to_string)))
}

/// Value stored under `key`; the store is cleared by [`wipe`].
pub fn get(key: &str) -> Result<Option<Value>> {
    with_scope(|state| Ok(state.get(key)))
}

pub fn set(key: impl Into<String>, value: Value) -> Result<()> {
    with_scope_mut(|state| {
        state.set(key, value);
        Ok(())
    })
}

/// Invocations recorded so far, oldest first
pub fn calls() -> Result<Vec<CallRecord>> {
    with_scope(|state| Ok(state.calls().to_vec()))
}

/// Defined slot names, sorted
pub fn slots() -> Result<Vec<String>> {
    with_scope(|state| Ok(state.slots().names()))
}

/// Run `listener` at the start of the next [`wipe`], while the scope is
/// still active.
pub fn on_wipe(listener: impl FnOnce() + 'static) -> Result<()> {
    with_scope_mut(|state| {
        state.on_wipe(Box::new(listener));
        Ok(())
    })
}

/// Restore everything and unregister the test case.
///
/// Use [`setup_for`] again before the next use.
pub fn wipe() -> Result<()> {
    let listeners = with_scope_mut(|state| Ok(state.take_wipe_listeners()))?;
    if !listeners.is_empty() {
        logging::log_wipe_listeners(listeners.len());
    }
    for listener in listeners {
        listener();
    }

    // A listener may already have wiped the scope itself.
    let Some(state) = SCOPE.with(|cell| cell.borrow_mut().take()) else {
        return Ok(());
    };
    let (objects, methods) = state.restore_everything();
    logging::log_scope_wiped(objects, methods);
    Ok(())
}

pub(crate) fn record_call(object: &Object, method: &str, slot: &str, mode: ScopeMode, args: &[Value]) {
    let recorded = with_scope_mut(|state| {
        state.record_call(CallRecord::new(object, method, slot, mode, args));
        Ok(())
    });
    if recorded.is_err() {
        logging::log_call_outside_scope(object.id(), method, slot);
    }
}

pub(crate) fn enter_call(object: &Object, method: &str, slot: &str, args: &[Value]) -> Result<()> {
    with_scope_mut(|state| state.enter_call(object, method, slot, args))
}

pub(crate) fn leave_call() {
    let _ = SCOPE.try_with(|cell| {
        if let Ok(mut scope) = cell.try_borrow_mut() {
            if let Some(state) = scope.as_mut() {
                state.leave_call();
            }
        }
    });
}

/// Method installed over the test case's teardown.
///
/// Runs the original teardown, un-wraps it and wipes the scope. The last two
/// steps also happen when the original fails or panics; an error from the
/// original takes precedence over one from the cleanup.
fn teardown_wrapper(teardown_method: String) -> Method {
    Rc::new(move |_this: &Object, args: &[Value]| {
        let interceptor = with_scope_mut(|state| {
            state
                .take_test_case_interceptor()
                .ok_or_else(|| MockError::NotHooked {
                    object: state.test_case().id(),
                    method: Some(teardown_method.clone()),
                })
        })?;

        let guard = TeardownGuard {
            interceptor: Some(interceptor),
        };
        let result = guard.invoke_original(&teardown_method, args);
        let cleanup = guard.finish();

        match (result, cleanup) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup_error)) => {
                logging::log_teardown_cleanup_failed(&cleanup_error);
                Err(e)
            }
        }
    })
}

fn detach_interceptor(object: &Object) -> Option<MethodInterceptor> {
    with_scope_mut(|state| Ok(state.detach_interceptor(object)))
        .ok()
        .flatten()
}

/// Restores the test case and wipes the scope once teardown is over.
struct TeardownGuard {
    interceptor: Option<MethodInterceptor>,
}

impl TeardownGuard {
    fn invoke_original(&self, method: &str, args: &[Value]) -> Result<Value> {
        match &self.interceptor {
            Some(interceptor) => interceptor.invoke_original(method, args),
            None => Err(MockError::NotRegistered),
        }
    }

    fn finish(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        if let Some(interceptor) = self.interceptor.take() {
            // Hooks on the test case sit on top of the teardown wrapper and
            // must come off first, or restoring them reinstates the wrapper.
            if let Some(hooks) = detach_interceptor(interceptor.target()) {
                hooks.restore_all();
            }
            interceptor.restore_all();
        }
        // The original teardown may already have wiped the scope itself.
        if is_active() {
            wipe()
        } else {
            Ok(())
        }
    }
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        if self.interceptor.is_some() {
            if let Err(e) = self.release() {
                logging::log_teardown_cleanup_failed(&e);
            }
        }
    }
}
