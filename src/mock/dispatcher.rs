//! Turns a slot's [`Mock`] into the method actually installed on a target.
//!
//! Instance-scoped replacements are installed as they are, apart from call
//! recording. Caller-scoped replacements are wrapped: the wrapper publishes
//! the intercepted object and method as the scope's [`CallContext`] for the
//! duration of the call, then clears it again however the call ends.
//!
//! [`CallContext`]: super::CallContext

use super::{CallerFn, Mock, ScopeMode};
use crate::logging;
use crate::object::{Method, Object, Value};
use crate::scope::handle;
use std::rc::Rc;

/// Build the implementation to install for `slot` on `method`.
pub(crate) fn install(slot: &str, method: &str, mock: &Mock) -> Method {
    match mock {
        Mock::Instance(body) => instance_scoped(slot, method, Rc::clone(body)),
        Mock::Caller(body) => caller_scoped(slot, method, Rc::clone(body)),
    }
}

fn instance_scoped(slot: &str, method: &str, body: Method) -> Method {
    let slot = slot.to_string();
    let method = method.to_string();
    Rc::new(move |this: &Object, args: &[Value]| {
        logging::log_intercepted_call(this.id(), &method, &slot, args.len());
        handle::record_call(this, &method, &slot, ScopeMode::Instance, args);
        body(this, args)
    })
}

fn caller_scoped(slot: &str, method: &str, body: CallerFn) -> Method {
    let slot = slot.to_string();
    let method = method.to_string();
    Rc::new(move |this: &Object, args: &[Value]| {
        logging::log_intercepted_call(this.id(), &method, &slot, args.len());
        handle::enter_call(this, &method, &slot, args)?;
        let _context = ContextGuard;
        body(args)
    })
}

/// Clears the call context when dropped, including during unwinding.
struct ContextGuard;

impl Drop for ContextGuard {
    fn drop(&mut self) {
        handle::leave_call();
    }
}
