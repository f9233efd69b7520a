pub mod calls;
pub mod context;
pub(crate) mod dispatcher;
pub mod slots;

pub use calls::CallRecord;
pub use context::CallContext;
pub use slots::{CallerFn, Mock, MockSlotTable, ScopeMode};
