pub mod handle;
pub mod state;

pub use handle::inspect;
pub use state::ScopeSnapshot;
