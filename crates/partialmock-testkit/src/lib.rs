pub mod assertions;
pub mod builder;
pub mod harness;
pub mod storage;

pub use assertions::CallAssertions;
pub use builder::MockScopeBuilder;
pub use harness::{run_test, run_test_with, TestCaseStub};
pub use storage::StoreHelper;

/// Install a tracing subscriber for tests, honouring `.partialmock.toml`.
pub fn init_tracing() {
    let config = partialmock::ScopeConfig::load_or_default();
    partialmock::logging::init_tracing(&config.logging);
}
