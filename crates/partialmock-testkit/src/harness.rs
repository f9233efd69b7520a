use partialmock::{Class, Object, Result, ScopeConfig, Value};
use serde_json::json;

/// Field of the stub counting how often its original teardown ran
pub const TEARDOWN_COUNT_FIELD: &str = "teardown_count";

/// A minimal test case object: `setup` does nothing, `teardown` returns a
/// fixed value and counts its runs.
pub struct TestCaseStub {
    object: Object,
}

impl Default for TestCaseStub {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCaseStub {
    pub fn new() -> Self {
        Self::returning(Value::Null)
    }

    /// Stub whose original teardown returns `value`
    pub fn returning(value: Value) -> Self {
        let class = Class::builder("TestCaseStub")
            .method("setup", |_, _| Ok(Value::Null))
            .method("teardown", move |this, _| {
                let runs = this
                    .get(TEARDOWN_COUNT_FIELD)
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0);
                this.set(TEARDOWN_COUNT_FIELD, json!(runs + 1));
                Ok(value.clone())
            })
            .build();
        Self {
            object: Object::new(&class),
        }
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    /// How often the original teardown ran
    pub fn teardown_count(&self) -> u64 {
        self.object
            .get(TEARDOWN_COUNT_FIELD)
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    }

    /// Run the (possibly wrapped) teardown as the framework would.
    pub fn teardown(&self) -> Result<Value> {
        self.object.call("teardown", &[])
    }
}

/// Run `body` the way a test framework runs one test.
///
/// A fresh [`TestCaseStub`] is registered with the default configuration,
/// `body` runs, and the stub's teardown runs afterwards even when `body`
/// fails, leaving no scope behind. The body's error wins over a teardown
/// error.
pub fn run_test<T, F>(body: F) -> Result<T>
where
    F: FnOnce(&TestCaseStub) -> Result<T>,
{
    run_test_with(ScopeConfig::default(), body)
}

/// [`run_test`] with an explicit configuration.
pub fn run_test_with<T, F>(config: ScopeConfig, body: F) -> Result<T>
where
    F: FnOnce(&TestCaseStub) -> Result<T>,
{
    let stub = TestCaseStub::new();
    partialmock::setup_for_with(stub.object(), config)?;
    tracing::debug!(test_case = %stub.object().id(), "Running test body");

    let outcome = body(&stub);
    let teardown = stub.teardown();
    let result = match (outcome, teardown) {
        (Ok(value), Ok(_)) => Ok(value),
        (Err(e), _) => Err(e),
        (Ok(_), Err(e)) => Err(e),
    };
    if partialmock::is_active() {
        // The body replaced the teardown wrapper itself; clean up regardless.
        tracing::warn!("Scope still active after teardown; wiping");
        partialmock::wipe()?;
    }
    result
}
