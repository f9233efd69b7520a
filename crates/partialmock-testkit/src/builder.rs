use crate::storage::StoreHelper;
use partialmock::{Mock, Object, Result, ScopeConfig};
use serde_json::Value;
use std::path::Path;

/// Fluent setup of a scope: configuration, store contents, mocks and hooks.
pub struct MockScopeBuilder {
    config: ScopeConfig,
    store: Vec<Value>,
    mocks: Vec<(String, Mock)>,
    hooks: Vec<(String, Object, String)>,
}

impl Default for MockScopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScopeBuilder {
    pub fn new() -> Self {
        Self::from_config(ScopeConfig::default())
    }

    pub fn from_config(config: ScopeConfig) -> Self {
        Self {
            config,
            store: Vec::new(),
            mocks: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Start from the configuration file at `path` (defaults if missing).
    pub fn from_config_file(path: &Path) -> Result<Self> {
        Ok(Self::from_config(ScopeConfig::load_from(path)?))
    }

    pub fn with_store_json(mut self, json: &Value) -> Self {
        self.store.push(json.clone());
        self
    }

    pub fn with_mock(mut self, slot: impl Into<String>, mock: Mock) -> Self {
        self.mocks.push((slot.into(), mock));
        self
    }

    pub fn with_hook(mut self, slot: impl Into<String>, object: &Object, method: impl Into<String>) -> Self {
        self.hooks.push((slot.into(), object.clone(), method.into()));
        self
    }

    /// Register `test_case` and apply everything, in declaration order.
    ///
    /// If a step fails the scope is wiped again before the error is returned.
    pub fn build(self, test_case: &Object) -> Result<()> {
        partialmock::setup_for_with(test_case, self.config)?;
        let applied = Self::apply(self.store, self.mocks, self.hooks);
        if applied.is_err() {
            partialmock::wipe()?;
        }
        applied
    }

    fn apply(
        store: Vec<Value>,
        mocks: Vec<(String, Mock)>,
        hooks: Vec<(String, Object, String)>,
    ) -> Result<()> {
        for json in &store {
            StoreHelper::populate_from_json(json)?;
        }
        for (slot, mock) in mocks {
            partialmock::define_mock(slot, mock)?;
        }
        for (slot, object, method) in &hooks {
            partialmock::hook(slot, object, method)?;
        }
        Ok(())
    }
}
