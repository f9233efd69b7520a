use partialmock::{MockError, Result};
use serde_json::Value;

pub struct StoreHelper;

impl StoreHelper {
    /// Copy every top-level entry of a JSON object into the scope's store.
    ///
    /// Returns the number of keys written.
    pub fn populate_from_json(json: &Value) -> Result<usize> {
        let entries = json.as_object().ok_or_else(|| {
            MockError::Config(format!("store seed must be a JSON object, got {}", json))
        })?;
        for (key, value) in entries {
            partialmock::set(key.clone(), value.clone())?;
        }
        tracing::debug!(keys = entries.len(), "Store populated");
        Ok(entries.len())
    }
}
