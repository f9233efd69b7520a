use super::ScopeMode;
use crate::object::{Object, ObjectId, Value};
use serde::{Deserialize, Serialize};

/// One invocation that reached a hooked replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub object: ObjectId,
    pub class: String,
    pub method: String,
    pub slot: String,
    pub mode: ScopeMode,
    pub args: Vec<Value>,
}

impl CallRecord {
    pub fn new(object: &Object, method: &str, slot: &str, mode: ScopeMode, args: &[Value]) -> Self {
        Self {
            object: object.id(),
            class: object.class_name().to_string(),
            method: method.to_string(),
            slot: slot.to_string(),
            mode,
            args: args.to_vec(),
        }
    }

    pub fn is_for(&self, object: &Object, method: &str) -> bool {
        self.object == object.id() && self.method == method
    }
}
