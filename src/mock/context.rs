use crate::object::Object;
use crate::{MockError, Result};

/// The object and method a caller-scoped replacement is standing in for.
///
/// This is a single cell, not a stack: only one caller-scoped replacement can
/// run at a time. A second one entering while the cell is occupied is
/// rejected with [`MockError::NestedCallerScope`].
#[derive(Debug, Default)]
pub struct CallContext {
    current: Option<(Object, String)>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, object: &Object, method: &str) -> Result<()> {
        if self.current.is_some() {
            return Err(MockError::NestedCallerScope {
                method: method.to_string(),
            });
        }
        self.current = Some((object.clone(), method.to_string()));
        Ok(())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn object(&self) -> Option<&Object> {
        self.current.as_ref().map(|(object, _)| object)
    }

    pub fn method(&self) -> Option<&str> {
        self.current.as_ref().map(|(_, method)| method.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}
