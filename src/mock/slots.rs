use crate::object::{Method, Object, Value};
use crate::{MockError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// How a hooked replacement sees the intercepted object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// Runs as a method of the target: the target is its receiver
    Instance,
    /// Runs in the scope that defined it; the target is exposed through
    /// `current_object` / `current_method`
    Caller,
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeMode::Instance => f.write_str("instance"),
            ScopeMode::Caller => f.write_str("caller"),
        }
    }
}

/// Body of a caller-scoped replacement
pub type CallerFn = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// A replacement implementation together with its scope-mode
#[derive(Clone)]
pub enum Mock {
    Instance(Method),
    Caller(CallerFn),
}

impl Mock {
    pub fn instance<F>(body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value> + 'static,
    {
        Mock::Instance(Rc::new(body))
    }

    pub fn caller<F>(body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Mock::Caller(Rc::new(body))
    }

    pub fn mode(&self) -> ScopeMode {
        match self {
            Mock::Instance(_) => ScopeMode::Instance,
            Mock::Caller(_) => ScopeMode::Caller,
        }
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mock({})", self.mode())
    }
}

/// Slot name -> replacement, each slot defined at most once
#[derive(Debug, Default)]
pub struct MockSlotTable {
    slots: HashMap<String, Mock>,
}

impl MockSlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, slot: impl Into<String>, mock: Mock) -> Result<()> {
        let slot = slot.into();
        if self.slots.contains_key(&slot) {
            return Err(MockError::SlotAlreadyDefined(slot));
        }
        self.slots.insert(slot, mock);
        Ok(())
    }

    pub fn get(&self, slot: &str) -> Result<&Mock> {
        self.slots
            .get(slot)
            .ok_or_else(|| MockError::UnknownSlot(slot.to_string()))
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    /// Defined slot names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.slots.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
