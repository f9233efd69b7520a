use super::{BackupPattern, MethodInterceptor};
use crate::object::{Object, ObjectId};
use crate::{MockError, Result};
use std::collections::HashMap;

/// At most one [`MethodInterceptor`] per object
#[derive(Debug, Default)]
pub struct InterceptorRegistry {
    interceptors: HashMap<ObjectId, MethodInterceptor>,
}

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing interceptor for `object`, or a fresh one using `pattern`.
    pub fn get_or_create(
        &mut self,
        object: &Object,
        pattern: &BackupPattern,
    ) -> &mut MethodInterceptor {
        self.interceptors
            .entry(object.id())
            .or_insert_with(|| MethodInterceptor::new(object.clone(), pattern.clone()))
    }

    pub fn lookup(&self, object: &Object) -> Option<&MethodInterceptor> {
        self.interceptors.get(&object.id())
    }

    pub fn lookup_mut(&mut self, object: &Object) -> Option<&mut MethodInterceptor> {
        self.interceptors.get_mut(&object.id())
    }

    pub fn contains(&self, object: &Object) -> bool {
        self.interceptors.contains_key(&object.id())
    }

    pub fn remove(&mut self, object: &Object) -> Option<MethodInterceptor> {
        self.interceptors.remove(&object.id())
    }

    /// Drop the interceptor of `object` after restoring all of its methods.
    pub fn restore_all(&mut self, object: &Object) -> Result<Vec<String>> {
        let interceptor = self.remove(object).ok_or(MockError::NotHooked {
            object: object.id(),
            method: None,
        })?;
        Ok(interceptor.restore_all())
    }

    /// Restore every registered object and empty the registry.
    ///
    /// Returns the number of methods restored.
    pub fn restore_everything(&mut self) -> usize {
        self.interceptors
            .drain()
            .map(|(_, interceptor)| interceptor.restore_all().len())
            .sum()
    }

    /// Every intercepted object with its hooked methods, ordered by object id
    pub fn hooked(&self) -> Vec<(ObjectId, Vec<String>)> {
        let mut hooked: Vec<(ObjectId, Vec<String>)> = self
            .interceptors
            .iter()
            .map(|(id, interceptor)| (*id, interceptor.hooked_methods()))
            .collect();
        hooked.sort_unstable_by_key(|(id, _)| *id);
        hooked
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}
