use super::BackupPattern;
use crate::logging;
use crate::object::{Method, Object, Value};
use crate::{MockError, Result};
use std::collections::HashMap;
use std::rc::Rc;

/// A saved original implementation
struct Backup {
    key: String,
    original: Method,
    /// The original lived in the object's own table rather than its class chain
    own: bool,
}

/// Installs, invokes and restores method implementations on one object.
///
/// The first `hook` of a method saves whatever the object resolved that name
/// to; later hooks only replace the active implementation. `restore_all`
/// consumes the interceptor, so it cannot be used afterwards.
pub struct MethodInterceptor {
    target: Object,
    pattern: BackupPattern,
    backups: HashMap<String, Backup>,
}

impl MethodInterceptor {
    pub fn new(target: Object, pattern: BackupPattern) -> Self {
        Self {
            target,
            pattern,
            backups: HashMap::new(),
        }
    }

    pub fn target(&self) -> &Object {
        &self.target
    }

    pub fn pattern(&self) -> &BackupPattern {
        &self.pattern
    }

    /// Install `implementation` as the target's `method`.
    pub fn hook(&mut self, method: &str, implementation: Method) -> Result<()> {
        self.save_original(method)?;
        self.target.install_method(method, implementation);
        Ok(())
    }

    fn save_original(&mut self, method: &str) -> Result<()> {
        if self.backups.contains_key(method) {
            return Ok(());
        }
        let own = self.target.own_method(method);
        let is_own = own.is_some();
        let original = own
            .or_else(|| self.target.class().lookup(method))
            .ok_or_else(|| MockError::NoSuchMethod {
                class: self.target.class_name().to_string(),
                method: method.to_string(),
            })?;
        let key = self.pattern.key_for(method);
        logging::log_backup_saved(self.target.id(), method, &key, !is_own);
        self.backups.insert(
            method.to_string(),
            Backup {
                key,
                original,
                own: is_own,
            },
        );
        Ok(())
    }

    pub fn is_hooked(&self, method: &str) -> bool {
        self.backups.contains_key(method)
    }

    /// Hooked method names, sorted
    pub fn hooked_methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.backups.keys().cloned().collect();
        methods.sort_unstable();
        methods
    }

    pub fn backup_key(&self, method: &str) -> Option<&str> {
        self.backups.get(method).map(|backup| backup.key.as_str())
    }

    /// The saved original of `method`.
    pub fn original(&self, method: &str) -> Result<Method> {
        self.backups
            .get(method)
            .map(|backup| Rc::clone(&backup.original))
            .ok_or_else(|| self.not_hooked(method))
    }

    /// Call the saved original of `method` with the target as receiver.
    pub fn invoke_original(&self, method: &str, args: &[Value]) -> Result<Value> {
        let original = self.original(method)?;
        logging::log_backup_invoked(self.target.id(), method, args.len());
        original(&self.target, args)
    }

    /// Reinstate the original of `method` and forget its backup.
    pub fn restore(&mut self, method: &str) -> Result<()> {
        let backup = self
            .backups
            .remove(method)
            .ok_or_else(|| self.not_hooked(method))?;
        self.reinstate(method, backup);
        Ok(())
    }

    fn reinstate(&self, method: &str, backup: Backup) {
        if backup.own {
            self.target.install_method(method, backup.original);
        } else {
            self.target.remove_method(method);
        }
        logging::log_method_restored(self.target.id(), method);
    }

    /// Restore every hooked method; returns the restored names, sorted.
    pub fn restore_all(mut self) -> Vec<String> {
        let mut restored: Vec<String> = Vec::with_capacity(self.backups.len());
        for (method, backup) in std::mem::take(&mut self.backups) {
            self.reinstate(&method, backup);
            restored.push(method);
        }
        restored.sort_unstable();
        logging::log_interceptor_dropped(self.target.id(), restored.len());
        restored
    }

    fn not_hooked(&self, method: &str) -> MockError {
        MockError::NotHooked {
            object: self.target.id(),
            method: Some(method.to_string()),
        }
    }
}

impl std::fmt::Debug for MethodInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodInterceptor")
            .field("target", &self.target)
            .field("pattern", &self.pattern)
            .field("hooked", &self.hooked_methods())
            .finish()
    }
}
