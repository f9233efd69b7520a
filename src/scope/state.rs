use crate::config::ScopeConfig;
use crate::interceptor::{BackupPattern, InterceptorRegistry, MethodInterceptor};
use crate::logging;
use crate::mock::{dispatcher, CallContext, CallRecord, Mock, MockSlotTable, ScopeMode};
use crate::object::{Method, Object, ObjectId, Value};
use crate::{MockError, Result};
use std::collections::{BTreeMap, HashMap};

pub(crate) type WipeListener = Box<dyn FnOnce()>;

/// Everything that exists between `setup_for` and `wipe`.
///
/// Holding a `TestScopeState` means the scope is Active; dropping it back to
/// `None` in the thread's handle means Unregistered.
pub(crate) struct TestScopeState {
    config: ScopeConfig,
    object_pattern: BackupPattern,
    test_case: Object,
    test_case_interceptor: Option<MethodInterceptor>,
    slots: MockSlotTable,
    registry: InterceptorRegistry,
    store: HashMap<String, Value>,
    context: CallContext,
    calls: Vec<CallRecord>,
    wipe_listeners: Vec<WipeListener>,
}

impl TestScopeState {
    /// Build the state and install `teardown` over the test case's teardown method.
    pub(crate) fn new(test_case: &Object, config: ScopeConfig, teardown: Method) -> Result<Self> {
        let (object_pattern, test_case_pattern) = config.backup_patterns()?;
        let teardown_method = config.interception.teardown_method.clone();

        let mut test_case_interceptor = MethodInterceptor::new(test_case.clone(), test_case_pattern);
        test_case_interceptor.hook(&teardown_method, teardown)?;
        logging::log_teardown_wrapped(test_case.id(), &teardown_method);

        Ok(Self {
            config,
            object_pattern,
            test_case: test_case.clone(),
            test_case_interceptor: Some(test_case_interceptor),
            slots: MockSlotTable::new(),
            registry: InterceptorRegistry::new(),
            store: HashMap::new(),
            context: CallContext::new(),
            calls: Vec::new(),
            wipe_listeners: Vec::new(),
        })
    }

    pub(crate) fn test_case(&self) -> &Object {
        &self.test_case
    }

    pub(crate) fn slots(&self) -> &MockSlotTable {
        &self.slots
    }

    pub(crate) fn context(&self) -> &CallContext {
        &self.context
    }

    pub(crate) fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    /// Copy of everything observable, detached from the live state.
    pub(crate) fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            config: self.config.clone(),
            test_case: self.test_case.clone(),
            teardown_wrapped: self.test_case_interceptor.is_some(),
            slots: self.slots.names(),
            hooked: self.registry.hooked(),
            store: self
                .store
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            calls: self.calls.clone(),
            current: self
                .context
                .object()
                .cloned()
                .zip(self.context.method().map(str::to_string)),
        }
    }

    pub(crate) fn define_mock(&mut self, slot: impl Into<String>, mock: Mock) -> Result<()> {
        let slot = slot.into();
        let mode = mock.mode();
        self.slots.define(slot.clone(), mock)?;
        logging::log_mock_defined(&slot, mode);
        Ok(())
    }

    /// Install the replacement of `slot` as `object`'s `method`.
    ///
    /// Nothing is registered when the slot or the method is unknown.
    pub(crate) fn hook(&mut self, slot: &str, object: &Object, method: &str) -> Result<()> {
        let mock = self.slots.get(slot)?;
        if !object.responds_to(method) {
            return Err(MockError::NoSuchMethod {
                class: object.class_name().to_string(),
                method: method.to_string(),
            });
        }
        let mode = mock.mode();
        let installed = dispatcher::install(slot, method, mock);
        self.registry
            .get_or_create(object, &self.object_pattern)
            .hook(method, installed)?;
        logging::log_hook_installed(object.id(), method, slot, mode);
        Ok(())
    }

    pub(crate) fn original(&self, object: &Object, method: &str) -> Result<Method> {
        self.registry
            .lookup(object)
            .ok_or_else(|| not_hooked(object, method))?
            .original(method)
    }

    pub(crate) fn restore(&mut self, object: &Object, method: &str) -> Result<()> {
        self.registry
            .lookup_mut(object)
            .ok_or_else(|| not_hooked(object, method))?
            .restore(method)
    }

    pub(crate) fn restore_all(&mut self, object: &Object) -> Result<Vec<String>> {
        self.registry.restore_all(object)
    }

    pub(crate) fn hooked_methods(&self, object: &Object) -> Vec<String> {
        self.registry
            .lookup(object)
            .map(MethodInterceptor::hooked_methods)
            .unwrap_or_default()
    }

    pub(crate) fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key).cloned()
    }

    pub(crate) fn set(&mut self, key: impl Into<String>, value: Value) {
        self.store.insert(key.into(), value);
    }

    pub(crate) fn record_call(&mut self, record: CallRecord) {
        if self.config.interception.record_calls {
            self.calls.push(record);
        }
    }

    /// Publish `object`/`method` as the call context and record the call.
    pub(crate) fn enter_call(
        &mut self,
        object: &Object,
        method: &str,
        slot: &str,
        args: &[Value],
    ) -> Result<()> {
        self.context.enter(object, method)?;
        self.record_call(CallRecord::new(object, method, slot, ScopeMode::Caller, args));
        Ok(())
    }

    pub(crate) fn leave_call(&mut self) {
        self.context.clear();
    }

    pub(crate) fn on_wipe(&mut self, listener: WipeListener) {
        self.wipe_listeners.push(listener);
    }

    pub(crate) fn take_wipe_listeners(&mut self) -> Vec<WipeListener> {
        std::mem::take(&mut self.wipe_listeners)
    }

    /// Remove the interceptor of `object` from the registry without restoring it.
    pub(crate) fn detach_interceptor(&mut self, object: &Object) -> Option<MethodInterceptor> {
        self.registry.remove(object)
    }

    pub(crate) fn take_test_case_interceptor(&mut self) -> Option<MethodInterceptor> {
        self.test_case_interceptor.take()
    }

    /// Undo every interception, including the teardown wrapper if present.
    ///
    /// Returns the number of objects and methods restored.
    pub(crate) fn restore_everything(mut self) -> (usize, usize) {
        let objects = self.registry.len();
        let mut methods = self.registry.restore_everything();
        if let Some(interceptor) = self.test_case_interceptor.take() {
            methods += interceptor.restore_all().len();
        }
        (objects, methods)
    }
}

fn not_hooked(object: &Object, method: &str) -> MockError {
    MockError::NotHooked {
        object: object.id(),
        method: Some(method.to_string()),
    }
}

/// Read-only copy of an active scope, as handed out by [`inspect`].
///
/// [`inspect`]: crate::inspect
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSnapshot {
    config: ScopeConfig,
    test_case: Object,
    teardown_wrapped: bool,
    slots: Vec<String>,
    hooked: Vec<(ObjectId, Vec<String>)>,
    store: BTreeMap<String, Value>,
    calls: Vec<CallRecord>,
    current: Option<(Object, String)>,
}

impl ScopeSnapshot {
    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn test_case(&self) -> &Object {
        &self.test_case
    }

    /// Whether the test case's teardown was still wrapped
    pub fn teardown_wrapped(&self) -> bool {
        self.teardown_wrapped
    }

    /// Defined slot names, sorted
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Intercepted objects with their hooked methods, ordered by object id
    pub fn hooked(&self) -> &[(ObjectId, Vec<String>)] {
        &self.hooked
    }

    pub fn store(&self) -> &BTreeMap<String, Value> {
        &self.store
    }

    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    /// Object and method of the caller-scoped mock that was running, if any
    pub fn current(&self) -> Option<(&Object, &str)> {
        self.current
            .as_ref()
            .map(|(object, method)| (object, method.as_str()))
    }
}

impl std::fmt::Debug for TestScopeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestScopeState")
            .field("test_case", &self.test_case)
            .field("slots", &self.slots.names())
            .field("interceptors", &self.registry.len())
            .field("store", &self.store.len())
            .field("calls", &self.calls.len())
            .finish()
    }
}
