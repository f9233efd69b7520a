use partialmock::{CallRecord, Object};

/// Assertions over the calls recorded in the active scope.
///
/// Every method panics with a descriptive message when the expectation does
/// not hold, or when no scope is active.
pub struct CallAssertions;

impl CallAssertions {
    fn recorded() -> Vec<CallRecord> {
        match partialmock::calls() {
            Ok(calls) => calls,
            Err(e) => panic!("cannot inspect calls: {e}"),
        }
    }

    pub fn call_count(object: &Object, method: &str) -> usize {
        Self::recorded()
            .iter()
            .filter(|call| call.is_for(object, method))
            .count()
    }

    pub fn assert_called(object: &Object, method: &str) {
        assert!(
            Self::call_count(object, method) > 0,
            "expected {object:?}.{method} to have been called"
        );
    }

    pub fn assert_call_count(object: &Object, method: &str, expected: usize) {
        let actual = Self::call_count(object, method);
        assert_eq!(
            actual, expected,
            "expected {object:?}.{method} to have been called {expected} time(s), got {actual}"
        );
    }

    /// The recorded calls, in order, are exactly `expected`.
    pub fn assert_sequence(expected: &[(&Object, &str)]) {
        let calls = Self::recorded();
        let actual: Vec<String> = calls
            .iter()
            .map(|call| format!("#<{} {}>.{}", call.class, call.object, call.method))
            .collect();
        let wanted: Vec<String> = expected
            .iter()
            .map(|(object, method)| format!("{object:?}.{method}"))
            .collect();
        assert_eq!(actual, wanted, "unexpected call sequence");
    }

    pub fn assert_hooked(object: &Object, method: &str) {
        assert!(
            Self::hooked(object, method),
            "expected {object:?}.{method} to be hooked"
        );
    }

    pub fn assert_not_hooked(object: &Object, method: &str) {
        assert!(
            !Self::hooked(object, method),
            "expected {object:?}.{method} not to be hooked"
        );
    }

    fn hooked(object: &Object, method: &str) -> bool {
        match partialmock::hooked_methods(object) {
            Ok(methods) => methods.iter().any(|m| m == method),
            Err(e) => panic!("cannot inspect hooks: {e}"),
        }
    }
}
