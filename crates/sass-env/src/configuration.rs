use std::collections::HashMap;

use sass_diagnostics::Span;
use sass_value::Value;

/// One entry of a `@use`/`@forward`/`@import` `with (...)` configuration
/// (§3 "Configuration"): the value itself plus the spans needed to report
/// `UnusedConfiguration` accurately.
#[derive(Debug, Clone)]
pub struct ConfiguredValue {
    pub value: Value,
    /// Span of the value expression in the `with (...)` clause.
    pub span: Span,
    /// Span of the whole `@use`/`@forward`/`@import` declaration that
    /// supplied this configuration, used in the `UnusedConfiguration`
    /// error message.
    pub declaration_span: Span,
    /// Implicit configuration (propagated through a nested `@forward`)
    /// vs. explicit (`with (...)` written directly at this load site).
    pub is_implicit: bool,
}

/// The configuration passed into a module load (§3, §4.3). Empty by
/// default: a plain `@use "foo";` with no `with (...)` clause.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    values: HashMap<String, ConfiguredValue>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<(String, ConfiguredValue)>) -> Self {
        Self {
            values: entries.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ConfiguredValue> {
        self.values.get(name)
    }

    /// Removes and returns `name`'s configured value, marking it consumed.
    /// Called when a module's `!default` declaration overrides it (§4.3
    /// step 6: "every value ... must have been overridden").
    pub fn take(&mut self, name: &str) -> Option<ConfiguredValue> {
        self.values.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty_of_unconsumed(&self) -> bool {
        self.values.is_empty()
    }

    /// Structural comparison used by `AlreadyLoaded` (§4.3 step 4): two
    /// configurations are "the same" when they configure the same names to
    /// equal values.
    pub fn structurally_equals(&self, other: &Configuration) -> bool {
        if self.values.len() != other.values.len() {
            return false;
        }
        self.values.iter().all(|(name, v)| {
            other
                .values
                .get(name)
                .is_some_and(|ov| v.value.equals(&ov.value))
        })
    }
}
