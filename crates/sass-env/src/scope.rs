use std::collections::HashMap;
use std::rc::Rc;

use sass_diagnostics::Span;
use sass_value::Value;

use crate::callable::Callable;

/// Normalizes an identifier the way the Sass compiler does for lookup:
/// underscores and hyphens are the same name. Declaration always keeps the
/// name as written (§4.2 "Name normalisation"); only lookup keys are
/// normalized, via this function.
pub fn normalize(name: &str) -> String {
    name.replace('_', "-")
}

#[derive(Clone)]
pub struct VariableSlot {
    pub value: Value,
    pub declared_at: Span,
}

/// One lexical scope: a flat map of variables, functions and mixins. A
/// scope's variables are keyed by their *normalized* name so `$foo` and
/// `$foo_bar`/`$foo-bar` collide as the spec requires, but the slot still
/// remembers `declared_at` for deprecation-span accuracy (§4.2).
#[derive(Default, Clone)]
pub struct Scope {
    pub(crate) variables: HashMap<String, VariableSlot>,
    pub(crate) functions: HashMap<String, Rc<Callable>>,
    pub(crate) mixins: HashMap<String, Rc<Callable>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }
}
