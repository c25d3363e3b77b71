use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use sass_diagnostics::{ReferenceKind, SassError, SassResult, Span};
use sass_value::Value;

use crate::callable::Callable;
use crate::scope::normalize;

/// The variables, functions and mixins a module exports, keyed by
/// normalized name (§3 "Module": `variables, functions, mixins`). Shared
/// via `Rc<RefCell<_>>` because a module's top-level variables remain
/// mutable for as long as the module is being evaluated (e.g. a later
/// `@use`r can still observe changes the module makes to its own exports
/// before the module finishes), but become effectively read-only once the
/// module is cached and handed to dependents.
#[derive(Default)]
pub struct ModuleMembers {
    variables: RefCell<HashMap<String, Value>>,
    functions: RefCell<HashMap<String, Rc<Callable>>>,
    mixins: RefCell<HashMap<String, Rc<Callable>>>,
}

impl ModuleMembers {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn set_variable(&self, name: &str, value: Value) {
        self.variables.borrow_mut().insert(normalize(name), value);
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        self.variables.borrow().get(&normalize(name)).cloned()
    }

    pub fn set_function(&self, name: &str, callable: Rc<Callable>) {
        self.functions.borrow_mut().insert(normalize(name), callable);
    }

    pub fn function(&self, name: &str) -> Option<Rc<Callable>> {
        self.functions.borrow().get(&normalize(name)).cloned()
    }

    pub fn set_mixin(&self, name: &str, callable: Rc<Callable>) {
        self.mixins.borrow_mut().insert(normalize(name), callable);
    }

    pub fn mixin(&self, name: &str) -> Option<Rc<Callable>> {
        self.mixins.borrow().get(&normalize(name)).cloned()
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.variables.borrow().keys().cloned().collect()
    }

    pub fn function_names(&self) -> Vec<String> {
        self.functions.borrow().keys().cloned().collect()
    }

    pub fn mixin_names(&self) -> Vec<String> {
        self.mixins.borrow().keys().cloned().collect()
    }

    /// Require a variable to already exist before writing, used by
    /// namespaced assignment (`$mod.$x: y;`) which can't create new
    /// module-exported variables (§4.2 `set_variable(..., namespace?)`).
    pub fn assign_existing(&self, name: &str, value: Value, span: &Span) -> SassResult<()> {
        let key = normalize(name);
        let mut vars = self.variables.borrow_mut();
        if !vars.contains_key(&key) {
            return Err(SassError::UndefinedReference {
                kind: ReferenceKind::Variable,
                name: name.to_string(),
                span: span.clone(),
            });
        }
        vars.insert(key, value);
        Ok(())
    }

    /// Builds a filtered copy per a `@forward ... show/hide ... as prefix-`
    /// clause (§4.2 `forward_module`).
    pub fn filtered(
        &self,
        show: Option<&[String]>,
        hide: Option<&[String]>,
        prefix: Option<&str>,
    ) -> Rc<ModuleMembers> {
        let passes = |name: &str| -> bool {
            let normalized = normalize(name);
            if let Some(show) = show {
                return show.iter().any(|n| normalize(n) == normalized);
            }
            if let Some(hide) = hide {
                return !hide.iter().any(|n| normalize(n) == normalized);
            }
            true
        };
        let rename = |name: &str| -> String {
            match prefix {
                Some(p) => format!("{p}{name}"),
                None => name.to_string(),
            }
        };

        let out = ModuleMembers::new();
        for (name, value) in self.variables.borrow().iter() {
            if passes(name) {
                out.set_variable(&rename(name), value.clone());
            }
        }
        for (name, callable) in self.functions.borrow().iter() {
            if passes(name) {
                out.set_function(&rename(name), callable.clone());
            }
        }
        for (name, callable) in self.mixins.borrow().iter() {
            if passes(name) {
                out.set_mixin(&rename(name), callable.clone());
            }
        }
        out
    }

    /// Merges `other` into `self`, used to combine a `@forward`ed module's
    /// re-exports into the forwarding module's own export table.
    pub fn merge_from(&self, other: &ModuleMembers) {
        for (name, value) in other.variables.borrow().iter() {
            self.variables
                .borrow_mut()
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        for (name, callable) in other.functions.borrow().iter() {
            self.functions
                .borrow_mut()
                .entry(name.clone())
                .or_insert_with(|| callable.clone());
        }
        for (name, callable) in other.mixins.borrow().iter() {
            self.mixins
                .borrow_mut()
                .entry(name.clone())
                .or_insert_with(|| callable.clone());
        }
    }
}
