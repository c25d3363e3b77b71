use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use sass_diagnostics::{ReferenceKind, SassError, SassResult, Span};
use sass_value::Value;

use crate::callable::{Callable, ContentBlock};
use crate::module_members::ModuleMembers;
use crate::scope::{normalize, Scope, VariableSlot};

struct ScopeNode {
    scope: RefCell<Scope>,
    parent: Option<Rc<ScopeNode>>,
    /// §4.2 `scope(..., semi_global?)`: a semi-global scope is transparent
    /// to *new* variable declarations — `@each`/`@for`/`@while`/`@if`
    /// bodies push one of these so a bare `$x: y` inside them is visible
    /// after the block ends, the way it would be if the block weren't
    /// there at all.
    semi_global: bool,
}

/// The lexical environment (C2, §4.2): a chain of scopes plus the modules
/// reachable from the point in the source currently being evaluated.
///
/// Cloning an `Environment` is cheap and shares the same underlying scope
/// chain and module tables — this is exactly what a callable's captured
/// closure needs (§9 "Closure environments"): `closure()` just clones the
/// handle, and invoking the closure pushes one more scope on top so the
/// callable's own assignments can't leak back into the scope it closed
/// over.
#[derive(Clone)]
pub struct Environment {
    current: Rc<ScopeNode>,
    global: Rc<ScopeNode>,
    modules: Rc<RefCell<HashMap<String, Rc<ModuleMembers>>>>,
    star_modules: Rc<RefCell<Vec<Rc<ModuleMembers>>>>,
    content: Option<Rc<ContentBlock>>,
    in_mixin: bool,
}

impl Environment {
    pub fn new() -> Self {
        let global = Rc::new(ScopeNode {
            scope: RefCell::new(Scope::new()),
            parent: None,
            semi_global: false,
        });
        Self {
            current: global.clone(),
            global,
            modules: Rc::new(RefCell::new(HashMap::new())),
            star_modules: Rc::new(RefCell::new(Vec::new())),
            content: None,
            in_mixin: false,
        }
    }

    // -- scoping --------------------------------------------------------

    pub fn push_scope(&mut self, semi_global: bool) {
        self.current = Rc::new(ScopeNode {
            scope: RefCell::new(Scope::new()),
            parent: Some(self.current.clone()),
            semi_global,
        });
    }

    pub fn pop_scope(&mut self) {
        if let Some(parent) = self.current.parent.clone() {
            self.current = parent;
        }
    }

    /// Runs `body` inside a new nested scope, per §4.2 `scope(callback,
    /// when?, semi_global?)`. `when=false` skips creating a scope entirely
    /// (used when the caller already knows `body` contains no
    /// declarations, e.g. a single-statement `@if` branch).
    pub fn with_scope<T>(
        &mut self,
        when: bool,
        semi_global: bool,
        body: impl FnOnce(&mut Environment) -> SassResult<T>,
    ) -> SassResult<T> {
        if when {
            self.push_scope(semi_global);
        }
        let result = body(self);
        if when {
            self.pop_scope();
        }
        result
    }

    /// A handle usable as a callable's lexical closure (§4.2 `closure()`).
    pub fn closure(&self) -> Environment {
        self.clone()
    }

    // -- content blocks / mixin tracking ---------------------------------

    pub fn content(&self) -> Option<Rc<ContentBlock>> {
        self.content.clone()
    }

    pub fn with_content<T>(
        &mut self,
        content: Option<Rc<ContentBlock>>,
        body: impl FnOnce(&mut Environment) -> SassResult<T>,
    ) -> SassResult<T> {
        let previous = std::mem::replace(&mut self.content, content);
        let result = body(self);
        self.content = previous;
        result
    }

    pub fn in_mixin(&self) -> bool {
        self.in_mixin
    }

    pub fn as_mixin<T>(&mut self, body: impl FnOnce(&mut Environment) -> SassResult<T>) -> SassResult<T> {
        let previous = std::mem::replace(&mut self.in_mixin, true);
        let result = body(self);
        self.in_mixin = previous;
        result
    }

    // -- modules ----------------------------------------------------------

    /// Registers a `@use`d module's exports. `namespace = None` models
    /// `@use "..." as *`: its members become visible unqualified.
    pub fn register_module(&mut self, namespace: Option<String>, members: Rc<ModuleMembers>) {
        match namespace {
            Some(ns) => {
                self.modules.borrow_mut().insert(normalize(&ns), members);
            }
            None => self.star_modules.borrow_mut().push(members),
        }
    }

    fn module(&self, namespace: &str, span: &Span) -> SassResult<Rc<ModuleMembers>> {
        self.modules
            .borrow()
            .get(&normalize(namespace))
            .cloned()
            .ok_or_else(|| SassError::UndefinedReference {
                kind: ReferenceKind::Module,
                name: namespace.to_string(),
                span: span.clone(),
            })
    }

    /// §4.2 `import_forwards(dummy_module)`: splices a legacy `@import`'s or
    /// a `@forward`'s top-level members directly into the current scope, as
    /// if they'd been declared inline.
    pub fn import_forwards(&mut self, members: &ModuleMembers) {
        let mut scope = self.current.scope.borrow_mut();
        for name in members.variable_names() {
            if let Some(value) = members.variable(&name) {
                scope.variables.insert(
                    normalize(&name),
                    VariableSlot {
                        value,
                        declared_at: Span::point(dummy_file(), 0),
                    },
                );
            }
        }
        for name in members.function_names() {
            if let Some(callable) = members.function(&name) {
                scope.functions.insert(normalize(&name), callable);
            }
        }
        for name in members.mixin_names() {
            if let Some(callable) = members.mixin(&name) {
                scope.mixins.insert(normalize(&name), callable);
            }
        }
        drop(scope);
    }

    // -- variables ----------------------------------------------------------

    pub fn declare_variable(&mut self, name: &str, value: Value, span: Span) {
        self.current.scope.borrow_mut().variables.insert(
            normalize(name),
            VariableSlot {
                value,
                declared_at: span,
            },
        );
    }

    pub fn set_variable(
        &mut self,
        name: &str,
        value: Value,
        span: Span,
        global: bool,
        namespace: Option<&str>,
    ) -> SassResult<()> {
        if let Some(ns) = namespace {
            let module = self.module(ns, &span)?;
            return module.assign_existing(name, value, &span);
        }

        let key = normalize(name);

        if global {
            self.global.scope.borrow_mut().variables.insert(
                key,
                VariableSlot {
                    value,
                    declared_at: span,
                },
            );
            return Ok(());
        }

        // Search the chain for an existing binding to update in place.
        let mut node = Some(self.current.clone());
        while let Some(n) = node {
            if n.scope.borrow().variables.contains_key(&key) {
                n.scope.borrow_mut().variables.insert(
                    key,
                    VariableSlot {
                        value,
                        declared_at: span,
                    },
                );
                return Ok(());
            }
            node = n.parent.clone();
        }

        // Not found anywhere: declare in the nearest non-semi-global
        // ancestor (§4.2 semi_global), so the binding survives the
        // enclosing `@each`/`@for`/`@while`/`@if` block.
        let mut target = self.current.clone();
        while target.semi_global {
            match target.parent.clone() {
                Some(p) => target = p,
                None => break,
            }
        }
        target.scope.borrow_mut().variables.insert(
            key,
            VariableSlot {
                value,
                declared_at: span,
            },
        );
        Ok(())
    }

    pub fn get_variable(&self, name: &str, namespace: Option<&str>, span: &Span) -> SassResult<Option<Value>> {
        if let Some(ns) = namespace {
            return Ok(self.module(ns, span)?.variable(name));
        }
        let key = normalize(name);
        let mut node = Some(self.current.clone());
        while let Some(n) = node {
            if let Some(slot) = n.scope.borrow().variables.get(&key) {
                return Ok(Some(slot.value.clone()));
            }
            node = n.parent.clone();
        }
        for module in self.star_modules.borrow().iter() {
            if let Some(v) = module.variable(name) {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    pub fn variable_span(&self, name: &str) -> Option<Span> {
        let key = normalize(name);
        let mut node = Some(self.current.clone());
        while let Some(n) = node {
            if let Some(slot) = n.scope.borrow().variables.get(&key) {
                return Some(slot.declared_at.clone());
            }
            node = n.parent.clone();
        }
        None
    }

    // -- functions / mixins -------------------------------------------------

    pub fn declare_function(&mut self, name: &str, callable: Rc<Callable>) {
        self.current
            .scope
            .borrow_mut()
            .functions
            .insert(normalize(name), callable);
    }

    pub fn declare_mixin(&mut self, name: &str, callable: Rc<Callable>) {
        self.current
            .scope
            .borrow_mut()
            .mixins
            .insert(normalize(name), callable);
    }

    pub fn get_function(&self, name: &str, namespace: Option<&str>, span: &Span) -> SassResult<Option<Rc<Callable>>> {
        if let Some(ns) = namespace {
            return Ok(self.module(ns, span)?.function(name));
        }
        let key = normalize(name);
        let mut node = Some(self.current.clone());
        while let Some(n) = node {
            if let Some(f) = n.scope.borrow().functions.get(&key) {
                return Ok(Some(f.clone()));
            }
            node = n.parent.clone();
        }
        for module in self.star_modules.borrow().iter() {
            if let Some(f) = module.function(name) {
                return Ok(Some(f));
            }
        }
        Ok(None)
    }

    pub fn get_mixin(&self, name: &str, namespace: Option<&str>, span: &Span) -> SassResult<Option<Rc<Callable>>> {
        if let Some(ns) = namespace {
            return Ok(self.module(ns, span)?.mixin(name));
        }
        let key = normalize(name);
        let mut node = Some(self.current.clone());
        while let Some(n) = node {
            if let Some(m) = n.scope.borrow().mixins.get(&key) {
                return Ok(Some(m.clone()));
            }
            node = n.parent.clone();
        }
        for module in self.star_modules.borrow().iter() {
            if let Some(m) = module.mixin(name) {
                return Ok(Some(m));
            }
        }
        Ok(None)
    }

    /// Snapshots this environment's *own* top-level declarations (not
    /// anything reached only through a `@use`) into a fresh
    /// [`ModuleMembers`] table, for the module loader to attach to the
    /// `Module` it produces once evaluation of a file completes.
    pub fn export_top_level(&self) -> Rc<ModuleMembers> {
        let members = ModuleMembers::new();
        let scope = self.global.scope.borrow();
        for (name, slot) in scope.variables.iter() {
            members.set_variable(name, slot.value.clone());
        }
        for (name, callable) in scope.functions.iter() {
            members.set_function(name, callable.clone());
        }
        for (name, callable) in scope.mixins.iter() {
            members.set_mixin(name, callable.clone());
        }
        members
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn dummy_file() -> std::sync::Arc<sass_diagnostics::SourceFile> {
    sass_diagnostics::SourceFile::new(None, "")
}
