//! The built-in function library (§1 "built-in function library (color,
//! math, list, map, string, meta)"). Each `sass:xxx` built-in module is a
//! [`ModuleMembers`] table built once per compilation and handed to the
//! evaluator when [`sass_loader::LoadOutcome::BuiltIn`] is returned for its
//! URL; a handful of always-visible global functions (`if`, `unit`,
//! `unitless`, ...) live directly in the global scope instead, matching how
//! these are callable unqualified even without a `@use` (§4.4 "look up in
//! scope, then built-in table").
//!
//! This is a representative subset, not the full upstream library — the
//! uniform `Callable::BuiltIn` dispatch point is what the spec requires;
//! breadth of coverage is not a named invariant.

mod color;
mod global;
mod list;
mod map;
mod math;
mod meta;
mod selector;
mod string;

use std::rc::Rc;

use sass_env::{Callable, ModuleMembers};

/// Every built-in module and the always-visible global functions, built
/// once when a [`crate::context::CompilationState`] is created.
pub struct BuiltinRegistry {
    pub global: Rc<ModuleMembers>,
    pub math: Rc<ModuleMembers>,
    pub color: Rc<ModuleMembers>,
    pub list: Rc<ModuleMembers>,
    pub map: Rc<ModuleMembers>,
    pub meta: Rc<ModuleMembers>,
    pub string: Rc<ModuleMembers>,
    pub selector: Rc<ModuleMembers>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self {
            global: global::module(),
            math: math::module(),
            color: color::module(),
            list: list::module(),
            map: map::module(),
            meta: meta::module(),
            string: string::module(),
            selector: selector::module(),
        }
    }

    /// Looks up the members table for a `sass:xxx` URL (§4.3 step 1).
    pub fn by_url(&self, url: &str) -> Option<&Rc<ModuleMembers>> {
        match url {
            "sass:math" => Some(&self.math),
            "sass:color" => Some(&self.color),
            "sass:list" => Some(&self.list),
            "sass:map" => Some(&self.map),
            "sass:meta" => Some(&self.meta),
            "sass:string" => Some(&self.string),
            "sass:selector" => Some(&self.selector),
            _ => None,
        }
    }

    pub fn global_function(&self, name: &str) -> Option<Rc<Callable>> {
        self.global.function(name)
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper shared by every built-in submodule: wraps a plain `Fn` as a
/// `Callable::BuiltIn` and registers it under `name`.
fn register(
    members: &ModuleMembers,
    name: &str,
    min_args: usize,
    max_args: Option<usize>,
    f: impl Fn(&[sass_value::Value], &sass_diagnostics::Span) -> sass_diagnostics::SassResult<sass_value::Value> + 'static,
) {
    members.set_function(
        name,
        Rc::new(Callable::BuiltIn {
            name: name.to_string(),
            min_args,
            max_args,
            implementation: Rc::new(f),
        }),
    );
}
