//! Lexical scopes for variables, functions and mixins (C2, §4.2): the
//! `Environment` scope chain, `Configuration` for `@use`/`@forward`/
//! `@import` overrides, and the `Callable` sum type dispatched by the
//! evaluator (C1).

mod callable;
mod configuration;
mod environment;
mod module_members;
mod scope;

pub use callable::{BuiltInFn, Callable, ContentBlock};
pub use configuration::{Configuration, ConfiguredValue};
pub use environment::Environment;
pub use module_members::ModuleMembers;
pub use scope::{normalize, Scope, VariableSlot};

#[cfg(test)]
mod tests {
    use super::*;
    use sass_diagnostics::{SourceFile, Span};
    use sass_value::Value;

    fn span() -> Span {
        Span::point(SourceFile::new(None, ""), 0)
    }

    #[test]
    fn underscores_and_hyphens_are_the_same_variable() {
        let mut env = Environment::new();
        env.declare_variable("foo_bar", Value::Boolean(true), span());
        assert!(env.get_variable("foo-bar", None, &span()).unwrap().is_some());
    }

    #[test]
    fn semi_global_scope_writes_are_visible_after_it_ends() {
        let mut env = Environment::new();
        env.push_scope(true);
        env.set_variable("x", Value::Boolean(true), span(), false, None).unwrap();
        env.pop_scope();
        assert!(env.get_variable("x", None, &span()).unwrap().is_some());
    }

    #[test]
    fn a_non_semi_global_nested_scope_does_not_leak_new_declarations() {
        let mut env = Environment::new();
        env.push_scope(false);
        env.declare_variable("y", Value::Boolean(true), span());
        env.pop_scope();
        assert!(env.get_variable("y", None, &span()).unwrap().is_none());
    }

    #[test]
    fn assignment_updates_an_existing_outer_binding_through_a_semi_global_scope() {
        let mut env = Environment::new();
        env.declare_variable("count", Value::Boolean(false), span());
        env.push_scope(true);
        env.set_variable("count", Value::Boolean(true), span(), false, None).unwrap();
        env.pop_scope();
        let value = env.get_variable("count", None, &span()).unwrap().unwrap();
        assert!(value.is_truthy());
    }

    #[test]
    fn closure_shares_state_captured_at_declaration_time() {
        let mut env = Environment::new();
        env.declare_variable("shared", Value::Boolean(false), span());
        let closure = env.closure();
        env.set_variable("shared", Value::Boolean(true), span(), false, None).unwrap();
        let seen = closure.get_variable("shared", None, &span()).unwrap().unwrap();
        assert!(seen.is_truthy());
    }
}
