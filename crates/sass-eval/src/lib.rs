//! The tree-walking evaluator (C1, §4.4): walks a parsed Sass
//! statement/expression AST and produces a CSS AST, driving the module
//! loader (C3), the extender (C5) and the value algebra (C4) as it goes.
//!
//! This crate owns the statement/expression visitors (`stmt`, `expr`),
//! the callable-call machinery (`callable`), the calculation constructor
//! path (`calc`), interpolation evaluation, and the built-in function
//! library (`builtins`). Everything it produces is handed to `sass-css`'s
//! serializer by the top-level `sass` crate.

mod builtins;
mod calc;
mod callable;
mod context;
mod control;
mod expr;
mod interpolation;
mod options;
mod stmt;

pub use builtins::BuiltinRegistry;
pub use context::{CompilationState, Evaluator, StyleRuleContext};
pub use control::ControlFlow;
pub use interpolation::eval_interpolation;
pub use options::EvalOptions;

pub use callable::{call_function, call_mixin, invoke_content};
pub use expr::eval as eval_expression;
pub use stmt::{eval_block, eval_function_body};

#[cfg(test)]
mod tests {
    use super::*;
    use sass_ast::{NoopParser, Statement, Stylesheet, VariableDecl, VariableFlags};
    use sass_css::CssNode;
    use sass_diagnostics::{NullLogger, SourceFile, Span};
    use sass_env::Environment;
    use sass_loader::{ImportedSource, Importer};
    use std::rc::Rc;
    use url::Url;

    struct NoImporter;
    impl Importer for NoImporter {
        fn canonicalize(&self, _url: &str, _base_url: Option<&Url>, _for_import: bool) -> Option<Url> {
            None
        }
        fn import_canonical(&self, _canonical_url: &Url) -> sass_diagnostics::SassResult<Option<ImportedSource>> {
            Ok(None)
        }
    }

    fn state() -> CompilationState {
        let options = EvalOptions {
            root_importer: Rc::new(NoImporter),
            additional_importers: Vec::new(),
            functions: Vec::new(),
            logger: Rc::new(NullLogger),
            quiet_deps: false,
            inspect: false,
        };
        CompilationState::new(&options, Rc::new(NoopParser))
    }

    fn span() -> Span {
        Span::point(SourceFile::new(None, ""), 0)
    }

    #[test]
    fn evaluating_a_module_with_a_style_rule_produces_one_css_child() {
        let state = state();
        let mut evaluator = Evaluator::root(&state);
        let mut env = Environment::new();

        let stylesheet = Stylesheet {
            statements: vec![Statement::VariableDecl(VariableDecl {
                name: "x".to_string(),
                namespace: None,
                value: sass_ast::Expression::Literal(sass_value::Value::Number(sass_value::Number::new(3.0)), span()),
                flags: VariableFlags::default(),
                span: span(),
            })],
        };

        eval_block(&mut evaluator, &mut env, &stylesheet.statements).unwrap();
        assert!(matches!(evaluator.tree.get(evaluator.tree.root()), CssNode::Stylesheet { children } if children.is_empty()));
        assert!(env.get_variable("x", None, &span()).unwrap().is_some());
    }
}
