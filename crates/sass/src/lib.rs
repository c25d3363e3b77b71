//! Public entry point of the evaluation core (§6 "Public API"): wires the
//! evaluator (C1), module loader (C3) and serializer (C6) together behind
//! the `compile`/`serialize`/`serialize_value` functions a CLI front-end,
//! watcher, or embedder calls.
//!
//! Everything this crate re-exports already lives in one of the
//! component crates (`sass-eval`, `sass-css`, ...); this crate's own job
//! is the top-level error-and-loaded-urls bookkeeping described in §7 and
//! §5, plus the interactive [`Evaluator`] wrapper described in §6.

use std::collections::HashSet;
use std::rc::Rc;

use url::Url;

use sass_ast::{Expression, SassParser, Statement, Stylesheet, UseStmt, VariableDecl};
use sass_css::{CssTree, OutputStyle, SerializeOptions, SerializeOutput};
use sass_diagnostics::{SassResult, Traced};
use sass_env::Environment;
use sass_value::Value;

pub use sass_css::LineFeed;
pub use sass_eval::{CompilationState, EvalOptions};
pub use sass_loader::{ImportedSource, Importer};

mod options;

pub use options::{CompileOptions, Style};

/// What `compile` produces on success (§6 `compile(ast, options) -> {
/// css, loaded_urls }`).
pub struct CompileResult {
    pub css: CssTree,
    pub loaded_urls: HashSet<Url>,
}

/// What `compile` produces on failure: the traced error plus whatever
/// URLs were loaded before the failure, so a watcher can still subscribe
/// to them (§4.3 step 2: "record the canonical URL as loaded even if
/// subsequent load fails").
pub struct CompileError {
    pub traced: Traced,
    pub loaded_urls: HashSet<Url>,
}

impl std::fmt::Debug for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.traced)
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.traced)
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.traced)
    }
}

/// Evaluates `ast` to a CSS AST (§1, §2: Evaluator -> Extender, folded
/// into one pass here since extension rewriting happens inline as each
/// module finishes — see `sass_eval`'s internal `resolve_module`).
///
/// This is the one place allowed to build a [`Traced`]: everything below
/// it returns a bare `SassError` and lets this function decorate it with
/// the call stack active when it was raised (§7).
pub fn compile(ast: &Stylesheet, options: CompileOptions) -> Result<CompileResult, CompileError> {
    let parser: Rc<dyn SassParser> = Rc::new(sass_ast::NoopParser);
    let eval_options = EvalOptions {
        root_importer: options.importer.clone(),
        additional_importers: options.additional_importers.clone(),
        functions: options.functions.clone(),
        logger: options.logger.clone(),
        quiet_deps: options.quiet_deps,
        inspect: options.inspect,
    };
    let state = CompilationState::new(&eval_options, parser);

    let result = run_compilation(&state, ast, &eval_options);
    let loaded_urls: HashSet<Url> = state.loader.borrow().loaded_urls().cloned().collect();

    match result {
        Ok(css) => Ok(CompileResult { css, loaded_urls }),
        Err(error) => {
            let trace = state.call_stack.borrow().clone();
            Err(CompileError {
                traced: Traced { error, trace },
                loaded_urls,
            })
        }
    }
}

fn run_compilation(state: &CompilationState, ast: &Stylesheet, eval_options: &EvalOptions) -> SassResult<CssTree> {
    let mut evaluator = sass_eval::Evaluator::root(state);
    let mut env = Environment::new();

    for function in &eval_options.functions {
        let name = function.name().to_string();
        env.declare_function(&name, function.clone());
    }

    sass_eval::eval_block(&mut evaluator, &mut env, &ast.statements)?;
    evaluator.finish()
}

/// Turns a (now-frozen) CSS AST into CSS text, with optional source-map
/// JSON (§4.6, §6 `serialize(css_ast, style, source_map?) -> { text,
/// map?, source_files? }`).
pub fn serialize(css: &CssTree, options: &CompileOptions) -> SassResult<SerializeOutput> {
    let serialize_options = SerializeOptions {
        style: match options.style {
            Style::Expanded => OutputStyle::Expanded,
            Style::Compressed => OutputStyle::Compressed,
        },
        indent_width: options.indent_width,
        use_tabs: options.use_tabs,
        line_feed: options.line_feed,
        source_map: options.source_map,
    };
    sass_css::serialize(css, &serialize_options)
}

/// Renders a single SassScript [`Value`] to text outside of a full
/// compilation (§6 `serialize_value(value, inspect?, quote?) -> text`),
/// used by the `sass:meta` reflection functions and by any host exposing
/// a SassScript REPL.
///
/// `quote = false` asks for a quoted string's *contents*, the way
/// `string.unquote` callers expect, without otherwise changing how other
/// value types render.
pub fn serialize_value(value: &Value, inspect: bool, quote: bool) -> SassResult<String> {
    let span = placeholder_span();
    if !quote {
        if let Value::String(text, true) = value {
            return Ok(text.to_string());
        }
    }
    sass_value::to_css_string(value, inspect, &span)
}

fn placeholder_span() -> sass_diagnostics::Span {
    sass_diagnostics::Span::point(sass_diagnostics::SourceFile::new(None, ""), 0)
}

/// A thin wrapper around [`sass_eval::Evaluator`] for interactive use
/// (§6: "`Evaluator::new(options)`, `evaluator.use_rule(rule)`,
/// `evaluator.evaluate_expression(expr) -> Value`,
/// `evaluator.set_variable(decl)` — for interactive contexts"), e.g. a
/// host embedding this core to evaluate one-off expressions against a
/// live stylesheet without running a whole `compile`.
pub struct Evaluator<'c> {
    inner: sass_eval::Evaluator<'c>,
    env: Environment,
}

impl<'c> Evaluator<'c> {
    pub fn new(state: &'c CompilationState) -> Self {
        Self {
            inner: sass_eval::Evaluator::root(state),
            env: Environment::new(),
        }
    }

    /// Runs a `@use` rule against this evaluator's environment, making the
    /// loaded module's namespace available to later `evaluate_expression`
    /// calls.
    pub fn use_rule(&mut self, rule: &UseStmt) -> SassResult<()> {
        let statement = Statement::Use(rule.clone());
        sass_eval::eval_block(&mut self.inner, &mut self.env, std::slice::from_ref(&statement)).map(|_| ())
    }

    pub fn evaluate_expression(&mut self, expr: &Expression) -> SassResult<Value> {
        sass_eval::eval_expression(&mut self.inner, &mut self.env, expr)
    }

    pub fn set_variable(&mut self, decl: &VariableDecl) -> SassResult<()> {
        let statement = Statement::VariableDecl(decl.clone());
        sass_eval::eval_block(&mut self.inner, &mut self.env, std::slice::from_ref(&statement)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_diagnostics::{NullLogger, SourceFile, Span};
    use sass_value::Number;

    struct NoImporter;
    impl Importer for NoImporter {
        fn canonicalize(&self, _url: &str, _base_url: Option<&Url>, _for_import: bool) -> Option<Url> {
            None
        }
        fn import_canonical(&self, _canonical_url: &Url) -> SassResult<Option<ImportedSource>> {
            Ok(None)
        }
    }

    fn options() -> CompileOptions {
        CompileOptions {
            importer: Rc::new(NoImporter),
            additional_importers: Vec::new(),
            functions: Vec::new(),
            logger: Rc::new(NullLogger),
            quiet_deps: false,
            source_map: false,
            style: Style::Expanded,
            indent_width: 2,
            use_tabs: false,
            line_feed: LineFeed::Lf,
            inspect: false,
        }
    }

    fn span() -> Span {
        Span::point(SourceFile::new(None, ""), 0)
    }

    #[test]
    fn compiling_a_simple_arithmetic_declaration_matches_the_spec_example() {
        let stylesheet = Stylesheet {
            statements: vec![Statement::StyleRule(sass_ast::StyleRuleStmt {
                selector: sass_ast::Interpolation::plain("a", span()),
                children: vec![Statement::Declaration(sass_ast::DeclarationStmt {
                    name: sass_ast::Interpolation::plain("x", span()),
                    value: Some(Expression::Binary {
                        op: sass_ast::BinaryOp::Plus,
                        left: Box::new(Expression::Literal(Value::Number(Number::new(1.0)), span())),
                        right: Box::new(Expression::Literal(Value::Number(Number::new(2.0)), span())),
                        span: span(),
                    }),
                    important: false,
                    children: Vec::new(),
                    span: span(),
                })],
                span: span(),
            })],
        };

        let result = compile(&stylesheet, options()).unwrap();
        let out = serialize(&result.css, &options()).unwrap();
        assert_eq!(out.text, "a {\n  x: 3;\n}\n");
    }

    #[test]
    fn serialize_value_unquotes_a_quoted_string_when_quote_is_false() {
        let value = Value::string("hello".to_string(), true);
        assert_eq!(serialize_value(&value, false, false).unwrap(), "hello");
        assert_eq!(serialize_value(&value, false, true).unwrap(), "hello");
    }
}
