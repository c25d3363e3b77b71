//! The statement evaluator (C1, §4.4): walks one module's (or one
//! function body's) `Statement` list, threading the CSS-tree bubbling,
//! scoping and module-loading rules `Evaluator` tracks.

use std::rc::Rc;

use sass_ast::{ConfiguredVariable, Statement};
use sass_css::{
    merge_media_queries, parse_at_root_query, parse_keyframe_selector, parse_media_query_list, AtRootQuery, CssNode, CssTree, NodeId,
};
use sass_diagnostics::{ReferenceKind, SassError, SassResult, SourceFile, Span};
use sass_env::{normalize, Callable, Configuration, ConfiguredValue, ContentBlock, Environment};
use sass_extend::ExtensionStore;
use sass_loader::{LoadOutcome, Module};
use sass_selectors::{parse_selector_list, SimpleSelector};
use sass_value::{to_css_string, Number, Value};

use crate::context::{Evaluator, StyleRuleContext};
use crate::control::ControlFlow;
use crate::expr;
use crate::interpolation::eval_interpolation;

/// Runs a statement list, stopping early on the first `@return` (§4.4
/// `eval_block`). Used both for a module's top-level statements and for
/// any nested block (style rule, `@if` branch, loop body, mixin body...).
pub fn eval_block(evaluator: &mut Evaluator, env: &mut Environment, body: &[Statement]) -> SassResult<ControlFlow> {
    for statement in body {
        let flow = eval_statement(evaluator, env, statement)?;
        if flow.is_returning() {
            return Ok(flow);
        }
    }
    Ok(ControlFlow::Normal)
}

/// Runs a `@function` body to completion, requiring it to `@return` (§4.4
/// `eval_function_body`). `in_function` only gates the handful of at-rules
/// that make no sense inside a function (style rules, nested at-rules,
/// `@extend`); it does not disable CSS emission generally, since a
/// function body and a mixin/module body share this same evaluator.
pub fn eval_function_body(evaluator: &mut Evaluator, env: &mut Environment, body: &[Statement], span: &Span) -> SassResult<Value> {
    let previous = std::mem::replace(&mut evaluator.in_function, true);
    let result = eval_block(evaluator, env, body);
    evaluator.in_function = previous;
    match result? {
        ControlFlow::Return(value) => Ok(value),
        ControlFlow::Normal => Err(SassError::BadArguments {
            message: "Function finished without @return.".to_string(),
            span: span.clone(),
        }),
    }
}

fn eval_scoped(evaluator: &mut Evaluator, env: &mut Environment, semi_global: bool, body: &[Statement]) -> SassResult<ControlFlow> {
    env.push_scope(semi_global);
    let result = eval_block(evaluator, env, body);
    env.pop_scope();
    result
}

/// Enters a new non-style-rule CSS node (`@media`/`@supports`/an unknown
/// at-rule/`@keyframes`): the active style rule, if any, gets spliced in as
/// a childless copy so declarations written directly inside still land
/// somewhere sensible, and is restored once the block finishes (§4.4 "CSS
/// tree bubbling").
fn with_bubbled_parent(evaluator: &mut Evaluator, env: &mut Environment, node: NodeId, children: &[Statement]) -> SassResult<ControlFlow> {
    let previous_parent = evaluator.current_parent;
    evaluator.current_parent = node;

    let previous_style_rule = evaluator.style_rule.take();
    if let Some(sr) = &previous_style_rule {
        let copy = evaluator.tree.copy_without_children(sr.node);
        let span = evaluator.tree.span(sr.node).cloned();
        let spliced = evaluator.tree.insert(copy, node, span);
        evaluator.style_rule = Some(StyleRuleContext {
            original_selector: sr.original_selector.clone(),
            node: spliced,
        });
    }

    let flow = eval_scoped(evaluator, env, true, children);

    evaluator.style_rule = previous_style_rule;
    evaluator.current_parent = previous_parent;
    flow
}

fn eval_statement(evaluator: &mut Evaluator, env: &mut Environment, statement: &Statement) -> SassResult<ControlFlow> {
    match statement {
        Statement::Use(_) | Statement::Forward(_) | Statement::LoudComment(_) | Statement::SilentComment(_) => {}
        _ => evaluator.seen_non_comment_or_module_rule = true,
    }

    if evaluator.in_function {
        let illegal = matches!(
            statement,
            Statement::StyleRule(_)
                | Statement::Declaration(_)
                | Statement::MediaRule(_)
                | Statement::SupportsRule(_)
                | Statement::UnknownAtRule(_)
                | Statement::Keyframes(_)
                | Statement::AtRoot(_)
                | Statement::Extend(_)
        );
        if illegal {
            return Err(SassError::BadArguments {
                message: "This at-rule is not allowed inside functions.".to_string(),
                span: statement.span().clone(),
            });
        }
    }

    match statement {
        Statement::VariableDecl(decl) => {
            if decl.flags.default && decl.namespace.is_none() {
                if let Some(configured) = evaluator.configuration.take(&normalize(&decl.name)) {
                    env.declare_variable(&decl.name, configured.value, decl.span.clone());
                    return Ok(ControlFlow::Normal);
                }
                if env.get_variable(&decl.name, None, &decl.span)?.is_some() {
                    return Ok(ControlFlow::Normal);
                }
            }
            let value = expr::eval(evaluator, env, &decl.value)?;
            env.set_variable(&decl.name, value, decl.span.clone(), decl.flags.global, decl.namespace.as_deref())?;
            Ok(ControlFlow::Normal)
        }

        Statement::Declaration(decl) => {
            let evaluated_name = eval_interpolation(evaluator, env, &decl.name)?;
            let full_name = match evaluator.declaration_prefix.last() {
                Some(prefix) => format!("{prefix}-{}", evaluated_name.text),
                None => evaluated_name.text.clone(),
            };

            let parsed_as_custom_property = full_name.starts_with("--");
            if parsed_as_custom_property && !decl.children.is_empty() {
                return Err(SassError::TypeError {
                    message: format!("Custom property \"{full_name}\" can't have nested declarations."),
                    span: decl.span.clone(),
                });
            }

            if let Some(value_expr) = &decl.value {
                let value = expr::eval(evaluator, env, value_expr)?;
                if !matches!(value, Value::Null) {
                    let target = evaluator.style_rule.as_ref().map(|sr| sr.node).unwrap_or(evaluator.current_parent);
                    evaluator.tree.insert(
                        CssNode::Declaration {
                            name: full_name.clone(),
                            value,
                            parsed_as_custom_property,
                            important: decl.important,
                            value_span_for_map: Some(value_expr.span().clone()),
                        },
                        target,
                        Some(decl.span.clone()),
                    );
                }
            }

            if !decl.children.is_empty() {
                evaluator.declaration_prefix.push(full_name);
                let flow = eval_scoped(evaluator, env, true, &decl.children);
                evaluator.declaration_prefix.pop();
                return flow;
            }

            Ok(ControlFlow::Normal)
        }

        Statement::StyleRule(rule) => {
            let evaluated = eval_interpolation(evaluator, env, &rule.selector)?;
            let parsed = parse_selector_list(&evaluated.text, true, true, rule.span.file.clone(), rule.span.start)?;

            let resolved = match &evaluator.style_rule {
                Some(sr) => parsed.resolve_parent(&sr.original_selector),
                None => parsed.clone(),
            };

            let parent = evaluator.current_parent;
            let node = evaluator.tree.insert(
                CssNode::StyleRule {
                    selector: resolved.clone(),
                    original_selector: resolved.clone(),
                    children: Vec::new(),
                    is_group_end: false,
                },
                parent,
                Some(rule.span.clone()),
            );
            let handle = evaluator.extension_store.add_selector(resolved.clone(), evaluator.media_queries.clone());
            evaluator.style_rule_handles.push((node, handle));

            let previous_style_rule = std::mem::replace(
                &mut evaluator.style_rule,
                Some(StyleRuleContext {
                    original_selector: resolved,
                    node,
                }),
            );
            let flow = eval_scoped(evaluator, env, true, &rule.children);
            evaluator.style_rule = previous_style_rule;
            flow
        }

        Statement::MediaRule(rule) => {
            let evaluated = eval_interpolation(evaluator, env, &rule.query)?;
            let parsed = parse_media_query_list(&evaluated.text, &rule.span)?;
            let merged = merge_media_queries(&evaluator.media_queries, &parsed);

            let parent = evaluator.current_parent;
            let node = evaluator.tree.insert(
                CssNode::MediaRule {
                    queries: merged.clone(),
                    children: Vec::new(),
                },
                parent,
                Some(rule.span.clone()),
            );

            let previous_media = std::mem::replace(&mut evaluator.media_queries, merged);
            let flow = with_bubbled_parent(evaluator, env, node, &rule.children);
            evaluator.media_queries = previous_media;
            flow
        }

        Statement::SupportsRule(rule) => {
            evaluator.in_supports_declaration = true;
            let evaluated = eval_interpolation(evaluator, env, &rule.condition);
            evaluator.in_supports_declaration = false;
            let evaluated = evaluated?;

            let parent = evaluator.current_parent;
            let node = evaluator.tree.insert(
                CssNode::SupportsRule {
                    condition_text: evaluated.text,
                    children: Vec::new(),
                },
                parent,
                Some(rule.span.clone()),
            );
            with_bubbled_parent(evaluator, env, node, &rule.children)
        }

        Statement::UnknownAtRule(rule) => {
            let value = match &rule.value {
                Some(interp) => Some(eval_interpolation(evaluator, env, interp)?.text),
                None => None,
            };

            let parent = evaluator.current_parent;
            match &rule.children {
                None => {
                    evaluator.tree.insert(
                        CssNode::AtRule {
                            name: rule.name.clone(),
                            value,
                            children: None,
                            childless: true,
                        },
                        parent,
                        Some(rule.span.clone()),
                    );
                    Ok(ControlFlow::Normal)
                }
                Some(children) => {
                    let node = evaluator.tree.insert(
                        CssNode::AtRule {
                            name: rule.name.clone(),
                            value,
                            children: Some(Vec::new()),
                            childless: false,
                        },
                        parent,
                        Some(rule.span.clone()),
                    );
                    let previous = std::mem::replace(&mut evaluator.in_unknown_at_rule, true);
                    let flow = with_bubbled_parent(evaluator, env, node, children);
                    evaluator.in_unknown_at_rule = previous;
                    flow
                }
            }
        }

        Statement::Keyframes(stmt) => {
            let parent = evaluator.current_parent;
            let node = evaluator.tree.insert(
                CssNode::AtRule {
                    name: "keyframes".to_string(),
                    value: Some(stmt.name.clone()),
                    children: Some(Vec::new()),
                    childless: false,
                },
                parent,
                Some(stmt.span.clone()),
            );
            let previous = std::mem::replace(&mut evaluator.in_keyframes, true);
            let flow = with_bubbled_parent(evaluator, env, node, &stmt.children);
            evaluator.in_keyframes = previous;
            flow
        }

        Statement::KeyframeBlock(stmt) => {
            let selectors = parse_keyframe_selector(&stmt.selector_text, &stmt.span)?;
            let parent = evaluator.current_parent;
            let node = evaluator.tree.insert(
                CssNode::KeyframeBlock {
                    selectors,
                    children: Vec::new(),
                },
                parent,
                Some(stmt.span.clone()),
            );
            with_bubbled_parent(evaluator, env, node, &stmt.children)
        }

        Statement::If(stmt) => {
            for clause in &stmt.clauses {
                let take = match &clause.condition {
                    Some(condition) => expr::eval(evaluator, env, condition)?.is_truthy(),
                    None => true,
                };
                if take {
                    return eval_scoped(evaluator, env, true, &clause.body);
                }
            }
            Ok(ControlFlow::Normal)
        }

        Statement::Each(stmt) => {
            let list = expr::eval(evaluator, env, &stmt.list)?;
            let items = list.as_list();

            env.push_scope(true);
            let mut flow = ControlFlow::Normal;
            for item in items {
                bind_each_variables(env, &stmt.variables, item, &stmt.span);
                flow = match eval_block(evaluator, env, &stmt.body) {
                    Ok(flow) => flow,
                    Err(e) => {
                        env.pop_scope();
                        return Err(e);
                    }
                };
                if flow.is_returning() {
                    break;
                }
            }
            env.pop_scope();
            Ok(flow)
        }

        Statement::For(stmt) => {
            let from = number_to_i64(&expr::eval(evaluator, env, &stmt.from)?, &stmt.span)?;
            let to = number_to_i64(&expr::eval(evaluator, env, &stmt.to)?, &stmt.span)?;

            env.push_scope(true);
            let mut flow = ControlFlow::Normal;
            let step: i64 = if from <= to { 1 } else { -1 };
            let mut i = from;
            loop {
                let done = if stmt.inclusive { i == to + step } else { i == to };
                if done {
                    break;
                }
                env.declare_variable(&stmt.variable, Value::Number(Number::new(i as f64)), stmt.span.clone());
                flow = match eval_block(evaluator, env, &stmt.body) {
                    Ok(flow) => flow,
                    Err(e) => {
                        env.pop_scope();
                        return Err(e);
                    }
                };
                if flow.is_returning() {
                    break;
                }
                i += step;
            }
            env.pop_scope();
            Ok(flow)
        }

        Statement::While(stmt) => {
            env.push_scope(true);
            let mut flow = ControlFlow::Normal;
            loop {
                let condition = match expr::eval(evaluator, env, &stmt.condition) {
                    Ok(v) => v,
                    Err(e) => {
                        env.pop_scope();
                        return Err(e);
                    }
                };
                if !condition.is_truthy() {
                    break;
                }
                flow = match eval_block(evaluator, env, &stmt.body) {
                    Ok(flow) => flow,
                    Err(e) => {
                        env.pop_scope();
                        return Err(e);
                    }
                };
                if flow.is_returning() {
                    break;
                }
            }
            env.pop_scope();
            Ok(flow)
        }

        Statement::FunctionDecl(stmt) => {
            let callable = Callable::UserDefined {
                name: stmt.name.clone(),
                arguments: stmt.arguments.clone(),
                body: Rc::new(stmt.body.clone()),
                closure: env.closure(),
                in_dependency: evaluator.in_dependency,
                accepts_content: false,
            };
            env.declare_function(&stmt.name, Rc::new(callable));
            Ok(ControlFlow::Normal)
        }

        Statement::MixinDecl(stmt) => {
            let callable = Callable::UserDefined {
                name: stmt.name.clone(),
                arguments: stmt.arguments.clone(),
                body: Rc::new(stmt.body.clone()),
                closure: env.closure(),
                in_dependency: evaluator.in_dependency,
                accepts_content: stmt.accepts_content,
            };
            env.declare_mixin(&stmt.name, Rc::new(callable));
            Ok(ControlFlow::Normal)
        }

        Statement::Include(stmt) => {
            let callable = env
                .get_mixin(&stmt.name, stmt.namespace.as_deref(), &stmt.span)?
                .ok_or_else(|| SassError::UndefinedReference {
                    kind: ReferenceKind::Mixin,
                    name: stmt.name.clone(),
                    span: stmt.span.clone(),
                })?;

            if stmt.content_block.is_some() && !callable.accepts_content() {
                return Err(SassError::BadArguments {
                    message: format!("Mixin \"{}\" doesn't accept a content block.", stmt.name),
                    span: stmt.span.clone(),
                });
            }

            let content = stmt.content_block.as_ref().map(|body| {
                Rc::new(ContentBlock {
                    body: Rc::new(body.clone()),
                    arguments: stmt.content_arguments.clone(),
                    environment: env.closure(),
                })
            });

            crate::callable::call_mixin(evaluator, env, &callable, &stmt.arguments, content, &stmt.span)?;
            Ok(ControlFlow::Normal)
        }

        Statement::Content(span) => {
            if let Some(content) = env.content() {
                crate::callable::invoke_content(evaluator, &content, span)?;
            }
            Ok(ControlFlow::Normal)
        }

        Statement::Return(stmt) => {
            let value = expr::eval(evaluator, env, &stmt.value)?;
            Ok(ControlFlow::Return(value))
        }

        Statement::Extend(stmt) => {
            let style_rule = evaluator.style_rule.as_ref().ok_or_else(|| SassError::ExtendTarget {
                message: "@extend may only be used within a style rule.".to_string(),
                span: stmt.span.clone(),
            })?;
            let extender_selector = match evaluator.tree.get(style_rule.node) {
                CssNode::StyleRule { selector, .. } => selector.clone(),
                _ => unreachable!("style_rule.node always points at a StyleRule node"),
            };

            let evaluated = eval_interpolation(evaluator, env, &stmt.selector)?;
            let target_list = parse_selector_list(&evaluated.text, false, true, stmt.span.file.clone(), stmt.span.start)?;

            for complex in &target_list.complexes {
                if complex.components.len() != 1 {
                    return Err(SassError::ExtendTarget {
                        message: "expected selector.".to_string(),
                        span: stmt.span.clone(),
                    });
                }
                let compound = complex.compound_at(0).ok_or_else(|| SassError::ExtendTarget {
                    message: "expected selector.".to_string(),
                    span: stmt.span.clone(),
                })?;
                if compound.simples.len() != 1 {
                    return Err(SassError::ExtendTarget {
                        message: "expected a single simple selector to extend.".to_string(),
                        span: stmt.span.clone(),
                    });
                }
                let target: SimpleSelector = compound.simples[0].clone();
                evaluator
                    .extension_store
                    .add_extension(extender_selector.clone(), target, stmt.span.clone(), evaluator.media_queries.clone(), stmt.optional);
            }

            Ok(ControlFlow::Normal)
        }

        Statement::AtRoot(stmt) => {
            let query = match &stmt.query {
                Some(interp) => {
                    let evaluated = eval_interpolation(evaluator, env, interp)?;
                    parse_at_root_query(&evaluated.text, &stmt.span)?
                }
                None => AtRootQuery::default_query(),
            };

            let (target_parent, target_style_rule) = resolve_at_root_target(evaluator, &query);

            let previous_parent = evaluator.current_parent;
            let previous_style_rule = std::mem::replace(&mut evaluator.style_rule, target_style_rule);
            evaluator.current_parent = target_parent;

            let flow = eval_scoped(evaluator, env, true, &stmt.children);

            evaluator.style_rule = previous_style_rule;
            evaluator.current_parent = previous_parent;
            flow
        }

        Statement::Use(stmt) => {
            if evaluator.seen_non_comment_or_module_rule {
                return Err(SassError::ParseError {
                    message: "@use rules must be written before any other rules.".to_string(),
                    span: stmt.span.clone(),
                });
            }
            let configuration = build_configuration(evaluator, env, &stmt.configuration)?;
            let module = resolve_module(evaluator, &stmt.span, &stmt.url, configuration, false)?;

            let namespace = if stmt.star_namespace {
                None
            } else {
                Some(stmt.namespace.clone().unwrap_or_else(|| default_namespace(&stmt.url)))
            };
            env.register_module(namespace, module.members.clone());
            integrate_loaded_module(evaluator, &module);
            Ok(ControlFlow::Normal)
        }

        Statement::Forward(stmt) => {
            if evaluator.seen_non_comment_or_module_rule {
                return Err(SassError::ParseError {
                    message: "@forward rules must be written before any other rules.".to_string(),
                    span: stmt.span.clone(),
                });
            }
            let configuration = build_configuration(evaluator, env, &stmt.configuration)?;
            let module = resolve_module(evaluator, &stmt.span, &stmt.url, configuration, false)?;

            let filtered = module.members.filtered(
                stmt.filter.show.as_deref(),
                stmt.filter.hide.as_deref(),
                stmt.filter.prefix.as_deref(),
            );
            env.import_forwards(&filtered);
            integrate_loaded_module(evaluator, &module);
            Ok(ControlFlow::Normal)
        }

        Statement::Import(stmt) => {
            for import in &stmt.imports {
                if is_plain_css_import(&import.url) {
                    let parent = evaluator.current_parent;
                    evaluator.tree.insert(
                        CssNode::Import {
                            url_text: import.url.clone(),
                            modifiers: None,
                        },
                        parent,
                        Some(import.span.clone()),
                    );
                    continue;
                }
                let module = resolve_module(evaluator, &import.span, &import.url, Configuration::new(), true)?;
                env.import_forwards(&module.members);
                integrate_loaded_module(evaluator, &module);
            }
            Ok(ControlFlow::Normal)
        }

        Statement::Debug(expression, span) => {
            let value = expr::eval(evaluator, env, expression)?;
            let text = message_text(&value, span)?;
            evaluator.debug(&text, span);
            Ok(ControlFlow::Normal)
        }

        Statement::Warn(expression, span) => {
            let value = expr::eval(evaluator, env, expression)?;
            let text = message_text(&value, span)?;
            evaluator.warn(&text, Some(span), None);
            Ok(ControlFlow::Normal)
        }

        Statement::Error(expression, span) => {
            let value = expr::eval(evaluator, env, expression)?;
            let text = message_text(&value, span)?;
            Err(SassError::UserError {
                message: text,
                span: span.clone(),
            })
        }

        Statement::LoudComment(stmt) => {
            let evaluated = eval_interpolation(evaluator, env, &stmt.text)?;
            if evaluator.seen_non_comment_or_module_rule {
                let target = evaluator.style_rule.as_ref().map(|sr| sr.node).unwrap_or(evaluator.current_parent);
                evaluator.tree.insert(
                    CssNode::Comment {
                        text: evaluated.text,
                        preserved: true,
                    },
                    target,
                    Some(stmt.span.clone()),
                );
            } else {
                evaluator.pre_module_comments.push(evaluated.text);
            }
            Ok(ControlFlow::Normal)
        }

        Statement::SilentComment(_) => Ok(ControlFlow::Normal),
    }
}

fn bind_each_variables(env: &mut Environment, variables: &[String], item: Value, span: &Span) {
    if variables.len() == 1 {
        env.declare_variable(&variables[0], item, span.clone());
        return;
    }
    let parts = item.as_list();
    for (index, name) in variables.iter().enumerate() {
        let value = parts.get(index).cloned().unwrap_or(Value::Null);
        env.declare_variable(name, value, span.clone());
    }
}

fn number_to_i64(value: &Value, span: &Span) -> SassResult<i64> {
    match value {
        Value::Number(n) => n.to_integer().ok_or_else(|| SassError::TypeError {
            message: format!("{n} is not an integer."),
            span: span.clone(),
        }),
        other => Err(SassError::TypeError {
            message: format!("{} is not a number.", other.type_name()),
            span: span.clone(),
        }),
    }
}

fn message_text(value: &Value, span: &Span) -> SassResult<String> {
    match value {
        Value::String(s, _) => Ok(s.to_string()),
        other => to_css_string(other, true, span),
    }
}

/// Walks from the current CSS parent up to the tree root, dropping any
/// ancestor the query excludes by at-rule name, and decides whether the
/// enclosing style rule (if any) survives (§9 supplement C.8 `@at-root`).
/// This is a simplified reading of the real algorithm: it relocates to the
/// first surviving ancestor rather than re-threading every excluded level
/// individually, so content bubbles past *all* excluded ancestors at once.
fn resolve_at_root_target(evaluator: &Evaluator, query: &AtRootQuery) -> (NodeId, Option<StyleRuleContext>) {
    let keep_style_rule = evaluator.style_rule.is_some() && !query.excludes_style_rule();

    let mut node = evaluator.current_parent;
    loop {
        let excluded = match evaluator.tree.get(node) {
            CssNode::MediaRule { .. } => query.excludes_name("media"),
            CssNode::SupportsRule { .. } => query.excludes_name("supports"),
            CssNode::AtRule { name, .. } => query.excludes_name(name),
            _ => false,
        };
        if !excluded || node == evaluator.tree.root() {
            break;
        }
        match evaluator.tree.parent(node) {
            Some(parent) => node = parent,
            None => break,
        }
    }

    let style_rule = if keep_style_rule {
        evaluator.style_rule.as_ref().map(|sr| StyleRuleContext {
            original_selector: sr.original_selector.clone(),
            node: sr.node,
        })
    } else {
        None
    };
    (node, style_rule)
}

fn is_plain_css_import(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//") || url.starts_with("url(") || url.ends_with(".css")
}

/// Derives `@use "foo/bar"`'s implicit namespace: the final path segment,
/// minus a leading partial `_` and a Sass extension, falling back to the
/// parent directory for an `_index`/`index` file (§4.3 step 2).
fn default_namespace(url: &str) -> String {
    let trimmed = url
        .trim_end_matches(".scss")
        .trim_end_matches(".sass")
        .trim_end_matches(".css");
    let mut segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    let mut last = segments.pop().unwrap_or(trimmed);
    last = last.strip_prefix('_').unwrap_or(last);
    if last == "index" {
        if let Some(parent) = segments.pop() {
            return parent.strip_prefix('_').unwrap_or(parent).to_string();
        }
    }
    last.to_string()
}

fn build_configuration(evaluator: &mut Evaluator, env: &mut Environment, configured: &[ConfiguredVariable]) -> SassResult<Configuration> {
    let mut entries = Vec::with_capacity(configured.len());
    for variable in configured {
        let value = expr::eval(evaluator, env, &variable.value)?;
        entries.push((
            normalize(&variable.name),
            ConfiguredValue {
                value,
                span: variable.span.clone(),
                declaration_span: variable.span.clone(),
                is_implicit: false,
            },
        ));
    }
    Ok(Configuration::from_entries(entries))
}

/// Loads and evaluates (or reuses the cached evaluation of) the module at
/// `url_text`, driving the [`sass_loader::ModuleLoader`] state machine
/// (§4.3). A built-in module (`sass:math` and friends) is wrapped in the
/// same `Module` shape as a user module, with an empty CSS tree and
/// extension store, so callers don't need a separate code path.
fn resolve_module(evaluator: &mut Evaluator, span: &Span, url_text: &str, configuration: Configuration, for_import: bool) -> SassResult<Rc<Module>> {
    let base_url = span.file.url.clone();
    let canonical = evaluator.state.loader.borrow().canonicalize(url_text, None, base_url.as_ref(), for_import);
    let (importer, canonical) = canonical.ok_or_else(|| SassError::ParseError {
        message: format!("Can't find stylesheet to import: \"{url_text}\"."),
        span: span.clone(),
    })?;

    let outcome = evaluator.state.loader.borrow_mut().start_load(&canonical, span, &configuration)?;

    match outcome {
        LoadOutcome::BuiltIn => {
            let members = evaluator
                .builtins()
                .by_url(canonical.as_str())
                .cloned()
                .ok_or_else(|| SassError::Internal {
                    message: format!("unrecognized built-in module \"{canonical}\""),
                })?;
            Ok(Rc::new(Module {
                canonical_url: canonical,
                css_tree: Rc::new(CssTree::new()),
                members,
                upstream_modules: Vec::new(),
                extension_store: Rc::new(ExtensionStore::new()),
                transitively_contains_css: false,
                transitively_contains_extensions: false,
                pre_module_comments: Vec::new(),
            }))
        }
        LoadOutcome::Cached(module) => Ok(module),
        LoadOutcome::NeedsEvaluation => {
            let imported = evaluator.state.loader.borrow().import(&importer, &canonical)?;
            let Some(source) = imported else {
                evaluator.state.loader.borrow_mut().fail_load(&canonical);
                return Err(SassError::ParseError {
                    message: format!("Can't find stylesheet to import: \"{url_text}\"."),
                    span: span.clone(),
                });
            };

            let file = SourceFile::new(Some(canonical.clone()), source.text);
            let stylesheet = match evaluator.state.parser.parse_stylesheet(file, source.syntax) {
                Ok(stylesheet) => stylesheet,
                Err(e) => {
                    evaluator.state.loader.borrow_mut().fail_load(&canonical);
                    return Err(e);
                }
            };

            let mut nested = Evaluator::for_module(evaluator.state, configuration, true);
            let mut nested_env = Environment::new();
            if let Err(e) = eval_block(&mut nested, &mut nested_env, &stylesheet.statements) {
                evaluator.state.loader.borrow_mut().fail_load(&canonical);
                return Err(e);
            }

            if !nested.configuration.is_empty_of_unconsumed() {
                let names: Vec<String> = nested.configuration.names().map(String::from).collect();
                evaluator.state.loader.borrow_mut().fail_load(&canonical);
                return Err(SassError::UnusedConfiguration {
                    url: canonical.to_string(),
                    names,
                    span: span.clone(),
                });
            }

            nested.finalize_style_rules();
            if let Err(e) = nested.extension_store.check_unsatisfied() {
                evaluator.state.loader.borrow_mut().fail_load(&canonical);
                return Err(e);
            }

            let transitively_contains_css =
                nested.seen_non_comment_or_module_rule || nested.upstream_modules.iter().any(|m| m.transitively_contains_css);
            let transitively_contains_extensions =
                !nested.extension_store.is_empty() || nested.upstream_modules.iter().any(|m| m.transitively_contains_extensions);

            let module = Rc::new(Module {
                canonical_url: canonical.clone(),
                css_tree: Rc::new(nested.tree),
                members: nested_env.export_top_level(),
                upstream_modules: nested.upstream_modules,
                extension_store: Rc::new(nested.extension_store),
                transitively_contains_css,
                transitively_contains_extensions,
                pre_module_comments: nested.pre_module_comments,
            });

            evaluator.state.loader.borrow_mut().finish_load(&canonical, module.clone());
            Ok(module)
        }
    }
}

/// Folds a loaded module's extensions and CSS into the loading module,
/// and records it as an upstream dependency of the module currently being
/// built (§4.3 step 6, §3 "Module").
fn integrate_loaded_module(evaluator: &mut Evaluator, module: &Rc<Module>) {
    if !module.extension_store.is_empty() {
        evaluator.extension_store.absorb(&module.extension_store);
    }
    if module.transitively_contains_css {
        let parent = evaluator.current_parent;
        splice_module_css(&module.css_tree, &mut evaluator.tree, parent);
    }
    evaluator.upstream_modules.push(module.clone());
}

fn splice_module_css(src: &CssTree, dest: &mut CssTree, dest_parent: NodeId) {
    for &child in src.get(src.root()).children() {
        splice_subtree(src, child, dest, dest_parent);
    }
}

fn splice_subtree(src: &CssTree, node: NodeId, dest: &mut CssTree, dest_parent: NodeId) -> NodeId {
    let copy = src.copy_without_children(node);
    let span = src.span(node).cloned();
    let new_node = dest.insert(copy, dest_parent, span);
    for &child in src.get(node).children() {
        splice_subtree(src, child, dest, new_node);
    }
    new_node
}
