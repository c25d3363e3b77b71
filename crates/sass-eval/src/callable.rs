use std::rc::Rc;

use sass_ast::{ArgumentDeclaration, CallArguments};
use sass_diagnostics::{ReferenceKind, SassError, SassResult, Span, StackFrame};
use sass_env::{Callable, ContentBlock, Environment};
use sass_value::{ArgumentList, ListSeparator, Value};

use crate::context::Evaluator;
use crate::control::ControlFlow;
use crate::expr;

/// The result of evaluating a call site's [`CallArguments`] against the
/// caller's environment, before any binding against a callable's own
/// parameter list happens (§4.2 argument binding).
struct EvaluatedArguments {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

fn evaluate_arguments(
    evaluator: &mut Evaluator,
    env: &mut Environment,
    call: &CallArguments,
    span: &Span,
) -> SassResult<EvaluatedArguments> {
    let mut positional = Vec::with_capacity(call.positional.len());
    for arg in &call.positional {
        positional.push(expr::eval(evaluator, env, arg)?);
    }
    let mut named = Vec::with_capacity(call.named.len());
    for (name, arg) in &call.named {
        named.push((name.clone(), expr::eval(evaluator, env, arg)?));
    }
    if let Some(rest_expr) = &call.rest {
        match expr::eval(evaluator, env, rest_expr)? {
            Value::List(list) => positional.extend(list.items.iter().cloned()),
            Value::ArgumentList(arglist) => {
                positional.extend(arglist.positional.iter().cloned());
                named.extend(arglist.named.iter().cloned());
            }
            other => {
                return Err(SassError::BadArguments {
                    message: format!("{} isn't a valid list to splat with `...`.", other.type_name()),
                    span: span.clone(),
                })
            }
        }
    }
    if let Some(kw_expr) = &call.keyword_rest {
        match expr::eval(evaluator, env, kw_expr)? {
            Value::Map(map) => {
                for (key, value) in map.iter() {
                    let Value::String(name, _) = key else {
                        return Err(SassError::BadArguments {
                            message: "Variable keyword arguments must be strings.".to_string(),
                            span: span.clone(),
                        });
                    };
                    named.push((name.to_string(), value.clone()));
                }
            }
            other => {
                return Err(SassError::BadArguments {
                    message: format!("{} isn't a valid map to splat with `...`.", other.type_name()),
                    span: span.clone(),
                })
            }
        }
    }
    Ok(EvaluatedArguments { positional, named })
}

/// Binds already-evaluated call-site arguments against a callable's
/// [`ArgumentDeclaration`] (§4.2): positional parameters first, then
/// named-by-name, then defaults — evaluated in the *callee's* pushed
/// closure scope so a later default can see an earlier bound argument —
/// and finally a `...` rest parameter capturing whatever positional and
/// named arguments are left over as an [`ArgumentList`].
fn bind_arguments(
    evaluator: &mut Evaluator,
    declared: &ArgumentDeclaration,
    evaluated: EvaluatedArguments,
    closure: &Environment,
    span: &Span,
) -> SassResult<Environment> {
    let mut call_env = closure.clone();
    call_env.push_scope(false);

    let mut positional = evaluated.positional.into_iter();
    let mut named = evaluated.named;

    for spec in &declared.arguments {
        if let Some(value) = positional.next() {
            call_env.declare_variable(&spec.name, value, span.clone());
            continue;
        }
        if let Some(pos) = named.iter().position(|(n, _)| n == &spec.name) {
            let (_, value) = named.remove(pos);
            call_env.declare_variable(&spec.name, value, span.clone());
            continue;
        }
        if let Some(default) = &spec.default {
            let value = expr::eval(evaluator, &mut call_env, default)?;
            call_env.declare_variable(&spec.name, value, span.clone());
            continue;
        }
        return Err(SassError::BadArguments {
            message: format!("Missing argument ${}.", spec.name),
            span: span.clone(),
        });
    }

    let leftover_positional: Vec<Value> = positional.collect();

    if let Some(rest_name) = &declared.rest {
        let arglist = ArgumentList::new(leftover_positional, named, ListSeparator::Comma);
        call_env.declare_variable(rest_name, Value::ArgumentList(Rc::new(arglist)), span.clone());
    } else if !leftover_positional.is_empty() || !named.is_empty() {
        return Err(SassError::BadArguments {
            message: format!(
                "Only {} argument{} allowed, but {} {} passed.",
                declared.arguments.len(),
                if declared.arguments.len() == 1 { "" } else { "s" },
                declared.arguments.len() + leftover_positional.len() + named.len(),
                if declared.arguments.len() + leftover_positional.len() + named.len() == 1 {
                    "was"
                } else {
                    "were"
                }
            ),
            span: span.clone(),
        });
    }

    Ok(call_env)
}

fn evaluate_builtin_args(
    evaluator: &mut Evaluator,
    env: &mut Environment,
    call: &CallArguments,
    span: &Span,
) -> SassResult<Vec<Value>> {
    if !call.named.is_empty() || call.keyword_rest.is_some() {
        return Err(SassError::BadArguments {
            message: "Built-in functions in this core only accept positional arguments.".to_string(),
            span: span.clone(),
        });
    }
    let mut args = Vec::with_capacity(call.positional.len());
    for arg in &call.positional {
        args.push(expr::eval(evaluator, env, arg)?);
    }
    if let Some(rest_expr) = &call.rest {
        match expr::eval(evaluator, env, rest_expr)? {
            Value::List(list) => args.extend(list.items.iter().cloned()),
            Value::ArgumentList(arglist) => args.extend(arglist.positional.iter().cloned()),
            other => {
                return Err(SassError::BadArguments {
                    message: format!("{} isn't a valid list to splat with `...`.", other.type_name()),
                    span: span.clone(),
                })
            }
        }
    }
    Ok(args)
}

fn check_arity(name: &str, got: usize, min: usize, max: Option<usize>, span: &Span) -> SassResult<()> {
    if got < min || max.is_some_and(|max| got > max) {
        return Err(SassError::BadArguments {
            message: format!("{name}() takes the wrong number of arguments."),
            span: span.clone(),
        });
    }
    Ok(())
}

/// Invokes a function call (§4.4/§9 "Callable polymorphism"), dispatching
/// on the three shapes a [`Callable`] can take.
pub fn call_function(
    evaluator: &mut Evaluator,
    env: &mut Environment,
    callable: &Rc<Callable>,
    call: &CallArguments,
    span: &Span,
) -> SassResult<Value> {
    match callable.as_ref() {
        Callable::BuiltIn {
            name,
            min_args,
            max_args,
            implementation,
        } => {
            let args = evaluate_builtin_args(evaluator, env, call, span)?;
            check_arity(name, args.len(), *min_args, *max_args, span)?;
            implementation(&args, span)
        }
        Callable::UserDefined {
            name,
            arguments,
            body,
            closure,
            in_dependency,
            ..
        } => {
            let evaluated = evaluate_arguments(evaluator, env, call, span)?;
            let mut call_env = bind_arguments(evaluator, arguments, evaluated, closure, span)?;
            let frame = StackFrame {
                member_name: name.clone(),
                span: span.clone(),
            };
            let previous_in_dependency = evaluator.in_dependency;
            evaluator.in_dependency = *in_dependency;
            let result = evaluator
                .with_call_frame(frame, |evaluator| crate::stmt::eval_function_body(evaluator, &mut call_env, body, span));
            evaluator.in_dependency = previous_in_dependency;
            result
        }
        Callable::PlainCss { name } => expr::plain_css_call(evaluator, env, name, call, span),
    }
}

/// Invokes a mixin (§4.4), threading an already-evaluated `@content` block
/// (if any) into the callee's environment so a bare `@content` inside the
/// mixin body runs it.
pub fn call_mixin(
    evaluator: &mut Evaluator,
    env: &mut Environment,
    callable: &Rc<Callable>,
    call: &CallArguments,
    content: Option<Rc<ContentBlock>>,
    span: &Span,
) -> SassResult<()> {
    match callable.as_ref() {
        Callable::UserDefined {
            name,
            arguments,
            body,
            closure,
            in_dependency,
            ..
        } => {
            let evaluated = evaluate_arguments(evaluator, env, call, span)?;
            let mut call_env = bind_arguments(evaluator, arguments, evaluated, closure, span)?;
            let frame = StackFrame {
                member_name: name.clone(),
                span: span.clone(),
            };
            let previous_in_dependency = evaluator.in_dependency;
            evaluator.in_dependency = *in_dependency;
            let result = evaluator.with_call_frame(frame, |evaluator| {
                call_env.with_content(content, |call_env| {
                    call_env.as_mixin(|call_env| crate::stmt::eval_block(evaluator, call_env, body).map(|_| ()))
                })
            });
            evaluator.in_dependency = previous_in_dependency;
            result
        }
        Callable::BuiltIn { name, .. } => Err(SassError::Internal {
            message: format!("built-in mixin \"{name}\" has no implementation"),
        }),
        Callable::PlainCss { name } => Err(SassError::UndefinedReference {
            kind: ReferenceKind::Mixin,
            name: name.clone(),
            span: span.clone(),
        }),
    }
}

/// Binds a `@content` invocation's block arguments (the content block's
/// own `using (...)` declaration, if any) and runs its body in the
/// environment captured at the `@include` call site.
///
/// Simplification: `@content` in this AST carries no argument expressions
/// of its own (`Statement::Content` is a bare span), so this only binds
/// defaults, never actual call-site values — documented in DESIGN.md.
pub fn invoke_content(evaluator: &mut Evaluator, content: &ContentBlock, span: &Span) -> SassResult<()> {
    let mut content_env = content.environment.clone();
    content_env.push_scope(false);
    if let Some(declared) = &content.arguments {
        for spec in &declared.arguments {
            let value = match &spec.default {
                Some(default) => expr::eval(evaluator, &mut content_env, default)?,
                None => Value::Null,
            };
            content_env.declare_variable(&spec.name, value, span.clone());
        }
    }
    crate::stmt::eval_block(evaluator, &mut content_env, &content.body).map(|_| ())
}
