use std::rc::Rc;

use sass_diagnostics::{SassError, Span};
use sass_env::ModuleMembers;
use sass_value::{to_css_string, Value};

use super::register;

/// `sass:meta` (§1): reflection built-ins, including the one path that
/// sets `ArgumentList::keywords_accessed` (§3 invariant).
pub fn module() -> Rc<ModuleMembers> {
    let m = ModuleMembers::new();

    register(&m, "inspect", 1, Some(1), |args, span| {
        Ok(Value::string(to_css_string(&args[0], true, span)?, false))
    });

    register(&m, "type-of", 1, Some(1), |args, _span| {
        Ok(Value::string(args[0].type_name(), false))
    });

    register(&m, "keywords", 1, Some(1), |args, span| {
        let Value::ArgumentList(arglist) = &args[0] else {
            return Err(SassError::TypeError {
                message: format!("{} isn't an argument list", args[0].type_name()),
                span: span.clone(),
            });
        };
        arglist.mark_keywords_accessed();
        let mut map = sass_value::SassMap::new();
        for (name, value) in &arglist.named {
            map.insert(Value::string(name.clone(), true), value.clone());
        }
        Ok(Value::Map(Rc::new(map)))
    });

    register(&m, "feature-exists", 1, Some(1), |_args, _span| Ok(Value::Boolean(false)));

    m
}
