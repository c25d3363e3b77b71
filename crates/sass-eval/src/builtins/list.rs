use std::rc::Rc;

use sass_env::ModuleMembers;
use sass_value::{ListSeparator, Number, Value};

use super::{global::list_index, register};

/// `sass:list` (§1).
pub fn module() -> Rc<ModuleMembers> {
    let m = ModuleMembers::new();

    register(&m, "length", 1, Some(1), |args, _span| {
        Ok(Value::Number(Number::new(args[0].as_list().len() as f64)))
    });

    register(&m, "nth", 2, Some(2), |args, span| {
        let list = args[0].as_list();
        let index = list_index(&args[1], list.len(), span)?;
        Ok(list[index].clone())
    });

    register(&m, "append", 2, Some(3), |args, _span| {
        let mut items = args[0].as_list();
        items.push(args[1].clone());
        let separator = match &args[0] {
            Value::List(l) if l.separator != ListSeparator::Undecided => l.separator,
            _ => ListSeparator::Space,
        };
        Ok(Value::list(items, separator, false))
    });

    register(&m, "join", 1, Some(2), |args, _span| {
        let mut items = args[0].as_list();
        if let Some(second) = args.get(1) {
            items.extend(second.as_list());
        }
        Ok(Value::list(items, ListSeparator::Space, false))
    });

    register(&m, "separator", 1, Some(1), |args, _span| {
        let text = match args[0].separator() {
            ListSeparator::Comma => "comma",
            ListSeparator::Space => "space",
            ListSeparator::Slash => "slash",
            ListSeparator::Undecided => "space",
        };
        Ok(Value::string(text, true))
    });

    register(&m, "is-bracketed", 1, Some(1), |args, _span| {
        Ok(Value::Boolean(matches!(&args[0], Value::List(l) if l.has_brackets)))
    });

    m
}
