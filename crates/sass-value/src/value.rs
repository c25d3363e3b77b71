use std::cell::Cell;
use std::rc::Rc;

use crate::calculation::Calculation;
use crate::color::Color;
use crate::number::Number;
use crate::unit::fuzzy_equals;

/// How the items of a [`SassList`] were (or should be) separated when
/// written back out as CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSeparator {
    Space,
    Comma,
    Slash,
    /// A list with 0 or 1 elements has no separator to observe yet; it
    /// takes on whatever separator it's later combined with.
    Undecided,
}

#[derive(Debug, Clone)]
pub struct SassList {
    pub items: Vec<Value>,
    pub separator: ListSeparator,
    pub has_brackets: bool,
}

impl SassList {
    pub fn new(items: Vec<Value>, separator: ListSeparator, has_brackets: bool) -> Self {
        Self {
            items,
            separator,
            has_brackets,
        }
    }
}

/// The argument list bound to `$args` inside a callable declared with a
/// `...` rest parameter. Distinct from a plain list because
/// `meta.keywords()` needs to observe whether its keyword half was ever
/// read, and because it carries named arguments alongside positional ones.
#[derive(Debug, Clone)]
pub struct ArgumentList {
    pub positional: Vec<Value>,
    pub named: Vec<(String, Value)>,
    pub separator: ListSeparator,
    /// Set once `meta.keywords()` reads `named`, per §3.
    pub keywords_accessed: Rc<Cell<bool>>,
}

impl ArgumentList {
    pub fn new(positional: Vec<Value>, named: Vec<(String, Value)>, separator: ListSeparator) -> Self {
        Self {
            positional,
            named,
            separator,
            keywords_accessed: Rc::new(Cell::new(false)),
        }
    }

    pub fn mark_keywords_accessed(&self) {
        self.keywords_accessed.set(true);
    }
}

/// An ordered Sass map: insertion order is preserved, and keys compare by
/// [`Value::equals`] rather than by `==`, so e.g. `1` and `1.0` collide as
/// the same key the way the spec requires.
#[derive(Debug, Clone, Default)]
pub struct SassMap {
    entries: Vec<(Value, Value)>,
}

impl SassMap {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn from_pairs(entries: Vec<(Value, Value)>) -> Self {
        let mut map = Self::new();
        for (k, v) in entries {
            map.insert(k, v);
        }
        map
    }

    /// Inserts `key => value`, overwriting the value (but not the
    /// position) of an existing structurally-equal key.
    pub fn insert(&mut self, key: Value, value: Value) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k.equals(&key)) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k.equals(key)).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }

    /// Bag equality: same size and every key/value pair in `self` has a
    /// structurally-equal counterpart in `other` (§4.1: "maps compare as
    /// unordered bags").
    pub fn equals(&self, other: &SassMap) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.entries.iter().all(|(k, v)| {
            other
                .get(k)
                .is_some_and(|ov| v.equals(ov))
        })
    }
}

/// An opaque handle to a user-defined or built-in callable, resolved by the
/// environment layer (C2). Kept lightweight here so the value algebra
/// doesn't need to depend on closures or ASTs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    pub name: String,
    pub id: u64,
}

/// A SassScript value (§3). Cloning is cheap for scalars and shares the
/// underlying `Vec`/`Rc` storage for compound values.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(Number),
    Color(Color),
    String(Rc<str>, /* quoted */ bool),
    List(Rc<SassList>),
    ArgumentList(Rc<ArgumentList>),
    Map(Rc<SassMap>),
    Function(FunctionRef),
    Calculation(Rc<Calculation>),
}

impl Value {
    pub fn string(text: impl Into<Rc<str>>, quoted: bool) -> Self {
        Value::String(text.into(), quoted)
    }

    pub fn list(items: Vec<Value>, separator: ListSeparator, has_brackets: bool) -> Self {
        Value::List(Rc::new(SassList::new(items, separator, has_brackets)))
    }

    pub fn empty_list() -> Self {
        Value::list(Vec::new(), ListSeparator::Undecided, false)
    }

    /// Truthiness per §4.1: everything is truthy except `null` and `false`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "bool",
            Value::Number(_) => "number",
            Value::Color(_) => "color",
            Value::String(..) => "string",
            Value::List(_) => "list",
            Value::ArgumentList(_) => "arglist",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
            Value::Calculation(_) => "calculation",
        }
    }

    /// Every value except maps and bare argument lists can also be viewed
    /// as a single-element (or, for lists, multi-element) list — used
    /// pervasively by list built-ins and by `@each`.
    pub fn as_list(&self) -> Vec<Value> {
        match self {
            Value::List(l) => l.items.clone(),
            Value::ArgumentList(a) => a.positional.clone(),
            Value::Map(m) => m
                .iter()
                .map(|(k, v)| Value::list(vec![k.clone(), v.clone()], ListSeparator::Space, false))
                .collect(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        }
    }

    pub fn separator(&self) -> ListSeparator {
        match self {
            Value::List(l) => l.separator,
            Value::ArgumentList(a) => a.separator,
            _ => ListSeparator::Undecided,
        }
    }

    /// Structural equality (§4.1). Numbers compare with the shared fuzzy
    /// tolerance after unit normalization; lists compare element-wise
    /// including separator and bracket flag; maps compare as bags; colors
    /// compare by exact channel and fuzzy alpha.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
            (Value::Color(a), Value::Color(b)) => a.equals(b),
            (Value::String(a, _), Value::String(b, _)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.separator == b.separator
                    && a.has_brackets == b.has_brackets
                    && a.items.len() == b.items.len()
                    && a.items.iter().zip(&b.items).all(|(x, y)| x.equals(y))
            }
            (Value::Map(a), Value::Map(b)) => a.equals(b),
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Calculation(_), Value::Calculation(_)) => {
                // Calculations compare by their serialized form; computed
                // by the caller, since this crate doesn't own serialization.
                false
            }
            _ => false,
        }
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match a.value_in_units(&b.numer, &b.denom) {
        Some(converted) => fuzzy_equals(converted, b.value),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_spec() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Number(Number::new(0.0)).is_truthy());
        assert!(Value::string("", true).is_truthy());
    }

    #[test]
    fn one_and_one_point_zero_are_equal_map_keys() {
        let mut map = SassMap::new();
        map.insert(Value::Number(Number::new(1.0)), Value::string("a", true));
        map.insert(Value::Number(Number::new(1.0000000000001)), Value::string("b", true));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn lists_with_different_separators_are_unequal() {
        let a = Value::list(
            vec![Value::Number(Number::new(1.0))],
            ListSeparator::Comma,
            false,
        );
        let b = Value::list(
            vec![Value::Number(Number::new(1.0))],
            ListSeparator::Space,
            false,
        );
        assert!(!a.equals(&b));
    }

    #[test]
    fn maps_compare_as_unordered_bags() {
        let m1 = SassMap::from_pairs(vec![
            (Value::string("a", true), Value::Number(Number::new(1.0))),
            (Value::string("b", true), Value::Number(Number::new(2.0))),
        ]);
        let m2 = SassMap::from_pairs(vec![
            (Value::string("b", true), Value::Number(Number::new(2.0))),
            (Value::string("a", true), Value::Number(Number::new(1.0))),
        ]);
        assert!(m1.equals(&m2));
    }
}
