use sass_value::Value;

/// Early-return from a function body (§9 "Exceptions replaced by typed
/// errors": `@return` is `ControlFlow::Return(Value)` carried through the
/// statement visitor's return type rather than an exception).
#[derive(Debug, Clone)]
pub enum ControlFlow {
    Normal,
    Return(Value),
}

impl ControlFlow {
    pub fn is_returning(&self) -> bool {
        matches!(self, ControlFlow::Return(_))
    }
}
