//! The SassScript value algebra (numbers, colors, strings, lists, maps,
//! calculations and the operators over them), independent of parsing,
//! scoping and serialization.

mod calculation;
mod color;
mod number;
mod ops;
mod unit;
mod value;

pub use calculation::{CalcArg, CalcOp, Calculation, CalculationName};
pub use color::Color;
pub use number::{format_decimal, Number};
pub use ops::{and, compare, div, equals, minus, modulo, not, not_equals, or, plus, single_equals, times, to_css_string, unary_divide, unary_minus, unary_plus, Comparison};
pub use unit::{fuzzy_equals, Unit, EPSILON};
pub use value::{ArgumentList, FunctionRef, ListSeparator, SassList, SassMap, Value};
