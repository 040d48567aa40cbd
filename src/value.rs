//! Core value model for the Brawl interpreter.
//!
//! A value is one of five tagged variants: 64-bit signed integers,
//! booleans, owned strings, ordered pairs, and closure handles. Empty
//! variable slots are represented as `Option<Value>` by their owners,
//! so "undefined" never exists as a first-class value.

use std::fmt;

/// Handle addressing a function entity in the `FunctionTable`.
pub type FnId = usize;

/// A runtime value.
///
/// Integer arithmetic uses two's-complement semantics at 64 bits.
/// Tuples own their elements; closures are handles into the function
/// table and carry no payload of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    Tuple(Box<(Value, Value)>),
    Closure(FnId),
}

impl Value {
    /// Build a tuple value from two elements.
    pub fn tuple(first: Value, second: Value) -> Self {
        Value::Tuple(Box::new((first, second)))
    }

    /// Human-readable name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Tuple(_) => "tuple",
            Value::Closure(_) => "closure",
        }
    }

    /// Whether this value is an integer.
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Language-level equality.
    ///
    /// Structural for tuples, byte-wise for strings, numeric for
    /// integers, logical for booleans. Mismatched tags and closure
    /// operands are errors, reported as a message for the evaluator
    /// to wrap with token context.
    pub fn checked_eq(&self, other: &Value) -> Result<bool, String> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a == b),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::Tuple(a), Value::Tuple(b)) => {
                Ok(a.0.checked_eq(&b.0)? && a.1.checked_eq(&b.1)?)
            }
            (Value::Closure(_), Value::Closure(_)) => {
                Err("closures cannot be compared".to_string())
            }
            (a, b) => Err(format!(
                "cannot compare {} with {}",
                a.type_name(),
                b.type_name()
            )),
        }
    }

    /// The textual fragment this value contributes to `+`
    /// concatenation, or `None` when the value has no such form
    /// (tuples and closures).
    pub fn concat_fragment(&self) -> Option<String> {
        match self {
            Value::Int(n) => Some(n.to_string()),
            Value::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::Tuple(_) | Value::Closure(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Str(s) => write!(f, "{}", s),
            Value::Tuple(pair) => write!(f, "({}, {})", pair.0, pair.1),
            Value::Closure(_) => write!(f, "<#closure>"),
        }
    }
}
