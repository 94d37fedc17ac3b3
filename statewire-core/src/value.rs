//! Values crossing the intercepted API boundary.
//!
//! Every argument passed to an entry point, and every value returned from
//! one or read back through a state query, is carried as a [`Value`]. API
//! objects are referred to by opaque [`Handle`]s whose internals the engine
//! never looks at.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for an API-side object (buffer, texture, shader, ...).
///
/// Two handles refer to the same object iff they compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(u64);

impl Handle {
    /// Reserved identity of the implicit default object.
    ///
    /// APIs must never issue this value; the engine registers it at
    /// construction and it can never be deleted.
    pub const DEFAULT: Handle = Handle(0);

    /// Wrap a raw identifier issued by the API.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw identifier.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this is the reserved default object.
    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("#default")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// A dynamically typed argument, return value, or queried state value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum Value {
    /// The entry point returned nothing.
    #[default]
    Void,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Bools(Vec<bool>),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Text(String),
    Handle(Handle),
}

impl Value {
    /// The handle carried by this value, if any.
    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            Value::Handle(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Truthiness as the API would see it: null, zero, and empty are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Void | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Bools(v) => !v.is_empty(),
            Value::Ints(v) => !v.is_empty(),
            Value::Floats(v) => !v.is_empty(),
            Value::Text(s) => !s.is_empty(),
            Value::Handle(_) => true,
        }
    }

    /// Whether this value means "no object".
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Void | Value::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bools(_) => "bool[]",
            Value::Ints(_) => "int[]",
            Value::Floats(_) => "float[]",
            Value::Text(_) => "text",
            Value::Handle(_) => "handle",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<Handle> for Value {
    fn from(handle: Handle) -> Self {
        Value::Handle(handle)
    }
}

impl From<Option<Handle>> for Value {
    fn from(handle: Option<Handle>) -> Self {
        handle.map_or(Value::Null, Value::Handle)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Floats(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::Ints(v)
    }
}

impl From<Vec<bool>> for Value {
    fn from(v: Vec<bool>) -> Self {
        Value::Bools(v)
    }
}

fn format_float(v: f64) -> String {
    if v == 0.0 {
        return "0".to_owned();
    }
    if v.fract() == 0.0 && v.is_finite() {
        // Display prints every digit of an integral float, beyond i64 too.
        return format!("{v}");
    }
    let fixed = format!("{:.3}", v);
    fixed.trim_end_matches('0').trim_end_matches('.').to_owned()
}

fn join<T>(items: &[T], f: impl Fn(&T) -> String) -> String {
    items.iter().map(f).collect::<Vec<_>>().join(", ")
}

/// Canonical display string for a raw value.
///
/// This is the default slot formatter. Floats are shown with at most three
/// decimals so that values differing only in noise do not flash as changed.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Void | Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => format_float(*v),
        Value::Bools(v) => join(v, |b| b.to_string()),
        Value::Ints(v) => join(v, |i| i.to_string()),
        Value::Floats(v) => join(v, |f| format_float(*f)),
        Value::Text(s) => s.clone(),
        Value::Handle(handle) => handle.to_string(),
    }
}

/// Formatter for flag-like state (`true`/`false` by truthiness).
pub fn format_boolean(value: &Value) -> String {
    value.is_truthy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_handle_is_reserved() {
        assert!(Handle::DEFAULT.is_default());
        assert!(!Handle::from_raw(1).is_default());
        assert_eq!(Handle::DEFAULT.to_string(), "#default");
        assert_eq!(Handle::from_raw(7).to_string(), "#7");
    }

    #[test]
    fn large_integral_floats_keep_their_digits() {
        assert_eq!(format_value(&Value::Float(1e20)), "100000000000000000000");
        assert_ne!(format_value(&Value::Float(1e20)), format_value(&Value::Float(2e20)));
        assert_eq!(format_value(&Value::Float(-4096.0)), "-4096");
        assert_eq!(format_value(&Value::Float(-0.0)), "0");
    }

    #[test]
    fn floats_are_trimmed() {
        assert_eq!(format_value(&Value::Float(1.0)), "1");
        assert_eq!(format_value(&Value::Float(0.5)), "0.5");
        assert_eq!(format_value(&Value::Float(1.0 / 3.0)), "0.333");
        assert_eq!(format_value(&Value::Floats(vec![0.0, 0.25, 1.0])), "0, 0.25, 1");
    }

    #[test]
    fn null_like_values() {
        assert!(Value::Null.is_null());
        assert!(Value::Void.is_null());
        assert!(!Value::Int(0).is_null());
        assert_eq!(format_value(&Value::Null), "null");
        assert_eq!(Value::from(None::<Handle>), Value::Null);
    }

    #[test]
    fn boolean_formatter_uses_truthiness() {
        assert_eq!(format_boolean(&Value::Int(0)), "false");
        assert_eq!(format_boolean(&Value::Int(3)), "true");
        assert_eq!(format_boolean(&Value::Bool(true)), "true");
    }
}
