//! Dynamic values passed to and returned from members.
//!
//! [`Value`] is what member bodies receive as arguments, return as results,
//! and what instances store in their fields. [`FromValue`] extracts typed
//! Rust values from it; `From` impls go the other way.
//!
//! ## Supported Types
//!
//! - Integers: `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32`, `usize`
//! - Floats: `f32`, `f64`
//! - Boolean: `bool`
//! - Strings: `String`, `&str` (into only)
//! - Runtime handles: [`Instance`], [`Method`], [`TypeId`]

use std::collections::BTreeMap;
use std::fmt;

use lineage_core::TypeId;

use crate::error::ConversionError;
use crate::instance::Instance;
use crate::method::Method;

/// A dynamically typed value.
#[derive(Clone, Default)]
pub enum Value {
    /// No value. What a call-next past the end of the chain yields.
    #[default]
    Void,
    Bool(bool),
    /// All integer widths are stored as i64.
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Reference to an instance.
    Object(Instance),
    /// Reference to a class, singleton or module.
    Type(TypeId),
    Method(Method),
}

impl Value {
    /// Get a human-readable name for this value's variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Type(_) => "type",
            Value::Method(_) => "method",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Method(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Value::Method(method) => Some(method),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "Void"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Value::Object(instance) => write!(f, "Object({:?})", instance),
            Value::Type(id) => write!(f, "Type({})", id),
            Value::Method(method) => write!(f, "Method({:?})", method),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                f.write_str("}")
            }
            Value::Object(instance) => write!(f, "{}", instance),
            Value::Type(id) => write!(f, "{}", id),
            Value::Method(method) => match method.label() {
                Some(label) => f.write_str(&label),
                None => f.write_str("<method>"),
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Instances and methods compare by identity
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Method(a), Value::Method(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

// ============================================================================
// Conversions into Value
// ============================================================================

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(v as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Void
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Value::Object(v)
    }
}

impl From<TypeId> for Value {
    fn from(v: TypeId) -> Self {
        Value::Type(v)
    }
}

impl From<Method> for Value {
    fn from(v: Method) -> Self {
        Value::Method(v)
    }
}

// ============================================================================
// Conversions out of Value
// ============================================================================

/// Extract a typed value from a [`Value`].
pub trait FromValue: Sized {
    /// Returns a `ConversionError` if the value holds an incompatible variant.
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

fn mismatch(expected: &'static str, value: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        actual: value.type_name(),
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: stringify!($ty),
                            }
                        }),
                        other => Err(mismatch("int", other)),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, u8, u16, u32, usize);

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch("int", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(mismatch("float", other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(mismatch("string", other)),
        }
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::List(items) => Ok(items.clone()),
            other => Err(mismatch("list", other)),
        }
    }
}

impl FromValue for Instance {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Object(instance) => Ok(instance.clone()),
            other => Err(mismatch("object", other)),
        }
    }
}

impl FromValue for TypeId {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Type(id) => Ok(*id),
            other => Err(mismatch("type", other)),
        }
    }
}

impl FromValue for Method {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Method(method) => Ok(method.clone()),
            other => Err(mismatch("method", other)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_checks_bounds() {
        assert_eq!(i32::from_value(&Value::Int(42)), Ok(42));
        assert_eq!(
            u8::from_value(&Value::Int(300)),
            Err(ConversionError::IntegerOverflow {
                value: 300,
                target_type: "u8"
            })
        );
        assert!(u32::from_value(&Value::Int(-1)).is_err());
    }

    #[test]
    fn mismatch_reports_both_sides() {
        assert_eq!(
            String::from_value(&Value::Int(1)),
            Err(ConversionError::TypeMismatch {
                expected: "string",
                actual: "int"
            })
        );
    }

    #[test]
    fn float_accepts_ints() {
        assert_eq!(f64::from_value(&Value::Int(2)), Ok(2.0));
    }

    #[test]
    fn display_formats_nested_values() {
        let value = Value::List(vec![Value::from(1), Value::from("two"), Value::Void]);
        assert_eq!(value.to_string(), "[1, two, ]");

        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::from(true));
        map.insert("a".to_string(), Value::from(1.5));
        assert_eq!(Value::Map(map).to_string(), "{a: 1.5, b: true}");
    }

    #[test]
    fn methods_compare_by_identity() {
        let a = Method::new(|_| Ok(Value::Void));
        let b = Method::new(|_| Ok(Value::Void));
        assert_eq!(Value::from(a.clone()), Value::from(a));
        assert_ne!(Value::Method(b.clone()), Value::Method(Method::new(|_| Ok(Value::Void))));
        assert!(Value::Method(b).is_callable());
    }

    #[test]
    fn void_is_default() {
        assert!(Value::default().is_void());
        assert_eq!(Value::from(()), Value::Void);
    }
}
