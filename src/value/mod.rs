use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

mod convert;

pub use convert::{FromValue, WrappingSum};

/// Runtime values that flow through connected ports.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    Float(f32),
    Int(i32),
    Bool(bool),
    Text(String),
    Vector2(Vec2),
    #[default]
    Null,
}

// Manual implementation to handle f32
impl Eq for Value {}

// Manual implementation to handle f32 by hashing its bits
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Float(n) => n.to_bits().hash(state),
            Value::Int(i) => i.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Text(s) => s.hash(state),
            Value::Vector2(v) => {
                v.x.to_bits().hash(state);
                v.y.to_bits().hash(state);
            }
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(n) => {
                // Huge whole numbers keep float formatting; an i64 cast saturates.
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Int(i) => write!(f, "{}", i),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Vector2(v) => write!(f, "({}, {})", v.x, v.y),
            Value::Null => write!(f, "null"),
        }
    }
}

impl Value {
    /// The declared type this value satisfies, `None` for `Null`.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Float(_) => Some(ValueType::Float),
            Value::Int(_) => Some(ValueType::Int),
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Text(_) => Some(ValueType::Text),
            Value::Vector2(_) => Some(ValueType::Vector2),
            Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts a JSON literal into a port value.
    ///
    /// Integral numbers stay integers, other numbers become floats and
    /// two-element numeric arrays become vectors. Anything else is `Null`.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(num) => {
                if let Some(i) = num.as_i64().and_then(|i| i32::try_from(i).ok()) {
                    Value::Int(i)
                } else if let Some(f) = num.as_f64() {
                    Value::Float(f as f32)
                } else {
                    Value::Null
                }
            }
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => match items.as_slice() {
                [x, y] => match (x.as_f64(), y.as_f64()) {
                    (Some(x), Some(y)) => Value::Vector2(Vec2::new(x as f32, y as f32)),
                    _ => Value::Null,
                },
                _ => Value::Null,
            },
            _ => Value::Null,
        }
    }

    /// Coerces this value towards `target`, widening ints to floats where needed.
    pub fn coerce(self, target: ValueType) -> Self {
        match (self, target) {
            (Value::Int(i), ValueType::Float) => Value::Float(i as f32),
            (value, _) => value,
        }
    }
}

/// The declared value type of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Float,
    Int,
    Bool,
    Text,
    Vector2,
    /// Accepts any value; used by generic sinks and dynamic ports.
    Any,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Float => "float",
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::Text => "text",
            ValueType::Vector2 => "vector2",
            ValueType::Any => "any",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Float(42.0).to_string(), "42");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Float(-7.0).to_string(), "-7");
        assert_eq!(Value::Float(1e20).to_string(), "100000000000000000000");
        assert_ne!(Value::Float(1e20).to_string(), i64::MAX.to_string());
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Text("hi".to_string()).to_string(), "\"hi\"");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn test_from_json_literals() {
        assert_eq!(Value::from_json(&serde_json::json!(3)), Value::Int(3));
        assert_eq!(Value::from_json(&serde_json::json!(2.5)), Value::Float(2.5));
        assert_eq!(Value::from_json(&serde_json::json!(true)), Value::Bool(true));
        assert_eq!(
            Value::from_json(&serde_json::json!([1.0, 2.0])),
            Value::Vector2(Vec2::new(1.0, 2.0))
        );
        assert_eq!(Value::from_json(&serde_json::json!({"a": 1})), Value::Null);
    }

    #[test]
    fn test_coerce_int_to_float() {
        assert_eq!(Value::Int(4).coerce(ValueType::Float), Value::Float(4.0));
        assert_eq!(Value::Int(4).coerce(ValueType::Int), Value::Int(4));
    }
}
