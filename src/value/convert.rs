use super::Value;
use glam::Vec2;

/// Typed extraction of a [`Value`].
///
/// Reads never coerce across types: a port carrying `Value::Int(1)` is not an
/// `f32`. Mismatches surface as `None` and the typed getters on the graph turn
/// that into a default or skip the entry, depending on the getter.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ( $( ($ty:ty, $variant:path) ),* $(,)? ) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        $variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    $variant(v)
                }
            }
        )*
    };
}

impl_from_value! {
    (f32, Value::Float),
    (i32, Value::Int),
    (bool, Value::Bool),
    (String, Value::Text),
    (Vec2, Value::Vector2),
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Accumulation used by input sums. Integer sums wrap on overflow instead of
/// panicking.
pub trait WrappingSum: FromValue {
    fn zero() -> Self;
    fn accumulate(self, other: Self) -> Self;
}

impl WrappingSum for f32 {
    fn zero() -> Self {
        0.0
    }

    fn accumulate(self, other: Self) -> Self {
        self + other
    }
}

impl WrappingSum for i32 {
    fn zero() -> Self {
        0
    }

    fn accumulate(self, other: Self) -> Self {
        self.wrapping_add(other)
    }
}
