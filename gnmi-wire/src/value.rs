//! Typed leaf values as rendered on the wire.

/// The value carried by one update, tagged by the leaf's YANG type.
///
/// Enumerations are rendered as their identity string (`"UP"`,
/// `"SPEED_25GB"`, `"CRITICAL"`); timestamps are unsigned nanoseconds.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedValue {
    StringVal(String),
    UintVal(u64),
    IntVal(i64),
    BoolVal(bool),
    BytesVal(Vec<u8>),
    /// Fixed-precision decimal: `digits * 10^-precision`.
    DecimalVal {
        digits: i64,
        precision: u32,
    },
    JsonVal(String),
}

impl TypedValue {
    pub fn string(value: impl Into<String>) -> Self {
        TypedValue::StringVal(value.into())
    }

    /// Convenience accessor used pervasively by tests.
    pub fn as_string_val(&self) -> Option<&str> {
        match self {
            TypedValue::StringVal(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_uint_val(&self) -> Option<u64> {
        match self {
            TypedValue::UintVal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool_val(&self) -> Option<bool> {
        match self {
            TypedValue::BoolVal(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::StringVal(value.to_string())
    }
}

impl From<u64> for TypedValue {
    fn from(value: u64) -> Self {
        TypedValue::UintVal(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::BoolVal(value)
    }
}
