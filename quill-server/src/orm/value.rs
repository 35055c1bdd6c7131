//! Dynamically typed column values

use std::fmt;

use serde::Serialize;

use super::OrmError;

/// A single column value, bound positionally into a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    BigInt(i64),
    Double(f64),
    Bool(bool),
    Null,
}

impl SqlValue {
    /// Name of the variant, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::BigInt(_) => "bigint",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::Null => "null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{}'", s),
            Self::BigInt(n) => write!(f, "{}", n),
            Self::Double(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        Self::BigInt(n)
    }
}

impl From<u32> for SqlValue {
    fn from(n: u32) -> Self {
        Self::BigInt(i64::from(n))
    }
}

impl From<f64> for SqlValue {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

fn mismatch(expected: &'static str, found: &SqlValue) -> OrmError {
    OrmError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

impl TryFrom<SqlValue> for String {
    type Error = OrmError;

    fn try_from(v: SqlValue) -> Result<Self, Self::Error> {
        match v {
            SqlValue::Text(s) => Ok(s),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl TryFrom<SqlValue> for Option<String> {
    type Error = OrmError;

    fn try_from(v: SqlValue) -> Result<Self, Self::Error> {
        match v {
            SqlValue::Null => Ok(None),
            other => String::try_from(other).map(Some),
        }
    }
}

impl TryFrom<SqlValue> for i64 {
    type Error = OrmError;

    fn try_from(v: SqlValue) -> Result<Self, Self::Error> {
        match v {
            SqlValue::BigInt(n) => Ok(n),
            other => Err(mismatch("bigint", &other)),
        }
    }
}

impl TryFrom<SqlValue> for f64 {
    type Error = OrmError;

    fn try_from(v: SqlValue) -> Result<Self, Self::Error> {
        match v {
            SqlValue::Double(n) => Ok(n),
            SqlValue::BigInt(n) => Ok(n as f64),
            other => Err(mismatch("double", &other)),
        }
    }
}

impl TryFrom<SqlValue> for Option<f64> {
    type Error = OrmError;

    fn try_from(v: SqlValue) -> Result<Self, Self::Error> {
        match v {
            SqlValue::Null => Ok(None),
            other => f64::try_from(other).map(Some),
        }
    }
}

impl TryFrom<SqlValue> for bool {
    type Error = OrmError;

    fn try_from(v: SqlValue) -> Result<Self, Self::Error> {
        match v {
            SqlValue::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_maps_to_null() {
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Null);
        assert_eq!(
            SqlValue::from(Some("x")),
            SqlValue::Text("x".to_string())
        );
    }

    #[test]
    fn integer_widens_to_double() {
        let v: f64 = SqlValue::BigInt(3).try_into().unwrap();
        assert_eq!(v, 3.0);
    }

    #[test]
    fn mismatch_names_both_sides() {
        let err = bool::try_from(SqlValue::Text("yes".into())).unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: expected bool, found text");
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![
            SqlValue::Text("a".into()),
            SqlValue::BigInt(1),
            SqlValue::Null,
        ])
        .unwrap();
        assert_eq!(json, r#"["a",1,null]"#);
    }
}
