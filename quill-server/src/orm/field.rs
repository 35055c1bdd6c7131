//! Column descriptors

use std::fmt;

use super::SqlValue;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Varchar(u16),
    Boolean,
    BigInt,
    Double,
    Text,
}

impl ColumnType {
    /// SQL type used in DDL.
    pub fn ddl(&self) -> String {
        match self {
            Self::Varchar(len) => format!("varchar({})", len),
            Self::Boolean => "boolean".to_string(),
            Self::BigInt => "bigint".to_string(),
            Self::Double => "double precision".to_string(),
            Self::Text => "text".to_string(),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Varchar(_) => "StringField",
            Self::Boolean => "BooleanField",
            Self::BigInt => "IntegerField",
            Self::Double => "FloatField",
            Self::Text => "TextField",
        }
    }
}

/// Default applied when a model is saved with the field unset
#[derive(Debug, Clone)]
pub enum FieldDefault {
    None,
    Value(SqlValue),
    /// Called once per save, e.g. id or timestamp generators
    Generate(fn() -> SqlValue),
}

impl FieldDefault {
    pub fn produce(&self) -> Option<SqlValue> {
        match self {
            Self::None => None,
            Self::Value(v) => Some(v.clone()),
            Self::Generate(f) => Some(f()),
        }
    }
}

/// Describes one column of a model's table.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub nullable: bool,
    pub default: FieldDefault,
}

impl Field {
    fn new(name: &'static str, column_type: ColumnType, default: FieldDefault) -> Self {
        Self {
            name,
            column_type,
            primary_key: false,
            nullable: false,
            default,
        }
    }

    /// `varchar(100)` column; use [`Field::ddl`] to change the length.
    pub fn string(name: &'static str) -> Self {
        Self::new(name, ColumnType::Varchar(100), FieldDefault::None)
    }

    /// Boolean column, defaults to `false`. Never a primary key.
    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, ColumnType::Boolean, FieldDefault::Value(SqlValue::Bool(false)))
    }

    /// `bigint` column, defaults to `0`.
    pub fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnType::BigInt, FieldDefault::Value(SqlValue::BigInt(0)))
    }

    /// `double precision` column, defaults to `0.0`.
    pub fn float(name: &'static str) -> Self {
        Self::new(name, ColumnType::Double, FieldDefault::Value(SqlValue::Double(0.0)))
    }

    /// Unbounded `text` column. Never a primary key.
    pub fn text(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text, FieldDefault::None)
    }

    /// Mark as primary key. Ignored for boolean and text columns.
    pub fn primary_key(mut self) -> Self {
        if !matches!(self.column_type, ColumnType::Boolean | ColumnType::Text) {
            self.primary_key = true;
        }
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Override the varchar length.
    pub fn ddl(mut self, len: u16) -> Self {
        if let ColumnType::Varchar(_) = self.column_type {
            self.column_type = ColumnType::Varchar(len);
        }
        self
    }

    pub fn default_value(mut self, value: impl Into<SqlValue>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    pub fn default_with(mut self, generate: fn() -> SqlValue) -> Self {
        self.default = FieldDefault::Generate(generate);
        self
    }

    /// Column definition used by `CREATE TABLE`.
    pub fn column_sql(&self) -> String {
        let null = if self.nullable { "" } else { " NOT NULL" };
        format!("\"{}\" {}{}", self.name, self.column_type.ddl(), null)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{},{}:{}>",
            self.column_type.kind_name(),
            self.column_type.ddl(),
            self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_mapping_log_format() {
        let field = Field::string("id").ddl(50).primary_key();
        assert_eq!(field.to_string(), "<StringField,varchar(50):id>");
    }

    #[test]
    fn boolean_and_text_cannot_be_primary() {
        assert!(!Field::boolean("admin").primary_key().primary_key);
        assert!(!Field::text("content").primary_key().primary_key);
        assert!(Field::integer("n").primary_key().primary_key);
    }

    #[test]
    fn kind_defaults() {
        assert_eq!(Field::boolean("b").default.produce(), Some(SqlValue::Bool(false)));
        assert_eq!(Field::integer("i").default.produce(), Some(SqlValue::BigInt(0)));
        assert_eq!(Field::float("f").default.produce(), Some(SqlValue::Double(0.0)));
        assert_eq!(Field::text("t").default.produce(), None);
    }

    #[test]
    fn generator_runs_per_call() {
        fn gen() -> SqlValue {
            SqlValue::Text("fresh".into())
        }
        let field = Field::string("id").default_with(gen);
        assert_eq!(field.default.produce(), Some(SqlValue::Text("fresh".into())));
    }

    #[test]
    fn column_sql() {
        assert_eq!(
            Field::text("content").column_sql(),
            "\"content\" text NOT NULL"
        );
        assert_eq!(
            Field::string("parent_id").ddl(50).nullable().column_sql(),
            "\"parent_id\" varchar(50)"
        );
    }
}
