//! ORM error type

/// Errors raised while describing models or running their statements
#[derive(Debug, thiserror::Error)]
pub enum OrmError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("model {model} declares a second primary key: {field}")]
    DuplicatePrimaryKey { model: &'static str, field: &'static str },

    #[error("model {model} has no primary key")]
    MissingPrimaryKey { model: &'static str },

    #[error("model {model} has no field '{field}'")]
    UnknownField { model: &'static str, field: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl OrmError {
    /// True when the statement hit a unique index (SQLSTATE 23505).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Sqlx(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}
