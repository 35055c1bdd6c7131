//! User model and registration input validation

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::id::{next_id, next_id_value, now_value};
use super::validation::bounded_text;
use super::ValidationError;
use crate::orm::{Field, Model, ModelMeta, OrmError, SqlValue};

/// Maximum length for emails and display names (column width)
const MAX_EMAIL_LEN: usize = 50;
const MAX_NAME_LEN: usize = 50;

/// Shown instead of the stored password digest
pub const MASKED_PASSWD: &str = "******";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9.\-_]+@[a-z0-9\-_]+(\.[a-z0-9\-_]+){1,4}$").expect("invalid email regex")
});

/// Client-side SHA-256 of `email:password`, lowercase hex
static DIGEST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-f]{64}$").expect("invalid digest regex"));

static USER_META: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new(
        "User",
        "users",
        vec![
            Field::string("id").ddl(50).primary_key().default_with(next_id_value),
            Field::string("email").ddl(50),
            Field::string("passwd").ddl(64),
            Field::boolean("admin"),
            Field::string("name").ddl(50),
            Field::string("image").ddl(500),
            Field::float("created_at").default_with(now_value),
        ],
    )
    .expect("invalid User mapping")
});

/// Registered user, table `users`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Option<String>,
    pub email: String,
    /// Server-side digest, see [`crate::session::hash_password`]
    pub passwd: String,
    pub admin: bool,
    pub name: String,
    pub image: String,
    pub created_at: Option<f64>,
}

impl User {
    /// New, unsaved user with a fresh id and hashed password.
    pub fn register(email: Email, name: DisplayName, digest: &PasswordDigest) -> Self {
        let id = next_id();
        let passwd = crate::session::hash_password(&id, digest.as_str());
        let image = gravatar_url(email.as_str());
        Self {
            id: Some(id),
            email: email.into_string(),
            passwd,
            admin: false,
            name: name.into_string(),
            image,
            created_at: None,
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    /// Copy safe to hand to templates and API clients.
    pub fn masked(mut self) -> Self {
        self.passwd = MASKED_PASSWD.to_string();
        self
    }
}

impl Model for User {
    fn meta() -> &'static ModelMeta {
        &USER_META
    }

    fn value(&self, field: &str) -> Option<SqlValue> {
        match field {
            "id" => self.id.clone().map(SqlValue::Text),
            "email" => Some(self.email.clone().into()),
            "passwd" => Some(self.passwd.clone().into()),
            "admin" => Some(self.admin.into()),
            "name" => Some(self.name.clone().into()),
            "image" => Some(self.image.clone().into()),
            "created_at" => self.created_at.map(SqlValue::Double),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: SqlValue) -> Result<(), OrmError> {
        match field {
            "id" => self.id = value.try_into()?,
            "email" => self.email = value.try_into()?,
            "passwd" => self.passwd = value.try_into()?,
            "admin" => self.admin = value.try_into()?,
            "name" => self.name = value.try_into()?,
            "image" => self.image = value.try_into()?,
            "created_at" => self.created_at = value.try_into()?,
            other => {
                return Err(OrmError::UnknownField {
                    model: "User",
                    field: other.to_owned(),
                })
            }
        }
        Ok(())
    }
}

/// Avatar URL derived from the email hash.
pub fn gravatar_url(email: &str) -> String {
    let digest = md5::compute(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}?d=mm&s=120", digest)
}

/// Validated, lowercased email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    /// # Example
    /// ```
    /// use quill_server::models::Email;
    ///
    /// assert_eq!(Email::new(" Alice@Example.com ").unwrap().as_str(), "alice@example.com");
    /// assert!(Email::new("not-an-email").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let email = s.trim().to_lowercase();

        if email.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }

        if email.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        if !EMAIL_RE.is_match(&email) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "not a valid email address",
            });
        }

        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Password as submitted by the client: a hex SHA-256 digest, never plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "passwd" });
        }

        if !DIGEST_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "passwd",
                reason: "must be a lowercase hex SHA-256 digest",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Display name shown next to posts and comments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text(s, "name", MAX_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

    #[test]
    fn valid_emails() {
        assert!(Email::new("a@b.co").is_ok());
        assert!(Email::new("first.last-1_x@mail-host.example.org").is_ok());
    }

    #[test]
    fn rejects_bad_emails() {
        assert!(matches!(
            Email::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(matches!(
            Email::new("no-at-sign.com").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            Email::new("a@nodot").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            Email::new("a b@c.com").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }

    #[test]
    fn email_length_cap() {
        let long = format!("{}@example.com", "a".repeat(45));
        assert!(matches!(
            Email::new(&long).unwrap_err(),
            ValidationError::TooLong { max: 50, .. }
        ));
    }

    #[test]
    fn digest_format() {
        assert!(PasswordDigest::new(DIGEST).is_ok());
        assert!(PasswordDigest::new("password").is_err());
        assert!(PasswordDigest::new(&DIGEST.to_uppercase()).is_err());
        assert!(PasswordDigest::new(&DIGEST[..40]).is_err());
    }

    #[test]
    fn register_hashes_and_assigns_id() {
        let user = User::register(
            Email::new("bob@example.com").unwrap(),
            DisplayName::new(" Bob ").unwrap(),
            &PasswordDigest::new(DIGEST).unwrap(),
        );
        assert_eq!(user.id().len(), 50);
        assert_eq!(user.name, "Bob");
        assert_ne!(user.passwd, DIGEST);
        assert_eq!(user.passwd.len(), 64);
        assert!(!user.admin);
        assert!(user.image.starts_with("https://www.gravatar.com/avatar/"));
    }

    #[test]
    fn masking_hides_digest() {
        let user = User::register(
            Email::new("bob@example.com").unwrap(),
            DisplayName::new("Bob").unwrap(),
            &PasswordDigest::new(DIGEST).unwrap(),
        )
        .masked();
        assert_eq!(user.passwd, MASKED_PASSWD);
    }

    #[test]
    fn gravatar_is_case_insensitive() {
        assert_eq!(gravatar_url("Bob@Example.com"), gravatar_url("bob@example.com"));
    }

    #[test]
    fn defaults_fill_unset_fields() {
        let mut user = User {
            id: None,
            email: "x@y.io".into(),
            passwd: String::new(),
            admin: false,
            name: "x".into(),
            image: String::new(),
            created_at: None,
        };
        let id = user.value_or_default("id").unwrap();
        assert!(matches!(id, SqlValue::Text(ref s) if s.len() == 50));
        assert_eq!(user.id.as_deref().map(str::len), Some(50));

        assert!(matches!(
            user.value_or_default("created_at").unwrap(),
            SqlValue::Double(_)
        ));
        assert!(user.created_at.is_some());
    }

    #[test]
    fn set_value_checks_types() {
        let mut user = User::register(
            Email::new("bob@example.com").unwrap(),
            DisplayName::new("Bob").unwrap(),
            &PasswordDigest::new(DIGEST).unwrap(),
        );
        user.set_value("admin", SqlValue::Bool(true)).unwrap();
        assert!(user.admin);
        assert!(matches!(
            user.set_value("admin", SqlValue::Text("yes".into())).unwrap_err(),
            OrmError::TypeMismatch { .. }
        ));
        assert!(matches!(
            user.set_value("nope", SqlValue::Null).unwrap_err(),
            OrmError::UnknownField { .. }
        ));
    }

    #[test]
    fn mapping_statements() {
        let meta = User::meta();
        assert_eq!(meta.table, "users");
        assert_eq!(meta.primary_key, "id");
        assert_eq!(
            meta.fields,
            vec!["email", "passwd", "admin", "name", "image", "created_at"]
        );
    }
}
