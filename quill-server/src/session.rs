//! Signed session cookie
//!
//! Cookie value: `<user_id>-<expires>-<sha256(user_id-passwd-expires-secret)>`
//! where `passwd` is the stored password digest, so changing the password
//! invalidates every outstanding cookie. There is no server-side session
//! table, no key rotation and no revocation list.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::models::User;

/// Value written when a session is cleared
const DELETED: &str = "-deleted-";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("malformed session cookie")]
    Malformed,

    #[error("session expired")]
    Expired,

    #[error("session signature mismatch")]
    BadSignature,
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compare two hex digests without exiting early on the first mismatch.
pub fn digests_match(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Stored form of a password: `sha256("uid:digest")`.
pub fn hash_password(uid: &str, digest: &str) -> String {
    sha256_hex(&format!("{}:{}", uid, digest))
}

/// Parsed (not yet verified) cookie value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub user_id: String,
    pub expires: i64,
    pub signature: String,
}

impl SessionToken {
    pub fn parse(value: &str) -> Result<Self, SessionError> {
        let parts: Vec<&str> = value.split('-').collect();
        let [user_id, expires, signature] = parts.as_slice() else {
            return Err(SessionError::Malformed);
        };
        if user_id.is_empty() || signature.is_empty() {
            return Err(SessionError::Malformed);
        }
        let expires = expires.parse().map_err(|_| SessionError::Malformed)?;

        Ok(Self {
            user_id: (*user_id).to_owned(),
            expires,
            signature: (*signature).to_owned(),
        })
    }
}

/// Issues and verifies session cookies with a single server secret.
#[derive(Debug, Clone)]
pub struct SessionSigner {
    cookie_name: String,
    secret: String,
    max_age: i64,
}

impl SessionSigner {
    pub fn new(cookie_name: impl Into<String>, secret: impl Into<String>, max_age: i64) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            secret: secret.into(),
            max_age,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn sign(&self, user_id: &str, passwd: &str, expires: i64) -> String {
        sha256_hex(&format!("{}-{}-{}-{}", user_id, passwd, expires, self.secret))
    }

    /// Cookie value for `user`, valid for `max_age` seconds after `now`.
    pub fn issue(&self, user: &User, now: i64) -> String {
        let expires = now + self.max_age;
        format!(
            "{}-{}-{}",
            user.id(),
            expires,
            self.sign(user.id(), &user.passwd, expires)
        )
    }

    /// Check a parsed token against the stored user row.
    pub fn verify(&self, token: &SessionToken, user: &User, now: i64) -> Result<(), SessionError> {
        if token.expires < now {
            return Err(SessionError::Expired);
        }
        let expected = self.sign(&token.user_id, &user.passwd, token.expires);
        if token.user_id != user.id() || !digests_match(&expected, &token.signature) {
            return Err(SessionError::BadSignature);
        }
        Ok(())
    }

    /// `Set-Cookie` header carrying a fresh session.
    pub fn set_cookie(&self, value: &str) -> HeaderValue {
        self.cookie_header(value, self.max_age)
    }

    /// `Set-Cookie` header that removes the session.
    pub fn clear_cookie(&self) -> HeaderValue {
        self.cookie_header(DELETED, 0)
    }

    fn cookie_header(&self, value: &str, max_age: i64) -> HeaderValue {
        let cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.cookie_name, value, max_age
        );
        // name and value are ASCII: hex digests, digits and dashes
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

/// Value of the named cookie across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}
