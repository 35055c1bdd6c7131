//! Server configuration - TOML file plus environment overrides
//!
//! Loaded from `~/.quill/config.toml` when present. Environment variables
//! win over the file:
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `QUILL_BIND`: listen address (default 127.0.0.1:9000)
//! - `QUILL_SESSION_SECRET`: cookie signing secret

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_PAGE_SIZE;

/// Secret used when none is configured. Fine for local hacking only.
pub const DEV_SECRET: &str = "quill-development-secret";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub session: SessionSection,
    pub site: SiteSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address to bind to
    pub bind: SocketAddr,
    /// Allow any CORS origin (default: localhost only)
    pub cors_permissive: bool,
    /// Directory served under `/static/`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            cors_permissive: false,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/quill".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub cookie_name: String,
    pub secret: String,
    pub max_age_secs: i64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            cookie_name: "quillsession".to_string(),
            secret: DEV_SECRET.to_string(),
            max_age_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub title: String,
    pub page_size: u32,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Quill".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QuillConfig {
    /// Default config file path: ~/.quill/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quill/config.toml")
    }

    /// Load the default file (if any), then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.with_env_overrides()
    }

    /// Parse a config file without environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `DATABASE_URL`, `QUILL_BIND` and `QUILL_SESSION_SECRET`.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(url) = env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(bind) = env::var("QUILL_BIND") {
            self.server.bind = bind.parse().map_err(|_| ConfigError::InvalidValue {
                key: "QUILL_BIND",
                value: bind.clone(),
            })?;
        }
        if let Ok(secret) = env::var("QUILL_SESSION_SECRET") {
            self.session.secret = secret;
        }
        Ok(self)
    }

    /// True when cookies are still signed with the built-in secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.session.secret == DEV_SECRET
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = QuillConfig::default();
        assert_eq!(config.server.bind.port(), 9000);
        assert!(!config.server.cors_permissive);
        assert_eq!(config.session.cookie_name, "quillsession");
        assert_eq!(config.site.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = QuillConfig::from_toml(
            r#"
            [session]
            secret = "abc"

            [site]
            title = "My Blog"
            "#,
        )
        .unwrap();
        assert_eq!(config.session.secret, "abc");
        assert_eq!(config.session.max_age_secs, 86_400);
        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nbind = \"0.0.0.0:8080\"\ncors_permissive = true\nstatic_dir = \"www/static\""
        )
        .unwrap();
        let config = QuillConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.bind.port(), 8080);
        assert!(config.server.cors_permissive);
        assert_eq!(config.server.static_dir, Some(PathBuf::from("www/static")));
    }

    #[test]
    fn bad_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbind = 1").unwrap();
        let err = QuillConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn toml_roundtrip_is_loadable() {
        let text = QuillConfig::default().to_toml().unwrap();
        let back = QuillConfig::from_toml(&text).unwrap();
        assert_eq!(back.server.bind, QuillConfig::default().server.bind);
    }
}
