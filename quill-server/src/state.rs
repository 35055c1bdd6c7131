//! Application state shared across handlers

use std::sync::Arc;

use crate::config::{QuillConfig, SiteSection};
use crate::orm::Database;
use crate::session::SessionSigner;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: Database,
    signer: SessionSigner,
    site: SiteSection,
}

impl AppState {
    pub fn new(db: Database, config: &QuillConfig) -> Self {
        let signer = SessionSigner::new(
            config.session.cookie_name.clone(),
            config.session.secret.clone(),
            config.session.max_age_secs,
        );
        Self {
            inner: Arc::new(AppStateInner {
                db,
                signer,
                site: config.site.clone(),
            }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn signer(&self) -> &SessionSigner {
        &self.inner.signer
    }

    pub fn site(&self) -> &SiteSection {
        &self.inner.site
    }
}
