//! PgPool construction
//!
//! `[database] max_connections` sizes the pool; the CLI passes it through
//! [`create_pool_with_options`].

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// A request waiting longer than this for a connection fails with a 500
/// instead of hanging.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

fn options(max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .min_connections(1.min(max_connections))
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

/// Connect with the default pool size.
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/quill").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Connect, opening at most `max_connections` connections.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    tracing::info!(max_connections, "opening database pool");
    options(max_connections).connect(database_url).await
}

/// Pool that connects on first use. Must be called inside a tokio runtime.
pub fn create_lazy_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    options(DEFAULT_MAX_CONNECTIONS).connect_lazy(database_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;
    use crate::models::User;
    use crate::orm::Database;

    // DATABASE_URL=postgres://... cargo test -p quill-server -- --ignored

    #[tokio::test]
    async fn lazy_pool_does_not_connect() {
        let pool = create_lazy_pool("postgres://localhost/quill_unused").unwrap();
        assert_eq!(pool.size(), 0);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrated_pool_counts_users() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool_with_options(&url, 2).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        // second run is a no-op
        migrations::run(&pool).await.expect("migrations not idempotent");

        let db = Database::new(pool);
        let count = db
            .find_number::<User>("count(\"id\")", None, &[])
            .await
            .expect("count failed");
        assert!(count.is_some());
    }
}
