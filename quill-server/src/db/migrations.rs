//! Schema creation from model descriptors

use sqlx::PgPool;

use crate::models::{Blog, Comment, User};
use crate::orm::Model;

/// Indexes not expressible through field descriptors
const INDEXES: &[&str] = &[
    r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON "users" ("email")"#,
    r#"CREATE INDEX IF NOT EXISTS idx_users_created_at ON "users" ("created_at")"#,
    r#"CREATE INDEX IF NOT EXISTS idx_blogs_created_at ON "blogs" ("created_at")"#,
    r#"CREATE INDEX IF NOT EXISTS idx_comments_blog_id ON "comments" ("blog_id")"#,
    r#"CREATE INDEX IF NOT EXISTS idx_comments_created_at ON "comments" ("created_at")"#,
];

/// Every statement needed for an empty database, in order.
pub fn statements() -> Vec<String> {
    let mut sql = vec![
        User::meta().create_table_sql(),
        Blog::meta().create_table_sql(),
        Comment::meta().create_table_sql(),
    ];
    sql.extend(INDEXES.iter().map(|s| s.to_string()));
    sql
}

/// Create tables and indexes. Safe to run repeatedly.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    for statement in statements() {
        sqlx::query(&statement).execute(pool).await?;
    }

    tracing::info!("Migrations complete");
    Ok(())
}
