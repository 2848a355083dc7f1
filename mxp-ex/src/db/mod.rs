//! Database access for mxp-ex
//!
//! Export jobs live in the `exports` table of the shared `mxp.db`.

pub mod jobs;

use mxp_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Open the database and create the `exports` table if needed
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    let pool = mxp_common::db::init_database(db_path).await?;
    init_tables(&pool).await?;
    Ok(pool)
}

/// Create mxp-ex tables; safe to run on every start
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS exports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at INTEGER NOT NULL,
            section_id INTEGER,
            item_id INTEGER,
            media_type TEXT NOT NULL,
            level INTEGER NOT NULL,
            format TEXT NOT NULL CHECK (format IN ('json', 'csv')),
            filename TEXT NOT NULL,
            file_size INTEGER,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'succeeded', 'failed'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_exports_section ON exports(section_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_exports_item ON exports(item_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database tables initialized (exports)");

    Ok(())
}
