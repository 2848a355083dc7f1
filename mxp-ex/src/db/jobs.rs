//! Export job records
//!
//! Terminal updates only match rows that are still pending, so a job moves
//! out of `pending` exactly once no matter who gets there first (the job's
//! own task, a bulk cancel, or startup cleanup).

use mxp_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::{ExportJob, JobStatus, NewExportJob};

/// Optional listing filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub section_id: Option<i64>,
    pub item_id: Option<i64>,
}

const SELECT_COLUMNS: &str = "SELECT id, created_at, section_id, item_id, media_type, level, \
     format, filename, file_size, status FROM exports";

fn row_to_job(row: &SqliteRow) -> Result<ExportJob> {
    let media_type: String = row.get("media_type");
    let format: String = row.get("format");
    let status: String = row.get("status");
    let level: i64 = row.get("level");

    Ok(ExportJob {
        job_id: row.get("id"),
        created_at: row.get("created_at"),
        section_id: row.get("section_id"),
        item_id: row.get("item_id"),
        media_type: media_type.parse().map_err(Error::Internal)?,
        level: u32::try_from(level)
            .map_err(|_| Error::Internal(format!("Invalid stored level: {}", level)))?,
        format: format.parse().map_err(Error::Internal)?,
        filename: row.get("filename"),
        file_size: row.get("file_size"),
        status: status.parse().map_err(Error::Internal)?,
    })
}

/// Insert a pending job and return its id
pub async fn insert_job(pool: &SqlitePool, job: &NewExportJob) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO exports (
            created_at, section_id, item_id, media_type, level, format, filename, status
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(job.created_at)
    .bind(job.section_id)
    .bind(job.item_id)
    .bind(job.media_type.as_str())
    .bind(i64::from(job.level))
    .bind(job.format.as_str())
    .bind(&job.filename)
    .bind(JobStatus::Pending.as_str())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Pending → Succeeded; returns false if the job was no longer pending
pub async fn mark_succeeded(pool: &SqlitePool, job_id: i64, file_size: i64) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE exports SET status = ?, file_size = ? WHERE id = ? AND status = ?",
    )
    .bind(JobStatus::Succeeded.as_str())
    .bind(file_size)
    .bind(job_id)
    .bind(JobStatus::Pending.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Pending → Failed; returns false if the job was no longer pending
pub async fn mark_failed(pool: &SqlitePool, job_id: i64) -> Result<bool> {
    let result = sqlx::query("UPDATE exports SET status = ? WHERE id = ? AND status = ?")
        .bind(JobStatus::Failed.as_str())
        .bind(job_id)
        .bind(JobStatus::Pending.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Mark every pending job failed; returns how many changed
pub async fn fail_pending_jobs(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("UPDATE exports SET status = ? WHERE status = ?")
        .bind(JobStatus::Failed.as_str())
        .bind(JobStatus::Pending.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Fail jobs left pending by a previous process
///
/// Their tasks died with that process, so nothing else would ever finish
/// them.
pub async fn cleanup_stale_jobs(pool: &SqlitePool) -> Result<u64> {
    let count = fail_pending_jobs(pool).await?;
    if count > 0 {
        tracing::warn!(count, "Marked stale pending export jobs as failed");
    }
    Ok(count)
}

pub async fn get_job(pool: &SqlitePool, job_id: i64) -> Result<Option<ExportJob>> {
    let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(job_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_job).transpose()
}

/// Total number of job records
pub async fn count_jobs(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exports")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Number of job records matching `filter`
pub async fn count_filtered_jobs(pool: &SqlitePool, filter: &JobFilter) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM exports \
         WHERE (?1 IS NULL OR section_id = ?1) AND (?2 IS NULL OR item_id = ?2)",
    )
    .bind(filter.section_id)
    .bind(filter.item_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// One page of matching jobs, newest first
pub async fn list_jobs(
    pool: &SqlitePool,
    filter: &JobFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<ExportJob>> {
    let sql = format!(
        "{} WHERE (?1 IS NULL OR section_id = ?1) AND (?2 IS NULL OR item_id = ?2) \
         ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4",
        SELECT_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(filter.section_id)
        .bind(filter.item_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_job).collect()
}

/// Every job, oldest first
pub async fn all_jobs(pool: &SqlitePool) -> Result<Vec<ExportJob>> {
    let sql = format!("{} ORDER BY id ASC", SELECT_COLUMNS);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(row_to_job).collect()
}

/// Delete one record; returns false if it did not exist
pub async fn delete_job(pool: &SqlitePool, job_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM exports WHERE id = ?")
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete_all_jobs(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM exports").execute(pool).await?;
    Ok(result.rows_affected())
}
