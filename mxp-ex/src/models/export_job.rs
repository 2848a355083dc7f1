//! Export job state machine
//!
//! A job starts `Pending` and moves exactly once to `Succeeded` or `Failed`:
//!
//! ```text
//! PENDING ──► SUCCEEDED
//!    │
//!    └──────► FAILED
//! ```
//!
//! The database enforces this: terminal updates only match rows that are
//! still pending (see `db::jobs`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::MediaType;

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Structured document (pretty-printed JSON array)
    Json,
    /// Tabular rows (CSV with a header row)
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// File extension (without dot)
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    /// Accepts the file extension or the generic name ("structured"/"tabular")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" | "structured" => Ok(ExportFormat::Json),
            "csv" | "tabular" => Ok(ExportFormat::Csv),
            other => Err(format!("Unsupported export format: {}", other)),
        }
    }
}

/// Persisted job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "succeeded" => Ok(JobStatus::Succeeded),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("Unknown job status: {}", other)),
        }
    }
}

/// What to export: a single item, or every item of a library section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSelector {
    Item(i64),
    Section(i64),
}

impl ExportSelector {
    /// Exactly one of `item_id` / `section_id` must be present
    pub fn from_ids(item_id: Option<i64>, section_id: Option<i64>) -> Result<Self, String> {
        match (item_id, section_id) {
            (Some(item_id), None) => Ok(ExportSelector::Item(item_id)),
            (None, Some(section_id)) => Ok(ExportSelector::Section(section_id)),
            (Some(_), Some(_)) => {
                Err("Provide either item_id or section_id, not both".to_string())
            }
            (None, None) => Err("Either item_id or section_id is required".to_string()),
        }
    }
}

/// Export submission as received from callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub section_id: Option<i64>,
    /// Detail level (9 = every field)
    pub level: u32,
    /// "json"/"structured" or "csv"/"tabular"
    pub format: String,
}

/// Persisted export job record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportJob {
    pub job_id: i64,
    /// Unix seconds
    pub created_at: i64,
    pub section_id: Option<i64>,
    pub item_id: Option<i64>,
    pub media_type: MediaType,
    pub level: u32,
    pub format: ExportFormat,
    pub filename: String,
    pub file_size: Option<i64>,
    pub status: JobStatus,
}

/// Fields needed to create a job record
#[derive(Debug, Clone)]
pub struct NewExportJob {
    pub created_at: i64,
    pub section_id: Option<i64>,
    pub item_id: Option<i64>,
    pub media_type: MediaType,
    pub level: u32,
    pub format: ExportFormat,
    pub filename: String,
}

/// Job record as reported to callers, with derived display fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportJobRow {
    pub job_id: i64,
    pub created_at: i64,
    pub section_id: Option<i64>,
    pub item_id: Option<i64>,
    pub media_type: MediaType,
    /// "Photo Album"
    pub media_type_title: String,
    pub level: u32,
    pub filename: String,
    pub format: ExportFormat,
    pub file_size: Option<i64>,
    pub status: JobStatus,
    /// Whether the artifact is currently on disk
    pub file_exists: bool,
}

impl ExportJobRow {
    pub fn new(job: ExportJob, file_exists: bool) -> Self {
        Self {
            job_id: job.job_id,
            created_at: job.created_at,
            section_id: job.section_id,
            item_id: job.item_id,
            media_type_title: job.media_type.title(),
            media_type: job.media_type,
            level: job.level,
            filename: job.filename,
            format: job.format,
            file_size: job.file_size,
            status: job.status,
            file_exists,
        }
    }
}

/// One page of the job listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPage {
    pub rows: Vec<ExportJobRow>,
    /// Records in the table
    pub total_rows: i64,
    /// Records matching the filter
    pub filtered_rows: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}
