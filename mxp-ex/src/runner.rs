//! Export job runner
//!
//! `submit` validates a request, records a pending job and hands the work to
//! a background task, returning the job id as soon as the record exists.
//! The task waits for one of `max_concurrent_jobs` slots, extracts items
//! with a bounded worker pool, writes the file and records the outcome.
//!
//! Submissions are rejected with [`ExportError::Busy`] once
//! `max_queued_jobs` jobs are queued or running.

use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{RwLock, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use mxp_common::config::ExportConfig;

use crate::artifacts::ArtifactStore;
use crate::db::jobs::{self, JobFilter};
use crate::error::ExportError;
use crate::extractor::{extract_batch, ExtractError};
use crate::filename::{display_title, item_filename, library_filename};
use crate::flatten::flatten;
use crate::models::{
    ExportFormat, ExportJobRow, ExportRequest, ExportSelector, JobPage, MediaType, NewExportJob,
};
use crate::output::{write_csv, write_json};
use crate::pagination::calculate_pagination;
use crate::resolver::resolve;
use crate::schema::{levels_for, schema_for, Schema};
use crate::source::{MediaSource, SourceItem};

/// Runner limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Extraction workers per job
    pub worker_count: usize,
    /// Jobs extracting at the same time
    pub max_concurrent_jobs: usize,
    /// Jobs queued or running before submissions are refused
    pub max_queued_jobs: usize,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        ExportConfig::default().into()
    }
}

impl From<ExportConfig> for RunnerSettings {
    fn from(config: ExportConfig) -> Self {
        Self {
            worker_count: config.worker_count.max(1),
            max_concurrent_jobs: config.max_concurrent_jobs.max(1),
            max_queued_jobs: config.max_queued_jobs.max(1),
        }
    }
}

/// Counts a job as outstanding until dropped
struct OutstandingGuard(Arc<AtomicUsize>);

impl Drop for OutstandingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Everything a background job needs
struct JobContext {
    job_id: i64,
    filename: String,
    format: ExportFormat,
    items: Vec<Arc<dyn SourceItem>>,
    schema: Arc<Schema>,
    cancel: CancellationToken,
}

/// Validated submission, ready to record
struct PreparedExport {
    media_type: MediaType,
    section_id: Option<i64>,
    item_id: Option<i64>,
    filename_for: Box<dyn Fn(i64) -> String + Send>,
    items: Vec<Arc<dyn SourceItem>>,
    schema: Schema,
}

#[derive(Debug, Clone)]
pub struct ExportRunner {
    db: SqlitePool,
    source: Arc<dyn MediaSource>,
    artifacts: Arc<dyn ArtifactStore>,
    settings: RunnerSettings,
    job_slots: Arc<Semaphore>,
    outstanding: Arc<AtomicUsize>,
    /// Cancellation tokens of queued and running jobs, by job id
    cancellation_tokens: Arc<RwLock<HashMap<i64, CancellationToken>>>,
}

impl ExportRunner {
    pub fn new(
        db: SqlitePool,
        source: Arc<dyn MediaSource>,
        artifacts: Arc<dyn ArtifactStore>,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            db,
            source,
            artifacts,
            job_slots: Arc::new(Semaphore::new(settings.max_concurrent_jobs.max(1))),
            outstanding: Arc::new(AtomicUsize::new(0)),
            cancellation_tokens: Arc::new(RwLock::new(HashMap::new())),
            settings,
        }
    }

    pub fn settings(&self) -> RunnerSettings {
        self.settings
    }

    /// Jobs currently queued or running in this process
    pub fn outstanding_jobs(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub fn artifact_path(&self, filename: &str) -> PathBuf {
        self.artifacts.path_for(filename)
    }

    /// Validate, record and start an export; returns the new job id
    ///
    /// Validation and admission failures leave no record behind.
    pub async fn submit(&self, request: ExportRequest) -> Result<i64, ExportError> {
        let selector = ExportSelector::from_ids(request.item_id, request.section_id)
            .map_err(ExportError::Validation)?;
        let format: ExportFormat = request
            .format
            .parse()
            .map_err(ExportError::Validation)?;

        let prepared = self.prepare(selector, request.level, format)?;
        let guard = self.admit()?;

        let created_at = mxp_common::time::now_unix();
        let filename = (prepared.filename_for)(created_at);

        // Held until the token is registered: `cancel_all_pending` must not
        // fail the new record while its token is still missing
        let mut tokens = self.cancellation_tokens.write().await;
        let job_id = jobs::insert_job(
            &self.db,
            &NewExportJob {
                created_at,
                section_id: prepared.section_id,
                item_id: prepared.item_id,
                media_type: prepared.media_type,
                level: request.level,
                format,
                filename: filename.clone(),
            },
        )
        .await?;

        let cancel = CancellationToken::new();
        tokens.insert(job_id, cancel.clone());
        drop(tokens);

        info!(
            job_id,
            media_type = %prepared.media_type,
            level = request.level,
            format = %format,
            items = prepared.items.len(),
            filename = %filename,
            "Export job queued"
        );

        let context = JobContext {
            job_id,
            filename,
            format,
            items: prepared.items,
            schema: Arc::new(prepared.schema),
            cancel,
        };
        let runner = self.clone();
        tokio::spawn(async move {
            runner.run_job(context).await;
            drop(guard);
        });

        Ok(job_id)
    }

    /// Resolve the items, media type and effective schema for a request
    fn prepare(
        &self,
        selector: ExportSelector,
        level: u32,
        format: ExportFormat,
    ) -> Result<PreparedExport, ExportError> {
        let prepared = match selector {
            ExportSelector::Item(item_id) => {
                let item = self
                    .source
                    .get_item(item_id)?
                    .ok_or_else(|| ExportError::Validation(format!("Item {} not found", item_id)))?;
                let media_type = item.media_type().ok_or_else(|| {
                    let kind = item.attr("type");
                    ExportError::Validation(format!(
                        "Cannot export media type '{}'",
                        kind.as_str().unwrap_or("unknown")
                    ))
                })?;
                // Playlists do not belong to a library section
                let section_id = match media_type {
                    MediaType::Playlist => None,
                    _ => item.attr("librarySectionID").as_i64(),
                };
                let title = display_title(item.as_ref(), media_type);
                PreparedExport {
                    media_type,
                    section_id,
                    item_id: Some(item_id),
                    filename_for: Box::new(move |created_at| {
                        item_filename(media_type, &title, item_id, created_at, format)
                    }),
                    items: vec![item],
                    schema: Schema::new(),
                }
            }
            ExportSelector::Section(section_id) => {
                let library = self.source.get_library(section_id)?.ok_or_else(|| {
                    ExportError::Validation(format!("Library section {} not found", section_id))
                })?;
                let media_type: MediaType = library.media_type.parse().map_err(|_| {
                    ExportError::Validation(format!(
                        "Cannot export media type '{}'",
                        library.media_type
                    ))
                })?;
                let title = library.title;
                PreparedExport {
                    media_type,
                    section_id: Some(section_id),
                    item_id: None,
                    filename_for: Box::new(move |created_at| {
                        library_filename(&title, section_id, created_at, format)
                    }),
                    items: library.items,
                    schema: Schema::new(),
                }
            }
        };

        let schema = resolve(
            schema_for(prepared.media_type),
            levels_for(prepared.media_type),
            level,
        )?;

        Ok(PreparedExport {
            schema,
            ..prepared
        })
    }

    /// Reserve a queue place or refuse the submission
    fn admit(&self) -> Result<OutstandingGuard, ExportError> {
        let limit = self.settings.max_queued_jobs;
        self.outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < limit).then_some(n + 1)
            })
            .map_err(|_| {
                warn!(limit, "Export queue full, refusing submission");
                ExportError::Busy { limit }
            })?;
        Ok(OutstandingGuard(self.outstanding.clone()))
    }

    /// Background task body: never returns an error, records the outcome
    async fn run_job(&self, context: JobContext) {
        let JobContext {
            job_id,
            filename,
            format,
            items,
            schema,
            cancel,
        } = context;

        let result = self
            .execute(job_id, &filename, format, items, schema, &cancel)
            .await;

        self.cancellation_tokens.write().await.remove(&job_id);

        match result {
            Ok(file_size) => match jobs::mark_succeeded(&self.db, job_id, file_size as i64).await {
                Ok(true) => info!(job_id, filename = %filename, file_size, "Export completed"),
                Ok(false) => {
                    warn!(
                        job_id,
                        filename = %filename,
                        "Export finished after the job was failed or deleted, removing file"
                    );
                    self.discard_artifact(job_id, &filename);
                }
                Err(e) => error!(job_id, error = %e, "Failed to record export success"),
            },
            Err(e) => {
                match e {
                    ExportError::Cancelled => info!(job_id, filename = %filename, "Export cancelled"),
                    ref e => error!(job_id, filename = %filename, error = %e, "Export failed"),
                }
                if let Err(e) = jobs::mark_failed(&self.db, job_id).await {
                    error!(job_id, error = %e, "Failed to record export failure");
                }
            }
        }
    }

    async fn execute(
        &self,
        job_id: i64,
        filename: &str,
        format: ExportFormat,
        items: Vec<Arc<dyn SourceItem>>,
        schema: Arc<Schema>,
        cancel: &CancellationToken,
    ) -> Result<u64, ExportError> {
        let _permit = tokio::select! {
            permit = self.job_slots.clone().acquire_owned() => {
                permit.map_err(|_| ExportError::Cancelled)?
            }
            _ = cancel.cancelled() => return Err(ExportError::Cancelled),
        };

        debug!(job_id, items = items.len(), "Export job started");

        let values = extract_batch(items, schema, self.settings.worker_count, cancel)
            .await
            .map_err(|e| match e {
                ExtractError::Cancelled => ExportError::Cancelled,
                other => ExportError::Extraction(other),
            })?;
        if cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }

        let path = self.artifacts.path_for(filename);
        let file_size = tokio::task::spawn_blocking(move || match format {
            ExportFormat::Json => write_json(&path, &values),
            ExportFormat::Csv => {
                let (rows, columns) = flatten(&values);
                write_csv(&path, &rows, &columns)
            }
        })
        .await
        .map_err(|e| ExportError::Serialization(format!("Task join error: {}", e)))??;

        // Cancelled or deleted while writing
        if cancel.is_cancelled() {
            self.discard_artifact(job_id, filename);
            return Err(ExportError::Cancelled);
        }

        Ok(file_size)
    }

    /// Remove a file written for a job that is no longer pending
    fn discard_artifact(&self, job_id: i64, filename: &str) {
        if let Err(e) = self.artifacts.remove(filename) {
            let path = self.artifacts.path_for(filename);
            error!(job_id, path = %path.display(), error = %e, "Failed to remove orphaned export file");
        }
    }

    /// Fail every pending job and stop the ones queued or running here
    ///
    /// Records are updated first; cancelled tasks then find their job already
    /// terminal and leave it alone.
    pub async fn cancel_all_pending(&self) -> Result<u64, ExportError> {
        let tokens = self.cancellation_tokens.read().await;
        let count = jobs::fail_pending_jobs(&self.db).await?;

        for token in tokens.values() {
            token.cancel();
        }
        info!(count, running = tokens.len(), "Cancelled pending exports");

        Ok(count)
    }

    pub async fn get_job(&self, job_id: i64) -> Result<Option<ExportJobRow>, ExportError> {
        let job = jobs::get_job(&self.db, job_id).await?;
        Ok(job.map(|job| {
            let exists = self.artifacts.exists(&job.filename);
            ExportJobRow::new(job, exists)
        }))
    }

    /// One page of jobs, newest first
    pub async fn list_jobs(
        &self,
        filter: JobFilter,
        page: i64,
        page_size: i64,
    ) -> Result<JobPage, ExportError> {
        let total_rows = jobs::count_jobs(&self.db).await?;
        let filtered_rows = jobs::count_filtered_jobs(&self.db, &filter).await?;
        let pagination = calculate_pagination(filtered_rows, page, page_size);

        let rows = jobs::list_jobs(&self.db, &filter, pagination.page_size, pagination.offset)
            .await?
            .into_iter()
            .map(|job| {
                let exists = self.artifacts.exists(&job.filename);
                ExportJobRow::new(job, exists)
            })
            .collect();

        Ok(JobPage {
            rows,
            total_rows,
            filtered_rows,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages: pagination.total_pages,
        })
    }

    /// Delete one job and its artifact
    ///
    /// Returns false when the job does not exist or its file could not be
    /// removed; in the latter case the record is kept.
    pub async fn delete_job(&self, job_id: i64) -> Result<bool, ExportError> {
        let Some(job) = jobs::get_job(&self.db, job_id).await? else {
            return Ok(false);
        };

        if let Some(token) = self.cancellation_tokens.read().await.get(&job_id) {
            token.cancel();
        }

        if self.artifacts.exists(&job.filename) {
            let path = self.artifacts.path_for(&job.filename);
            info!(job_id, path = %path.display(), "Deleting exported file");
            if let Err(e) = self.artifacts.remove(&job.filename) {
                error!(job_id, path = %path.display(), error = %e, "Failed to delete exported file");
                return Ok(false);
            }
        }

        Ok(jobs::delete_job(&self.db, job_id).await?)
    }

    /// Delete every artifact, then every record
    ///
    /// Stops at the first file that cannot be removed and returns false.
    /// Files removed before that stay removed and every record is kept.
    pub async fn delete_all_jobs(&self) -> Result<bool, ExportError> {
        let all = jobs::all_jobs(&self.db).await?;
        info!(count = all.len(), "Deleting all exports");

        for job in &all {
            if !self.artifacts.exists(&job.filename) {
                continue;
            }
            if let Err(e) = self.artifacts.remove(&job.filename) {
                let path = self.artifacts.path_for(&job.filename);
                error!(
                    job_id = job.job_id,
                    path = %path.display(),
                    error = %e,
                    "Failed to delete exported file, keeping all export records"
                );
                return Ok(false);
            }
        }

        for token in self.cancellation_tokens.read().await.values() {
            token.cancel();
        }
        let deleted = jobs::delete_all_jobs(&self.db).await?;
        info!(deleted, "Deleted all export records");

        Ok(true)
    }
}
