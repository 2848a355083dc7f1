//! Shared fixtures for mxp-ex integration tests
#![allow(dead_code)]

use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use mxp_ex::artifacts::{ArtifactStore, LocalArtifactStore};
use mxp_ex::models::{ExportJobRow, ExportRequest, JobStatus};
use mxp_ex::source::{Attr, JsonSnapshotSource, Library, MediaSource, SourceError, SourceItem};
use mxp_ex::{ExportRunner, RunnerSettings};

pub const MOVIES_SECTION: i64 = 1;
pub const SHOWS_SECTION: i64 = 2;
pub const BROKEN_SECTION: i64 = 3;
pub const CLIPS_SECTION: i64 = 4;

pub const HEAT: i64 = 1001;
pub const AMELIE: i64 = 1002;
pub const SHOW: i64 = 2001;
pub const EPISODE: i64 = 2003;
pub const PLAYLIST: i64 = 9001;

/// Snapshot with two movies, one show, a movie that fails to export and a
/// library of an unsupported type
pub fn snapshot_json() -> Value {
    json!({
        "libraries": [
            {
                "section_id": MOVIES_SECTION,
                "title": "Movies",
                "type": "movie",
                "items": [
                    {
                        "ratingKey": HEAT,
                        "type": "movie",
                        "title": "Heat",
                        "year": 1995,
                        "duration": 10_200_000,
                        "librarySectionID": MOVIES_SECTION,
                        "addedAt": 1_600_000_000,
                        "genres": [{"id": 1, "tag": "Crime"}, {"id": 2, "tag": "Thriller"}],
                        "media": [{
                            "id": 11,
                            "bitrate": 8000,
                            "parts": [{
                                "id": 111,
                                "file": "/movies/Heat.mkv",
                                "size": 4_294_967_296_i64,
                                "requiredBandwidths": "8000,9000",
                                "videoStreams": [{"codec": "hevc", "bitDepth": 10, "colorSpace": "bt2020nc"}]
                            }]
                        }]
                    },
                    {
                        "ratingKey": AMELIE,
                        "type": "movie",
                        "title": "Amélie",
                        "year": 2001,
                        "librarySectionID": MOVIES_SECTION,
                        "genres": []
                    }
                ]
            },
            {
                "section_id": SHOWS_SECTION,
                "title": "TV Shows",
                "type": "show",
                "items": [{
                    "ratingKey": SHOW,
                    "type": "show",
                    "title": "The Show",
                    "librarySectionID": SHOWS_SECTION,
                    "seasons": [{
                        "ratingKey": 2002,
                        "type": "season",
                        "title": "Season 1",
                        "index": 1,
                        "parentTitle": "The Show",
                        "episodes": [
                            {
                                "ratingKey": EPISODE,
                                "type": "episode",
                                "title": "Pilot",
                                "index": 1,
                                "parentIndex": 1,
                                "parentTitle": "Season 1",
                                "grandparentTitle": "The Show",
                                "librarySectionID": SHOWS_SECTION
                            },
                            {
                                "ratingKey": 2004,
                                "type": "episode",
                                "title": "Second",
                                "index": 2,
                                "parentIndex": 1,
                                "parentTitle": "Season 1",
                                "grandparentTitle": "The Show",
                                "librarySectionID": SHOWS_SECTION
                            }
                        ]
                    }]
                }]
            },
            {
                "section_id": BROKEN_SECTION,
                "title": "Broken",
                "type": "movie",
                "items": [{
                    "ratingKey": 3001,
                    "type": "movie",
                    "title": "Bad Bandwidth",
                    "media": [{"parts": [{"requiredBandwidths": "12,abc"}]}]
                }]
            },
            {
                "section_id": CLIPS_SECTION,
                "title": "Clips",
                "type": "clip",
                "items": []
            }
        ],
        "items": [{
            "ratingKey": PLAYLIST,
            "type": "playlist",
            "title": "Favorites",
            "librarySectionID": MOVIES_SECTION,
            "items": [{"ratingKey": 5001, "type": "movie", "title": "Ronin"}]
        }]
    })
}

pub struct TestEnv {
    pub temp_dir: TempDir,
    pub pool: SqlitePool,
    pub runner: ExportRunner,
    pub export_dir: PathBuf,
}

pub async fn setup() -> TestEnv {
    let source = JsonSnapshotSource::from_value(snapshot_json()).expect("valid snapshot");
    setup_with(Arc::new(source), RunnerSettings::default()).await
}

pub async fn setup_with(source: Arc<dyn MediaSource>, settings: RunnerSettings) -> TestEnv {
    setup_with_store(source, settings, |dir| Arc::new(LocalArtifactStore::new(dir))).await
}

/// Build a runner over `source`; `make_store` receives the export directory
pub async fn setup_with_store(
    source: Arc<dyn MediaSource>,
    settings: RunnerSettings,
    make_store: impl FnOnce(PathBuf) -> Arc<dyn ArtifactStore>,
) -> TestEnv {
    let temp_dir = TempDir::new().expect("temp dir");
    let export_dir = temp_dir.path().join("exports");
    std::fs::create_dir_all(&export_dir).expect("export dir");

    let pool = mxp_ex::db::init_database_pool(&temp_dir.path().join("mxp.db"))
        .await
        .expect("database");

    let store = make_store(export_dir.clone());
    let runner = ExportRunner::new(pool.clone(), source, store, settings);

    TestEnv {
        temp_dir,
        pool,
        runner,
        export_dir,
    }
}

/// Poll until the job leaves `pending`
pub async fn wait_for_terminal(runner: &ExportRunner, job_id: i64) -> ExportJobRow {
    for _ in 0..500 {
        let job = runner
            .get_job(job_id)
            .await
            .expect("get_job")
            .expect("job exists");
        if job.status != JobStatus::Pending {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job {} still pending after 10s", job_id);
}

/// Poll until no job is queued or running
pub async fn wait_for_idle(runner: &ExportRunner) {
    for _ in 0..500 {
        if runner.outstanding_jobs() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("{} jobs still outstanding after 10s", runner.outstanding_jobs());
}

// ============================================================================
// Slow source: keeps jobs busy long enough to observe queueing and cancel
// ============================================================================

#[derive(Debug)]
pub struct SlowMovie {
    pub key: i64,
    pub delay: Duration,
}

impl SourceItem for SlowMovie {
    fn attr(&self, name: &str) -> Attr {
        match name {
            "type" => Attr::Value(json!("movie")),
            "ratingKey" => Attr::Value(json!(self.key)),
            "title" => {
                std::thread::sleep(self.delay);
                Attr::Value(json!(format!("Slow {}", self.key)))
            }
            _ => Attr::Null,
        }
    }
}

#[derive(Debug)]
pub struct SlowSource {
    items: Vec<Arc<dyn SourceItem>>,
}

impl SlowSource {
    /// Library section 1 with `count` movies, each taking `delay` to read
    pub fn new(count: i64, delay: Duration) -> Self {
        let items = (1..=count)
            .map(|key| Arc::new(SlowMovie { key, delay }) as Arc<dyn SourceItem>)
            .collect();
        Self { items }
    }
}

impl MediaSource for SlowSource {
    fn get_item(&self, item_id: i64) -> Result<Option<Arc<dyn SourceItem>>, SourceError> {
        Ok(self
            .items
            .iter()
            .find(|item| item.attr("ratingKey").as_i64() == Some(item_id))
            .cloned())
    }

    fn get_library(&self, section_id: i64) -> Result<Option<Library>, SourceError> {
        Ok((section_id == 1).then(|| Library {
            section_id: 1,
            title: "Slow".to_string(),
            media_type: "movie".to_string(),
            items: self.items.clone(),
        }))
    }
}

// ============================================================================
// Artifact store that fails the Nth removal
// ============================================================================

#[derive(Debug)]
pub struct FailingStore {
    inner: LocalArtifactStore,
    fail_on_call: usize,
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn new(export_dir: impl Into<PathBuf>, fail_on_call: usize) -> Self {
        Self {
            inner: LocalArtifactStore::new(export_dir),
            fail_on_call,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ArtifactStore for FailingStore {
    fn path_for(&self, filename: &str) -> PathBuf {
        self.inner.path_for(filename)
    }

    fn remove(&self, filename: &str) -> io::Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_call {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "simulated removal failure",
            ));
        }
        self.inner.remove(filename)
    }
}

pub fn request(
    item_id: Option<i64>,
    section_id: Option<i64>,
    level: u32,
    format: &str,
) -> ExportRequest {
    ExportRequest {
        item_id,
        section_id,
        level,
        format: format.to_string(),
    }
}

/// Read an exported JSON file back
pub fn read_json(env: &TestEnv, filename: &str) -> Value {
    let content = std::fs::read_to_string(env.export_dir.join(filename)).expect("export file");
    serde_json::from_str(&content).expect("valid JSON export")
}

// ============================================================================
// Artifact store that stalls the first write
// ============================================================================

/// Blocks the first `path_for` call, which the runner makes right before
/// writing, and raises `writing` while blocked
#[derive(Debug)]
pub struct PausingStore {
    inner: LocalArtifactStore,
    pause: Duration,
    paused: AtomicBool,
    writing: Arc<AtomicBool>,
}

impl PausingStore {
    pub fn new(export_dir: impl Into<PathBuf>, pause: Duration, writing: Arc<AtomicBool>) -> Self {
        Self {
            inner: LocalArtifactStore::new(export_dir),
            pause,
            paused: AtomicBool::new(false),
            writing,
        }
    }
}

impl ArtifactStore for PausingStore {
    fn path_for(&self, filename: &str) -> PathBuf {
        if !self.paused.swap(true, Ordering::SeqCst) {
            self.writing.store(true, Ordering::SeqCst);
            std::thread::sleep(self.pause);
        }
        self.inner.path_for(filename)
    }

    fn remove(&self, filename: &str) -> io::Result<()> {
        self.inner.remove(filename)
    }
}
