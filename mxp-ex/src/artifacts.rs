//! Export file storage
//!
//! Jobs write their output to `path_for(filename)`; listing and delete
//! operations go through the same trait so a failing store can be swapped in
//! when exercising partial-delete behavior.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub trait ArtifactStore: Send + Sync + fmt::Debug {
    /// Absolute path an artifact is (or will be) stored at
    fn path_for(&self, filename: &str) -> PathBuf;

    fn exists(&self, filename: &str) -> bool {
        self.path_for(filename).is_file()
    }

    /// Remove an artifact; removing a missing file is not an error
    fn remove(&self, filename: &str) -> io::Result<()>;
}

/// Artifacts stored as plain files in one export directory
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    export_dir: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

impl ArtifactStore for LocalArtifactStore {
    fn path_for(&self, filename: &str) -> PathBuf {
        self.export_dir.join(filename)
    }

    fn remove(&self, filename: &str) -> io::Result<()> {
        match std::fs::remove_file(self.path_for(filename)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
