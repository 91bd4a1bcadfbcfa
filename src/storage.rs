//! Shared storage directory for job artifacts and status records
//!
//! All per-job files live flat inside a single directory: temporary
//! extractor output (`{id}_src*`), finalized artifacts (`{id}_media.{ext}`)
//! and status records (`{id}.status.json`). Names are scoped by job id, so
//! concurrent jobs cannot collide; deletes tolerate "already gone" because
//! the janitor may race any of them.

use crate::error::Result;
use crate::types::{JobId, MediaFormat};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::{debug, warn};

/// The shared temporary-file directory holding all job artifacts
#[derive(Debug, Clone)]
pub struct StorageArea {
    root: PathBuf,
}

impl StorageArea {
    /// Open a storage area, creating the directory if it does not exist
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let root = dir.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The storage directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical artifact file name for a completed job
    pub fn artifact_name(id: &JobId, format: MediaFormat) -> String {
        format!("{}_media.{}", id, format.extension())
    }

    /// Full path of the canonical artifact for a job
    pub fn artifact_path(&self, id: &JobId, format: MediaFormat) -> PathBuf {
        self.root.join(Self::artifact_name(id, format))
    }

    /// Job-scoped temporary base name handed to the extractor
    ///
    /// The extractor appends its own codec-specific extension, so locating
    /// the produced file is a prefix scan over this base.
    pub fn temp_base(id: &JobId) -> String {
        format!("{}_src", id)
    }

    /// Full path of the temporary output base for a job
    pub fn temp_output_path(&self, id: &JobId) -> PathBuf {
        self.root.join(Self::temp_base(id))
    }

    /// Resolve a bare filename inside the storage area
    ///
    /// Callers must have validated the name first; this is a plain join.
    pub fn resolve(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Find files produced under a job's temporary base name
    ///
    /// Returns all plain files at the top level whose name starts with the
    /// temp base, most recently modified first. The extractor controls the
    /// final extension, so the caller picks the first entry when exactly one
    /// output is expected; the recency order is the documented tie-break for
    /// the ambiguous multiple-match case.
    pub async fn find_by_temp_base(&self, id: &JobId) -> Result<Vec<PathBuf>> {
        let prefix = Self::temp_base(id);
        let mut matches: Vec<(PathBuf, SystemTime)> = Vec::new();

        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(&prefix) {
                continue;
            }
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            // Unreadable mtimes sort last
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            matches.push((entry.path(), modified));
        }

        matches.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(matches.into_iter().map(|(path, _)| path).collect())
    }

    /// Delete every leftover file matching a job's temporary base name
    ///
    /// Used by the executor's final sweep. Individual failures are logged
    /// and swallowed; returns the number of files actually removed.
    pub async fn remove_temp_files(&self, id: &JobId) -> usize {
        let leftovers = match self.find_by_temp_base(id).await {
            Ok(files) => files,
            Err(e) => {
                warn!(job_id = %id, error = %e, "failed to scan for leftover temp files");
                return 0;
            }
        };

        let mut removed = 0;
        for file in leftovers {
            match fs::remove_file(&file).await {
                Ok(()) => {
                    debug!(job_id = %id, ?file, "removed leftover temp file");
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(job_id = %id, ?file, error = %e, "failed to remove leftover temp file");
                }
            }
        }
        removed
    }

    /// Delete a file, treating "already gone" as success
    pub async fn remove_file(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Count plain files at the top level of the storage area
    pub async fn file_count(&self) -> Result<usize> {
        let mut count = 0;
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.metadata().await.map(|m| m.is_file()).unwrap_or(false) {
                count += 1;
            }
        }
        Ok(count)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn storage() -> (StorageArea, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = StorageArea::new(temp_dir.path()).await.unwrap();
        (storage, temp_dir)
    }

    #[tokio::test]
    async fn test_new_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b/downloads");
        let storage = StorageArea::new(&nested).await.unwrap();
        assert!(storage.root().is_dir());
    }

    #[test]
    fn test_artifact_and_temp_names_are_job_scoped() {
        let id = JobId::from("abc123");
        assert_eq!(
            StorageArea::artifact_name(&id, MediaFormat::Audio),
            "abc123_media.mp3"
        );
        assert_eq!(
            StorageArea::artifact_name(&id, MediaFormat::Video),
            "abc123_media.mp4"
        );
        assert_eq!(StorageArea::temp_base(&id), "abc123_src");
    }

    #[tokio::test]
    async fn test_find_by_temp_base_matches_only_own_prefix() {
        let (storage, _guard) = storage().await;
        let id = JobId::from("job1");

        std::fs::write(storage.resolve("job1_src.webm"), b"x").unwrap();
        std::fs::write(storage.resolve("job2_src.webm"), b"x").unwrap();
        std::fs::write(storage.resolve("job1.status.json"), b"{}").unwrap();
        std::fs::write(storage.resolve("job1_media.mp3"), b"x").unwrap();

        let found = storage.find_by_temp_base(&id).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("job1_src.webm"));
    }

    #[tokio::test]
    async fn test_find_by_temp_base_orders_most_recent_first() {
        let (storage, _guard) = storage().await;
        let id = JobId::from("job1");

        let older = storage.resolve("job1_src.part");
        let newer = storage.resolve("job1_src.mp3");
        std::fs::write(&older, b"x").unwrap();
        std::fs::write(&newer, b"x").unwrap();

        // Backdate the first file so the ordering does not depend on
        // filesystem timestamp granularity
        let past = SystemTime::now() - Duration::from_secs(300);
        File::options()
            .write(true)
            .open(&older)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let found = storage.find_by_temp_base(&id).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("job1_src.mp3"));
        assert!(found[1].ends_with("job1_src.part"));
    }

    #[tokio::test]
    async fn test_remove_temp_files_sweeps_all_matches() {
        let (storage, _guard) = storage().await;
        let id = JobId::from("job1");

        std::fs::write(storage.resolve("job1_src.part"), b"x").unwrap();
        std::fs::write(storage.resolve("job1_src.webm"), b"x").unwrap();
        std::fs::write(storage.resolve("other.mp3"), b"x").unwrap();

        let removed = storage.remove_temp_files(&id).await;
        assert_eq!(removed, 2);
        assert!(storage.resolve("other.mp3").exists());
        assert!(storage.find_by_temp_base(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_file_tolerates_already_gone() {
        let (storage, _guard) = storage().await;
        let path = storage.resolve("nothing_here.mp3");
        assert!(storage.remove_file(&path).await.is_ok());
    }

    #[tokio::test]
    async fn test_file_count_ignores_directories() {
        let (storage, _guard) = storage().await;
        std::fs::write(storage.resolve("a.mp3"), b"x").unwrap();
        std::fs::write(storage.resolve("b.mp4"), b"x").unwrap();
        std::fs::create_dir(storage.resolve("subdir")).unwrap();

        assert_eq!(storage.file_count().await.unwrap(), 2);
    }
}
