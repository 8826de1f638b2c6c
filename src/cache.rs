//! Compiled stylesheet persistence.
//!
//! Recomputing the aggregate on every visitor request is wasted work when
//! contributions only change on administrative saves. This module persists
//! one compiled artifact so file-mode delivery can reference it instead.
//!
//! # Design
//!
//! ## Single artifact, no keys
//!
//! There is exactly one artifact per store: `stylecast/custom-style.css`
//! under the host's writable root. Existence is the only validity signal
//! delivery consults — no timestamps, no per-fragment keys. The artifact is
//! created and overwritten only by regeneration and read by every
//! non-editing file-mode request.
//!
//! ## Atomic overwrite
//!
//! Writes go to a temp file in the cache directory and are renamed over the
//! artifact, so a concurrent reader sees either the prior complete content
//! or the new complete content, never a partial file. Concurrent writers
//! race last-writer-wins; regeneration originates from a single privileged
//! admin action, so the race is rare and the worst case is a momentarily
//! incomplete rebuild that the next regeneration repairs.
//!
//! ## Manifest sidecar
//!
//! `.stylecast-manifest.json` next to the artifact records a SHA-256 of the
//! content that was written. It backs the cheap drift check
//! ([`CacheStore::is_current`]) and nothing else: the delivery decision
//! never reads it, and a missing or corrupt manifest simply reports
//! not-current until the next regeneration rewrites it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Directory created under the configured writable root.
const CACHE_DIR: &str = "stylecast";

/// Fixed artifact filename.
const ARTIFACT_FILENAME: &str = "custom-style.css";

/// Manifest sidecar filename.
const MANIFEST_FILENAME: &str = ".stylecast-manifest.json";

/// Version of the manifest format. Bump to invalidate existing manifests
/// when the format or hash computation changes.
const MANIFEST_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache artifact not found: {0}")]
    NotFound(PathBuf),
    #[error("cache write failed at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Advisory record of the content the artifact was last written from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct CacheManifest {
    version: u32,
    content_hash: String,
}

/// Store for the single compiled-stylesheet artifact.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// `root` is the host's writable upload root; the store owns the fixed
    /// `stylecast/` directory beneath it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn cache_dir(&self) -> PathBuf {
        self.root.join(CACHE_DIR)
    }

    /// Filesystem location of the artifact.
    pub fn artifact_path(&self) -> PathBuf {
        self.cache_dir().join(ARTIFACT_FILENAME)
    }

    fn manifest_path(&self) -> PathBuf {
        self.cache_dir().join(MANIFEST_FILENAME)
    }

    /// Root-relative path the serving process exposes the artifact under.
    /// Joined with the configured public base to form the delivered URL.
    pub fn public_path(&self) -> String {
        format!("{CACHE_DIR}/{ARTIFACT_FILENAME}")
    }

    /// Whether a compiled artifact is present. This is the only signal the
    /// delivery decision consults.
    pub fn exists(&self) -> bool {
        self.artifact_path().is_file()
    }

    /// Read the artifact content.
    pub fn read(&self) -> Result<String, CacheError> {
        let path = self.artifact_path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(CacheError::NotFound(path)),
            Err(err) => Err(CacheError::Io(err)),
        }
    }

    /// Overwrite the artifact with `content`, atomically.
    ///
    /// Creates the cache directory if missing, writes a temp file alongside
    /// the artifact, syncs it, and renames it into place. Any failure up to
    /// the rename leaves the prior artifact untouched; the caller decides
    /// the fallback.
    pub fn write(&self, content: &str) -> Result<(), CacheError> {
        let dir = self.cache_dir();
        fs::create_dir_all(&dir).map_err(|source| CacheError::Write {
            path: dir.clone(),
            source,
        })?;

        let path = self.artifact_path();
        let write_err = |source: io::Error| CacheError::Write {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        set_artifact_permissions(tmp.as_file()).map_err(write_err)?;
        tmp.persist(&path).map_err(|err| write_err(err.error))?;

        self.write_manifest(content);
        Ok(())
    }

    /// Write the manifest sidecar. Failure is absorbed: the manifest is
    /// advisory, and losing it only disables the drift check until the next
    /// regeneration.
    fn write_manifest(&self, content: &str) {
        let manifest = CacheManifest {
            version: MANIFEST_VERSION,
            content_hash: content_hash(content),
        };
        let json = match serde_json::to_string_pretty(&manifest) {
            Ok(json) => json,
            Err(error) => {
                tracing::warn!(%error, "manifest serialization failed");
                return;
            }
        };
        if let Err(error) = fs::write(self.manifest_path(), json) {
            tracing::warn!(%error, "manifest sidecar write failed, drift check disabled");
        }
    }

    fn load_manifest(&self) -> Option<CacheManifest> {
        let content = fs::read_to_string(self.manifest_path()).ok()?;
        let manifest: CacheManifest = serde_json::from_str(&content).ok()?;
        (manifest.version == MANIFEST_VERSION).then_some(manifest)
    }

    /// Cheap drift check: does the recorded hash match `content`?
    ///
    /// Advisory only — the delivery decision works from [`exists`] alone,
    /// and a missing or corrupt manifest reports `false`.
    ///
    /// [`exists`]: CacheStore::exists
    pub fn is_current(&self, content: &str) -> bool {
        self.load_manifest()
            .is_some_and(|m| m.content_hash == content_hash(content))
    }
}

/// SHA-256 of stylesheet content, as a hex string.
pub fn content_hash(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

/// Owner read/write, world read: the serving process is typically a
/// different user than the one regenerating.
#[cfg(unix)]
fn set_artifact_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_artifact_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, CacheStore) {
        let tmp = TempDir::new().unwrap();
        let store = CacheStore::new(tmp.path());
        (tmp, store)
    }

    // =========================================================================
    // write / read / exists
    // =========================================================================

    #[test]
    fn read_missing_artifact_is_not_found() {
        let (_tmp, store) = store();
        assert!(!store.exists());
        assert!(matches!(store.read(), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn write_then_read_roundtrip() {
        let (_tmp, store) = store();
        store.write("body{color:red;}").unwrap();
        assert!(store.exists());
        assert_eq!(store.read().unwrap(), "body{color:red;}");
    }

    #[test]
    fn write_creates_cache_directory() {
        let (tmp, store) = store();
        assert!(!tmp.path().join("stylecast").exists());
        store.write("a{}").unwrap();
        assert!(tmp.path().join("stylecast/custom-style.css").is_file());
    }

    #[test]
    fn write_overwrites_wholesale() {
        let (_tmp, store) = store();
        store.write("a{color:red;}").unwrap();
        store.write("b{}").unwrap();
        assert_eq!(store.read().unwrap(), "b{}");
    }

    #[test]
    fn write_leaves_no_temp_files_behind() {
        let (tmp, store) = store();
        store.write("a{}").unwrap();
        let mut names: Vec<String> = fs::read_dir(tmp.path().join("stylecast"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![".stylecast-manifest.json", "custom-style.css"]);
    }

    #[test]
    fn write_empty_content_is_allowed() {
        let (_tmp, store) = store();
        store.write("").unwrap();
        assert!(store.exists());
        assert_eq!(store.read().unwrap(), "");
    }

    #[test]
    fn unwritable_root_fails_with_write_error() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the root directory should be: create_dir_all
        // cannot succeed beneath it.
        let blocked = tmp.path().join("blocked");
        fs::write(&blocked, "not a directory").unwrap();

        let store = CacheStore::new(&blocked);
        let err = store.write("a{}").unwrap_err();
        assert!(matches!(err, CacheError::Write { .. }));
        // Prior state untouched: still no artifact anywhere.
        assert!(!store.exists());
    }

    #[test]
    fn public_path_matches_artifact_location() {
        let (tmp, store) = store();
        assert_eq!(tmp.path().join(store.public_path()), store.artifact_path());
        assert_eq!(store.public_path(), "stylecast/custom-style.css");
    }

    // =========================================================================
    // Manifest and drift check
    // =========================================================================

    #[test]
    fn is_current_after_write() {
        let (_tmp, store) = store();
        store.write("a{color:red;}").unwrap();
        assert!(store.is_current("a{color:red;}"));
    }

    #[test]
    fn is_current_detects_drift() {
        let (_tmp, store) = store();
        store.write("a{color:red;}").unwrap();
        assert!(!store.is_current("a{color:blue;}"));
    }

    #[test]
    fn missing_manifest_reports_not_current() {
        let (tmp, store) = store();
        store.write("a{}").unwrap();
        fs::remove_file(tmp.path().join("stylecast/.stylecast-manifest.json")).unwrap();
        assert!(!store.is_current("a{}"));
    }

    #[test]
    fn corrupt_manifest_reports_not_current() {
        let (tmp, store) = store();
        store.write("a{}").unwrap();
        fs::write(
            tmp.path().join("stylecast/.stylecast-manifest.json"),
            "not json",
        )
        .unwrap();
        assert!(!store.is_current("a{}"));
    }

    #[test]
    fn wrong_manifest_version_reports_not_current() {
        let (tmp, store) = store();
        store.write("a{}").unwrap();
        let json = format!(
            r#"{{"version": {}, "content_hash": "{}"}}"#,
            MANIFEST_VERSION + 1,
            content_hash("a{}")
        );
        fs::write(tmp.path().join("stylecast/.stylecast-manifest.json"), json).unwrap();
        assert!(!store.is_current("a{}"));
    }

    #[test]
    fn rewrite_refreshes_manifest() {
        let (_tmp, store) = store();
        store.write("old{}").unwrap();
        store.write("new{}").unwrap();
        assert!(store.is_current("new{}"));
        assert!(!store.is_current("old{}"));
    }

    // =========================================================================
    // content_hash
    // =========================================================================

    #[test]
    fn content_hash_is_deterministic() {
        assert_eq!(content_hash("a{}"), content_hash("a{}"));
        assert_eq!(content_hash("a{}").len(), 64);
    }

    #[test]
    fn content_hash_changes_with_content() {
        assert_ne!(content_hash("a{}"), content_hash("b{}"));
    }
}
