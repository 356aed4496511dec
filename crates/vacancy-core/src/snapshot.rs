//! On-disk JSON snapshot of raw per-company fetch results.
//!
//! The document maps company display name → `{"items": [...]}` as returned by
//! the API. Merging is last-write-wins per company key; keys absent from the
//! new batch are left untouched.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use encoding_rs::{UTF_8, WINDOWS_1251};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::CompanyPayload;

/// Company name → raw payload.
pub type SnapshotDocument = Map<String, Value>;

type Decoder = fn(&[u8]) -> Option<Cow<'_, str>>;

/// Decode attempts, tried in order until one yields a JSON object.
const DECODERS: &[(&str, Decoder)] = &[("utf-8", decode_utf8), ("windows-1251", decode_windows_1251)];

fn decode_utf8(bytes: &[u8]) -> Option<Cow<'_, str>> {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    (!had_errors).then_some(text)
}

fn decode_windows_1251(bytes: &[u8]) -> Option<Cow<'_, str>> {
    WINDOWS_1251.decode_without_bom_handling_and_without_replacement(bytes)
}

/// Where a loaded document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// No file at the path; started from an empty document.
    Missing,
    /// Decoded with the named encoding.
    Decoded(&'static str),
    /// The file existed but no decode attempt produced a JSON object.
    Unreadable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSnapshot {
    pub document: SnapshotDocument,
    pub origin: SnapshotOrigin,
}

impl LoadedSnapshot {
    fn empty(origin: SnapshotOrigin) -> Self {
        Self {
            document: SnapshotDocument::new(),
            origin,
        }
    }
}

/// Decode snapshot bytes, trying each encoding in turn.
///
/// Returns the first attempt that produces a JSON object, together with the
/// encoding label that worked.
pub fn decode_snapshot(bytes: &[u8]) -> Option<(SnapshotDocument, &'static str)> {
    DECODERS.iter().find_map(|&(label, decode)| {
        let Some(text) = decode(bytes) else {
            tracing::debug!(encoding = label, "Snapshot bytes are not valid in this encoding");
            return None;
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(document)) => Some((document, label)),
            Ok(_) => {
                tracing::warn!(encoding = label, "Snapshot is valid JSON but not an object");
                None
            }
            Err(e) => {
                tracing::warn!(encoding = label, error = %e, "Failed to parse snapshot JSON");
                None
            }
        }
    })
}

/// Merge a batch into an existing document. Each company in the batch
/// replaces its key wholesale; no merging inside a company's items.
pub fn merge(mut document: SnapshotDocument, batch: &[CompanyPayload]) -> SnapshotDocument {
    for entry in batch {
        document.insert(entry.name.clone(), entry.payload.clone());
    }
    document
}

/// A snapshot file at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. Never fails: a missing, unreadable, or corrupt file
    /// yields an empty document.
    pub fn load(&self) -> LoadedSnapshot {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Snapshot file does not exist, starting empty");
                return LoadedSnapshot::empty(SnapshotOrigin::Missing);
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read snapshot, starting empty");
                return LoadedSnapshot::empty(SnapshotOrigin::Unreadable);
            }
        };

        match decode_snapshot(&bytes) {
            Some((document, encoding)) => {
                tracing::debug!(
                    path = %self.path.display(),
                    encoding,
                    companies = document.len(),
                    "Loaded snapshot"
                );
                LoadedSnapshot {
                    document,
                    origin: SnapshotOrigin::Decoded(encoding),
                }
            }
            None => {
                tracing::warn!(path = %self.path.display(), "Snapshot could not be decoded, starting empty");
                LoadedSnapshot::empty(SnapshotOrigin::Unreadable)
            }
        }
    }

    /// Overwrite the file with a pretty-printed document.
    ///
    /// Not atomic: a crash mid-write can leave a truncated file, which the
    /// next [`load`](Self::load) treats as empty.
    pub fn write(&self, document: &SnapshotDocument) -> Result<(), AppError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        std::fs::write(&self.path, bytes).map_err(|e| {
            AppError::SnapshotError(format!("Failed to write {}: {e}", self.path.display()))
        })
    }

    /// Load, merge the batch in, and write back. Returns the merged document.
    pub fn merge_batch(&self, batch: &[CompanyPayload]) -> Result<SnapshotDocument, AppError> {
        let loaded = self.load();
        let merged = merge(loaded.document, batch);
        self.write(&merged)?;
        tracing::info!(
            path = %self.path.display(),
            updated = batch.len(),
            companies = merged.len(),
            "Snapshot updated"
        );
        Ok(merged)
    }
}
