// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact delivery — hands a finished artifact to its destination.
//
// The filesystem sink writes through a `NamedTempFile` in the target
// directory and persists it under the suggested name only once every byte is
// on disk. On any failure the temporary file is dropped and removed. A
// delivered artifact can be withdrawn again when its session was closed
// while it was being written.

use std::io::Write;
use std::path::{Path, PathBuf};

use pdfmaster_core::ToolkitConfig;
use pdfmaster_core::error::{PdfMasterError, Result};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::operations::Artifact;

/// Highest " (n)" suffix tried before giving up on a free name.
const MAX_COLLISION_SUFFIX: u32 = 9999;

/// Where and what was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub path: PathBuf,
    pub size: u64,
    pub mime_type: String,
    /// Lowercase hex SHA-256 of the delivered bytes.
    pub sha256: String,
}

/// Destination for finished artifacts.
pub trait ArtifactSink: Send + Sync {
    fn deliver(&self, artifact: &Artifact) -> Result<DeliveryReceipt>;

    /// Undo a delivery whose result is no longer wanted. Withdrawing
    /// something that is already gone is not an error.
    fn withdraw(&self, receipt: &DeliveryReceipt) -> Result<()>;
}

/// Writes artifacts into a directory, never overwriting existing files.
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    output_dir: PathBuf,
}

impl FileSystemSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &ToolkitConfig) -> Self {
        Self::new(config.output_dir.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ArtifactSink for FileSystemSink {
    #[instrument(skip_all, fields(filename = %artifact.filename, bytes = artifact.bytes.len()))]
    fn deliver(&self, artifact: &Artifact) -> Result<DeliveryReceipt> {
        std::fs::create_dir_all(&self.output_dir)?;

        let mut transient = NamedTempFile::new_in(&self.output_dir)?;
        transient.write_all(&artifact.bytes)?;
        transient.as_file().sync_all()?;
        debug!(temp = %transient.path().display(), "Artifact staged");

        let target = free_path(&self.output_dir, &safe_file_name(&artifact.filename))?;
        // persist_noclobber fails rather than replacing a file that appeared
        // since the name was chosen; the temporary is removed on that path.
        transient.persist_noclobber(&target).map_err(|err| {
            PdfMasterError::Delivery(format!("{}: {}", target.display(), err.error))
        })?;

        let receipt = DeliveryReceipt {
            path: target,
            size: artifact.bytes.len() as u64,
            mime_type: artifact.mime_type.to_string(),
            sha256: hash_bytes(&artifact.bytes),
        };
        info!(path = %receipt.path.display(), size = receipt.size, "Artifact delivered");
        Ok(receipt)
    }

    #[instrument(skip_all, fields(path = %receipt.path.display()))]
    fn withdraw(&self, receipt: &DeliveryReceipt) -> Result<()> {
        if receipt.path.parent() != Some(self.output_dir.as_path()) {
            return Err(PdfMasterError::Delivery(format!(
                "{} was not delivered to {}",
                receipt.path.display(),
                self.output_dir.display()
            )));
        }
        match std::fs::remove_file(&receipt.path) {
            Ok(()) => {
                warn!("Delivered artifact withdrawn");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Compute the SHA-256 hash of `data` as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Final path component of a suggested name, so a name can never point
/// outside the output directory.
fn safe_file_name(suggested: &str) -> String {
    Path::new(suggested)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "artifact".to_string())
}

/// `dir/name`, or `dir/stem (n).ext` for the first n that is free.
fn free_path(dir: &Path, name: &str) -> Result<PathBuf> {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let extension = as_path.extension().map(|e| e.to_string_lossy().into_owned());

    for n in 1..=MAX_COLLISION_SUFFIX {
        let file_name = match &extension {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = dir.join(file_name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(PdfMasterError::Delivery(format!(
        "no free file name for {} in {}",
        name,
        dir.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(name: &str, bytes: &[u8]) -> Artifact {
        Artifact::pdf(bytes.to_vec(), name)
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn hash_known_value() {
        // sha256sum of "hello"
        assert_eq!(
            hash_bytes(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn delivers_under_the_suggested_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileSystemSink::new(dir.path());

        let receipt = sink.deliver(&artifact("merged.pdf", b"%PDF-1.7")).expect("deliver");
        assert_eq!(receipt.path, dir.path().join("merged.pdf"));
        assert_eq!(receipt.size, 8);
        assert_eq!(receipt.mime_type, "application/pdf");
        assert_eq!(receipt.sha256, hash_bytes(b"%PDF-1.7"));
        assert_eq!(std::fs::read(&receipt.path).expect("read"), b"%PDF-1.7");

        // Only the final file remains; the temporary was renamed away.
        assert_eq!(dir_entries(dir.path()), vec!["merged.pdf"]);
    }

    #[test]
    fn collisions_get_a_numbered_suffix() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileSystemSink::new(dir.path());

        sink.deliver(&artifact("split.pdf", b"one")).expect("first");
        sink.deliver(&artifact("split.pdf", b"two")).expect("second");
        let third = sink.deliver(&artifact("split.pdf", b"three")).expect("third");

        assert_eq!(third.path, dir.path().join("split (2).pdf"));
        assert_eq!(
            dir_entries(dir.path()),
            vec!["split (1).pdf", "split (2).pdf", "split.pdf"]
        );
        assert_eq!(std::fs::read(dir.path().join("split.pdf")).expect("read"), b"one");
    }

    #[test]
    fn suggested_names_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileSystemSink::new(dir.path());
        let receipt = sink.deliver(&artifact("../../escape.pdf", b"x")).expect("deliver");
        assert_eq!(receipt.path, dir.path().join("escape.pdf"));
    }

    #[test]
    fn creates_the_output_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("out").join("today");
        let receipt = FileSystemSink::new(&nested)
            .deliver(&artifact("converted.pdf", b"x"))
            .expect("deliver");
        assert!(receipt.path.starts_with(&nested));
    }

    #[test]
    fn withdrawn_artifacts_are_removed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileSystemSink::new(dir.path());
        let kept = sink.deliver(&artifact("kept.pdf", b"k")).expect("deliver");
        let receipt = sink.deliver(&artifact("late.pdf", b"x")).expect("deliver");

        sink.withdraw(&receipt).expect("withdraw");
        assert_eq!(dir_entries(dir.path()), vec!["kept.pdf"]);
        // A second withdraw finds nothing and is still fine.
        sink.withdraw(&receipt).expect("withdraw again");

        let elsewhere = DeliveryReceipt {
            path: dir.path().join("sub").join("kept.pdf"),
            ..kept
        };
        assert!(matches!(sink.withdraw(&elsewhere), Err(PdfMasterError::Delivery(_))));
    }

    #[test]
    fn unwritable_destination_leaves_nothing_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A file where the output directory should be.
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, b"").expect("write");

        let err = FileSystemSink::new(&blocker)
            .deliver(&artifact("merged.pdf", b"x"))
            .unwrap_err();
        assert!(matches!(err, PdfMasterError::Io(_)));
        assert_eq!(dir_entries(dir.path()), vec!["blocked"]);
    }
}
