// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Zip packaging for multi-file results.

use std::io::{Cursor, Write};

use pdfmaster_core::error::{PdfMasterError, Result};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds a zip archive in memory.
///
/// Entries are stored uncompressed: the payloads are already-compressed
/// JPEG streams.
pub struct ZipPackager {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl Default for ZipPackager {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipPackager {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    /// Add one file to the archive.
    pub fn add(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer.start_file(name, options).map_err(|err| {
            PdfMasterError::Archive(format!("cannot start entry {}: {}", name, err))
        })?;
        self.writer.write_all(data).map_err(|err| {
            PdfMasterError::Archive(format!("cannot write entry {}: {}", name, err))
        })?;
        self.entries += 1;
        debug!(name, bytes = data.len(), "Archive entry added");
        Ok(())
    }

    /// Number of entries added so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Write the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self
            .writer
            .finish()
            .map_err(|err| PdfMasterError::Archive(format!("cannot finish archive: {}", err)))?;
        Ok(cursor.into_inner())
    }
}
