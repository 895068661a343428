// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File intake — staged input files and the working set they are collected in.

use std::path::{Path, PathBuf};

use pdfmaster_core::error::{PdfMasterError, Result};
use pdfmaster_core::{DocumentType, FileId, InputKind, ToolId};
use tracing::{debug, info, warn};

/// Where a staged file's bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Already in memory.
    Memory(Vec<u8>),
    /// Read from disk when the operation runs.
    Path(PathBuf),
}

/// One staged file: an opaque blob with a name and a declared media type.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub id: FileId,
    pub name: String,
    pub media_type: String,
    pub source: FileSource,
}

impl InputFile {
    /// Stage bytes already in memory under an explicit media type.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            id: FileId::new(),
            name: name.into(),
            media_type: media_type.into(),
            source: FileSource::Memory(bytes),
        }
    }

    /// Stage a file on disk. The media type is declared from the extension;
    /// the contents are not sniffed.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = path
            .extension()
            .map(|ext| DocumentType::from_extension(&ext.to_string_lossy()))
            .unwrap_or(DocumentType::Other)
            .mime_type();
        Self {
            id: FileId::new(),
            name,
            media_type: media_type.to_string(),
            source: FileSource::Path(path.to_path_buf()),
        }
    }

    /// Fetch the file's bytes.
    pub async fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => {
                let bytes = tokio::fs::read(path).await?;
                debug!(name = %self.name, bytes = bytes.len(), "File read");
                Ok(bytes)
            }
        }
    }
}

/// Insertion-ordered set of files staged for the selected tool.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    files: Vec<InputFile>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch after checking every member against the tool's input
    /// requirement. One bad file rejects the whole batch and leaves the set
    /// unchanged.
    pub fn submit(&mut self, batch: Vec<InputFile>, tool: ToolId) -> Result<usize> {
        let kind = tool.input_kind();
        if kind == InputKind::Text && !batch.is_empty() {
            return Err(PdfMasterError::WrongFileType {
                file: batch[0].name.clone(),
                media_type: batch[0].media_type.clone(),
                expected: kind.describe(),
            });
        }
        if let Some(bad) = batch.iter().find(|file| !kind.accepts(&file.media_type)) {
            warn!(
                tool = %tool,
                file = %bad.name,
                media_type = %bad.media_type,
                batch = batch.len(),
                "Batch rejected"
            );
            return Err(PdfMasterError::WrongFileType {
                file: bad.name.clone(),
                media_type: bad.media_type.clone(),
                expected: kind.describe(),
            });
        }

        let added = batch.len();
        self.files.extend(batch);
        info!(tool = %tool, added, total = self.files.len(), "Files staged");
        Ok(added)
    }

    /// Remove a file by identity. Returns false if it was not staged.
    pub fn remove(&mut self, id: FileId) -> bool {
        match self.files.iter().position(|file| file.id == id) {
            Some(index) => {
                self.files.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfmaster_core::PDF_MIME;

    fn pdf(name: &str) -> InputFile {
        InputFile::from_bytes(name, PDF_MIME, b"%PDF-1.7".to_vec())
    }

    #[test]
    fn one_wrong_file_rejects_the_whole_batch() {
        let mut set = WorkingSet::new();
        set.submit(vec![pdf("existing.pdf")], ToolId::MergePdf).expect("accepted");

        let batch = vec![
            pdf("a.pdf"),
            pdf("b.pdf"),
            InputFile::from_bytes("photo.png", "image/png", vec![1, 2, 3]),
            pdf("c.pdf"),
            pdf("d.pdf"),
        ];
        let err = set.submit(batch, ToolId::MergePdf).unwrap_err();
        assert!(matches!(
            err,
            PdfMasterError::WrongFileType { ref file, .. } if file == "photo.png"
        ));
        assert_eq!(set.len(), 1);
        assert_eq!(set.files()[0].name, "existing.pdf");
    }

    #[test]
    fn image_tool_rejects_pdfs() {
        let mut set = WorkingSet::new();
        let err = set.submit(vec![pdf("a.pdf")], ToolId::JpgToPdf).unwrap_err();
        assert!(matches!(err, PdfMasterError::WrongFileType { expected: "image files", .. }));
        assert!(set.is_empty());
    }

    #[test]
    fn text_tool_takes_no_files() {
        let mut set = WorkingSet::new();
        assert!(set.submit(vec![pdf("a.pdf")], ToolId::TextToPdf).is_err());
        assert_eq!(set.submit(Vec::new(), ToolId::TextToPdf).expect("empty batch"), 0);
    }

    #[test]
    fn any_file_tools_accept_everything_in_order() {
        let mut set = WorkingSet::new();
        let batch = vec![
            InputFile::from_bytes("a.docx", "application/octet-stream", vec![]),
            pdf("b.pdf"),
        ];
        set.submit(batch, ToolId::WordToPdf).expect("accepted");
        let names: Vec<&str> = set.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.docx", "b.pdf"]);
    }

    #[test]
    fn remove_is_by_identity() {
        let mut set = WorkingSet::new();
        let first = pdf("same.pdf");
        let second = pdf("same.pdf");
        let first_id = first.id;
        set.submit(vec![first, second], ToolId::MergePdf).expect("accepted");

        assert!(set.remove(first_id));
        assert_eq!(set.len(), 1);
        assert_ne!(set.files()[0].id, first_id);
        assert!(!set.remove(first_id));
    }

    #[test]
    fn media_type_comes_from_extension() {
        assert_eq!(InputFile::from_path("/tmp/scan.JPG").media_type, "image/jpeg");
        assert_eq!(InputFile::from_path("report.pdf").media_type, PDF_MIME);
        assert_eq!(InputFile::from_path("report.pdf").name, "report.pdf");
    }

    #[tokio::test]
    async fn reads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("input.pdf");
        std::fs::write(&path, b"%PDF-1.4 test").expect("write");

        let file = InputFile::from_path(&path);
        assert_eq!(file.read().await.expect("read"), b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let file = InputFile::from_path("/definitely/not/here.pdf");
        assert!(matches!(file.read().await, Err(PdfMasterError::Io(_))));
    }
}
