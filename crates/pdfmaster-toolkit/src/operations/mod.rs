// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Processing strategies. Each tool with a real implementation is one
// `Operation`; the dispatcher looks them up in an `OperationRegistry`.
//
// Strategies are synchronous and CPU-bound. The dispatcher runs them on the
// blocking pool via `tokio::task::spawn_blocking`.

mod extract;
mod registry;
mod simulated;
mod structural;
mod synthesis;
mod tagging;

use pdfmaster_core::error::{PdfMasterError, Result};
use pdfmaster_core::{PDF_MIME, ToolOptions};
use pdfmaster_document::PdfReader;

pub use extract::ExtractImages;
pub use registry::OperationRegistry;
pub use simulated::SimulatedConversion;
pub use structural::{DeletePages, FlattenForms, MergeDocuments, RotatePages, SplitDocument};
pub use synthesis::{ImagesToPdf, TextToPdf};
pub use tagging::{PdfAConversion, ProtectPlaceholder};

/// A staged file after its bytes have been read.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// What a strategy works on: the text buffer or the loaded working set.
#[derive(Debug, Clone)]
pub enum OperationInput {
    Text(String),
    Files(Vec<LoadedFile>),
}

impl OperationInput {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Files(_) => None,
        }
    }

    /// Loaded files in arrival order; empty for text input.
    pub fn files(&self) -> &[LoadedFile] {
        match self {
            Self::Files(files) => files,
            Self::Text(_) => &[],
        }
    }

    /// The one file single-document tools operate on.
    fn single_file(&self) -> Result<&LoadedFile> {
        self.files()
            .first()
            .ok_or(PdfMasterError::EmptyInput("files"))
    }
}

/// The one output of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    /// Suggested download name.
    pub filename: String,
    pub mime_type: &'static str,
}

impl Artifact {
    pub fn pdf(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            mime_type: PDF_MIME,
        }
    }
}

/// Disclaimer attached to results that do not fully meet the tool's promise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Protect does not encrypt.
    NotEncrypted,
    /// PDF/A tagging is not full conformance.
    BestEffortPdfA,
    /// The tool has no real implementation; the output is a placeholder.
    Simulated { tool: &'static str },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::NotEncrypted => "True password protection requires server-side processing; \
                                   this file is a placeholder and is not encrypted."
                .to_string(),
            Self::BestEffortPdfA => "This is a best-effort PDF/A conversion. Full compliance, \
                                     especially font embedding, cannot be guaranteed."
                .to_string(),
            Self::Simulated { tool } => {
                format!("{tool}: this is a simulated result, not a real conversion.")
            }
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Output artifact plus any disclaimers that must reach the caller.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub artifact: Artifact,
    pub notices: Vec<Notice>,
}

impl From<Artifact> for ProcessingResult {
    fn from(artifact: Artifact) -> Self {
        Self {
            artifact,
            notices: Vec::new(),
        }
    }
}

/// A processing strategy for one tool.
pub trait Operation: Send + Sync {
    fn execute(&self, input: &OperationInput, options: &ToolOptions) -> Result<ProcessingResult>;
}

/// Load a staged file as a PDF, naming the file in any parse error.
fn load_pdf(file: &LoadedFile) -> Result<PdfReader> {
    PdfReader::from_bytes(&file.bytes).map_err(|err| match err {
        PdfMasterError::PdfError(msg) => {
            PdfMasterError::PdfError(format!("{}: {}", file.name, msg))
        }
        other => other,
    })
}
