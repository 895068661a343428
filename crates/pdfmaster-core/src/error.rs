// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for PDFMaster.

use thiserror::Error;

/// Top-level error type for all PDFMaster operations.
#[derive(Debug, Error)]
pub enum PdfMasterError {
    // -- Intake errors --
    #[error("wrong file type: {file} is {media_type}, this tool accepts {expected} only")]
    WrongFileType {
        file: String,
        media_type: String,
        expected: &'static str,
    },

    #[error("nothing to process: {0}")]
    EmptyInput(&'static str),

    #[error("{tool} needs exactly {expected} file(s), got {actual}")]
    FileCount {
        tool: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("no tool selected")]
    NoToolSelected,

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    // -- Session conflicts --
    #[error("an operation is already running")]
    Busy,

    #[error("session was reset before the operation finished")]
    Discarded,

    // -- Option errors --
    #[error("missing option: {0}")]
    MissingOption(&'static str),

    #[error("option {name} is not valid for {tool}")]
    IllegalOption { name: String, tool: &'static str },

    #[error("invalid value for {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("invalid page range: {0}")]
    InvalidPageRange(String),

    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    // -- Processing errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("archive packaging failed: {0}")]
    Archive(String),

    #[error("no compatible (JPEG) images found to extract")]
    NoCompatibleImages,

    #[error("unsupported operation: {0}")]
    UnsupportedTool(String),

    #[error("background task failed: {0}")]
    Task(String),

    // -- Delivery --
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Where an error sits in the failure taxonomy.
///
/// Drives how the session reports it: validation errors are rejected before
/// anything runs, processing errors abort an in-flight invocation, zero-result
/// failures are reported without a crash, conflicts are refused outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InputValidation,
    Processing,
    ZeroResult,
    Conflict,
}

impl PdfMasterError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::WrongFileType { .. }
            | Self::EmptyInput(_)
            | Self::FileCount { .. }
            | Self::NoToolSelected
            | Self::UnknownTool(_) => ErrorClass::InputValidation,

            Self::Busy | Self::Discarded => ErrorClass::Conflict,

            Self::NoCompatibleImages => ErrorClass::ZeroResult,

            Self::MissingOption(_)
            | Self::IllegalOption { .. }
            | Self::InvalidOption { .. }
            | Self::InvalidPageRange(_)
            | Self::PageOutOfRange { .. }
            | Self::PdfError(_)
            | Self::ImageError(_)
            | Self::Archive(_)
            | Self::UnsupportedTool(_)
            | Self::Task(_)
            | Self::Delivery(_)
            | Self::Io(_)
            | Self::Serialization(_) => ErrorClass::Processing,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PdfMasterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_result_is_distinct_from_processing() {
        assert_eq!(PdfMasterError::NoCompatibleImages.class(), ErrorClass::ZeroResult);
        assert_eq!(
            PdfMasterError::PdfError("bad xref".into()).class(),
            ErrorClass::Processing
        );
    }

    #[test]
    fn malformed_range_is_a_processing_failure() {
        let err = PdfMasterError::InvalidPageRange("x".into());
        assert_eq!(err.class(), ErrorClass::Processing);
    }

    #[test]
    fn wrong_type_message_names_the_file() {
        let err = PdfMasterError::WrongFileType {
            file: "notes.txt".into(),
            media_type: "text/plain".into(),
            expected: "PDF files",
        };
        assert!(err.to_string().contains("notes.txt"));
        assert_eq!(err.class(), ErrorClass::InputValidation);
    }
}
