// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every failure the session reports is turned into one plain sentence plus a
// suggestion for what to try next.

use crate::error::PdfMasterError;

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanError {
    /// Plain summary (shown inline in the session).
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

fn human(message: impl Into<String>, suggestion: impl Into<String>) -> HumanError {
    HumanError {
        message: message.into(),
        suggestion: suggestion.into(),
    }
}

/// Convert a `PdfMasterError` into a `HumanError`.
pub fn humanize_error(err: &PdfMasterError) -> HumanError {
    match err {
        PdfMasterError::WrongFileType { expected, .. } => human(
            format!("Please upload only {expected} for this tool."),
            "Remove the other files from your selection and drop them again.",
        ),

        PdfMasterError::EmptyInput(what) => human(
            format!("There is nothing to process: {what}."),
            "Add some input, then try again.",
        ),

        PdfMasterError::FileCount { expected, actual, .. } => human(
            format!("This tool works on {expected} file at a time, but {actual} are selected."),
            "Remove the extra files and try again.",
        ),

        PdfMasterError::NoToolSelected | PdfMasterError::UnknownTool(_) => {
            human("No tool is selected.", "Pick a tool from the list first.")
        }

        PdfMasterError::Busy => human(
            "Your files are still being processed.",
            "Wait for the current operation to finish.",
        ),

        PdfMasterError::Discarded => human(
            "The operation finished after the tool was closed, so its result was thrown away.",
            "Open the tool again and re-run it.",
        ),

        PdfMasterError::MissingOption(name) => human(
            format!("The '{name}' setting is required for this tool."),
            "Fill it in and try again.",
        ),

        PdfMasterError::IllegalOption { name, .. } => human(
            format!("The '{name}' setting does not apply to this tool."),
            "Clear it and try again.",
        ),

        PdfMasterError::InvalidOption { name, reason } => human(
            format!("The '{name}' setting is not valid: {reason}."),
            "Correct it and try again.",
        ),

        PdfMasterError::InvalidPageRange(detail) => human(
            format!("An error occurred: the page list could not be read ({detail})."),
            "Use page numbers and ranges such as 1-3, 5, 8.",
        ),

        PdfMasterError::PageOutOfRange { page, page_count } => human(
            format!(
                "An error occurred: page {page} does not exist \
                 (the document has {page_count} pages)."
            ),
            "Check the page numbers and try again.",
        ),

        PdfMasterError::PdfError(detail) => human(
            format!("An error occurred: {detail}"),
            "Please check your file and try again.",
        ),

        PdfMasterError::ImageError(detail) => human(
            format!("An error occurred: {detail}"),
            "The image may be damaged or in an unusual format. \
             Try saving it as a JPEG or PNG first.",
        ),

        PdfMasterError::NoCompatibleImages => human(
            "No compatible (JPEG) images found to extract.",
            "Only JPEG images embedded in the PDF can be extracted.",
        ),

        PdfMasterError::UnsupportedTool(name) => human(
            format!("{name} is not available yet."),
            "Try a different tool.",
        ),

        PdfMasterError::Archive(detail)
        | PdfMasterError::Task(detail)
        | PdfMasterError::Delivery(detail) => human(
            format!("An error occurred: {detail}"),
            "Please try again.",
        ),

        PdfMasterError::Io(io) => human(
            format!("An error occurred: {io}"),
            "Please check your file and try again.",
        ),

        PdfMasterError::Serialization(detail) => human(
            format!("An error occurred: {detail}"),
            "Check the configuration file.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_type_matches_inline_wording() {
        let err = PdfMasterError::WrongFileType {
            file: "photo.png".into(),
            media_type: "image/png".into(),
            expected: "PDF files",
        };
        assert_eq!(
            humanize_error(&err).message,
            "Please upload only PDF files for this tool."
        );
    }

    #[test]
    fn zero_result_has_its_own_message() {
        let h = humanize_error(&PdfMasterError::NoCompatibleImages);
        assert!(h.message.starts_with("No compatible (JPEG) images"));
    }

    #[test]
    fn processing_failures_carry_the_detail() {
        let h = humanize_error(&PdfMasterError::PdfError("invalid file header".into()));
        assert!(h.message.contains("invalid file header"));
    }
}
