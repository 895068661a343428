// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operation dispatcher — validates a request, reads the staged files in
// order, and runs the selected strategy on the blocking pool.

use std::sync::Arc;

use pdfmaster_core::error::{PdfMasterError, Result};
use pdfmaster_core::{FileCardinality, InputKind, OptionMap, ToolId, ToolOptions, ToolkitConfig};
use tracing::{info, instrument, warn};

use crate::intake::InputFile;
use crate::operations::{LoadedFile, OperationInput, OperationRegistry, ProcessingResult};

/// Everything one invocation needs, snapshotted from the session.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub tool: ToolId,
    pub files: Vec<InputFile>,
    pub text: String,
    pub options: OptionMap,
}

impl DispatchRequest {
    pub fn new(tool: ToolId) -> Self {
        Self {
            tool,
            files: Vec::new(),
            text: String::new(),
            options: OptionMap::new(),
        }
    }
}

pub struct Dispatcher {
    registry: Arc<OperationRegistry>,
}

impl Dispatcher {
    pub fn new(registry: OperationRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Dispatcher over the standard registry for `config`.
    pub fn from_config(config: &ToolkitConfig) -> Self {
        Self::new(OperationRegistry::standard(config))
    }

    /// Run one invocation to completion. Produces exactly one artifact or
    /// one error; nothing is retried.
    #[instrument(skip_all, fields(tool = %request.tool, files = request.files.len()))]
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<ProcessingResult> {
        let DispatchRequest {
            tool,
            files,
            text,
            options,
        } = request;

        check_input(tool, &files, &text)?;
        let options = ToolOptions::from_map(tool, &options)?;
        let strategy = self
            .registry
            .get(tool)
            .ok_or_else(|| PdfMasterError::UnsupportedTool(tool.as_str().to_string()))?;

        let input = if tool.input_kind() == InputKind::Text {
            OperationInput::Text(text)
        } else {
            // Sequential on purpose: output order follows arrival order.
            let mut loaded = Vec::with_capacity(files.len());
            for file in &files {
                loaded.push(LoadedFile {
                    name: file.name.clone(),
                    media_type: file.media_type.clone(),
                    bytes: file.read().await?,
                });
            }
            OperationInput::Files(loaded)
        };

        info!(tool = %tool, "Operation started");
        let result = tokio::task::spawn_blocking(move || strategy.execute(&input, &options))
            .await
            .map_err(|err| PdfMasterError::Task(err.to_string()))??;

        for notice in &result.notices {
            warn!(tool = %tool, "{}", notice);
        }
        info!(
            tool = %tool,
            filename = %result.artifact.filename,
            bytes = result.artifact.bytes.len(),
            "Operation finished"
        );
        Ok(result)
    }
}

/// Entry guard: the tool must have something to work on, in the right
/// quantity and of the right type.
fn check_input(tool: ToolId, files: &[InputFile], text: &str) -> Result<()> {
    let kind = tool.input_kind();
    if kind == InputKind::Text {
        if text.trim().is_empty() {
            return Err(PdfMasterError::EmptyInput("text"));
        }
        return Ok(());
    }

    if files.is_empty() {
        return Err(PdfMasterError::EmptyInput("files"));
    }
    if tool.cardinality() == FileCardinality::ExactlyOne && files.len() != 1 {
        return Err(PdfMasterError::FileCount {
            tool: tool.as_str(),
            expected: 1,
            actual: files.len(),
        });
    }
    if let Some(bad) = files.iter().find(|file| !kind.accepts(&file.media_type)) {
        return Err(PdfMasterError::WrongFileType {
            file: bad.name.clone(),
            media_type: bad.media_type.clone(),
            expected: kind.describe(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfmaster_core::PDF_MIME;
    use pdfmaster_document::fixtures::{labeled_pdf, page_labels, prefixed_pdf};

    fn dispatcher() -> Dispatcher {
        Dispatcher::from_config(&ToolkitConfig {
            simulated_delay_ms: 0,
            ..ToolkitConfig::default()
        })
    }

    fn pdf(name: &str, bytes: Vec<u8>) -> InputFile {
        InputFile::from_bytes(name, PDF_MIME, bytes)
    }

    #[tokio::test]
    async fn merge_runs_end_to_end() {
        let mut request = DispatchRequest::new(ToolId::MergePdf);
        request.files = vec![
            pdf("a.pdf", prefixed_pdf("A", 1)),
            pdf("b.pdf", prefixed_pdf("B", 2)),
        ];

        let result = dispatcher().dispatch(request).await.expect("merge");
        assert_eq!(page_labels(&result.artifact.bytes), vec!["A 1", "B 1", "B 2"]);
    }

    #[tokio::test]
    async fn empty_inputs_are_refused() {
        let err = dispatcher()
            .dispatch(DispatchRequest::new(ToolId::MergePdf))
            .await
            .unwrap_err();
        assert!(matches!(err, PdfMasterError::EmptyInput("files")));

        let mut text = DispatchRequest::new(ToolId::TextToPdf);
        text.text = "   ".into();
        let err = dispatcher().dispatch(text).await.unwrap_err();
        assert!(matches!(err, PdfMasterError::EmptyInput("text")));
    }

    #[tokio::test]
    async fn single_document_tools_take_one_file() {
        let mut request = DispatchRequest::new(ToolId::RotatePdf);
        request.files = vec![pdf("a.pdf", labeled_pdf(1)), pdf("b.pdf", labeled_pdf(1))];
        let err = dispatcher().dispatch(request).await.unwrap_err();
        assert!(matches!(
            err,
            PdfMasterError::FileCount { expected: 1, actual: 2, .. }
        ));
    }

    #[tokio::test]
    async fn illegal_option_names_are_rejected() {
        let mut request = DispatchRequest::new(ToolId::MergePdf);
        request.files = vec![pdf("a.pdf", labeled_pdf(1))];
        request.options.set("angle", "90");
        let err = dispatcher().dispatch(request).await.unwrap_err();
        assert!(matches!(err, PdfMasterError::IllegalOption { ref name, .. } if name == "angle"));
    }

    #[tokio::test]
    async fn malformed_range_fails_before_loading() {
        let mut request = DispatchRequest::new(ToolId::SplitPdf);
        request.files = vec![pdf("a.pdf", b"not even a pdf".to_vec())];
        request.options.set("pages", "3-1");
        let err = dispatcher().dispatch(request).await.unwrap_err();
        assert!(matches!(err, PdfMasterError::InvalidPageRange(_)));
    }

    #[tokio::test]
    async fn disabled_simulation_reports_unsupported() {
        let dispatcher = Dispatcher::from_config(&ToolkitConfig {
            simulate_unsupported: false,
            ..ToolkitConfig::default()
        });
        let mut request = DispatchRequest::new(ToolId::CompressPdf);
        request.files = vec![pdf("a.pdf", labeled_pdf(1))];
        let err = dispatcher.dispatch(request).await.unwrap_err();
        assert!(matches!(err, PdfMasterError::UnsupportedTool(ref id) if id == "compress-pdf"));
    }

    #[tokio::test]
    async fn simulated_tools_carry_a_notice() {
        let mut request = DispatchRequest::new(ToolId::RepairPdf);
        request.files = vec![pdf("a.pdf", labeled_pdf(1))];
        let result = dispatcher().dispatch(request).await.expect("simulate");
        assert_eq!(result.artifact.filename, "repair_pdf.pdf");
        assert_eq!(result.notices.len(), 1);
    }
}
