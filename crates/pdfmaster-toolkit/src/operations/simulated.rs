// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stand-in for catalog tools without a real implementation: waits, then
// returns a one-page PDF saying so.

use std::time::Duration;

use pdfmaster_core::error::Result;
use pdfmaster_core::{ToolId, ToolOptions, ToolkitConfig};
use pdfmaster_document::PdfWriter;
use tracing::{instrument, warn};

use super::{Artifact, Notice, Operation, OperationInput, ProcessingResult};

pub struct SimulatedConversion {
    tool: ToolId,
    delay: Duration,
    writer: PdfWriter,
}

impl SimulatedConversion {
    pub fn new(tool: ToolId, config: &ToolkitConfig) -> Self {
        Self {
            tool,
            delay: Duration::from_millis(config.simulated_delay_ms),
            writer: PdfWriter::new(config.paper_size),
        }
    }

    /// Download name: the tool id with dashes turned into underscores.
    pub fn filename(&self) -> String {
        format!("{}.pdf", self.tool.as_str().replace('-', "_"))
    }
}

impl Operation for SimulatedConversion {
    #[instrument(skip_all, fields(tool = %self.tool))]
    fn execute(&self, _input: &OperationInput, _options: &ToolOptions) -> Result<ProcessingResult> {
        // Runs on the blocking pool, so a plain sleep is fine here.
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let name = self.tool.descriptor().name;
        let bytes = self
            .writer
            .create_placeholder(&format!("This is a simulated result for {name}."))?;
        warn!(tool = %self.tool, "Simulated result produced");

        Ok(ProcessingResult {
            artifact: Artifact::pdf(bytes, self.filename()),
            notices: vec![Notice::Simulated { tool: name }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfmaster_document::PdfReader;

    fn instant() -> ToolkitConfig {
        ToolkitConfig {
            simulated_delay_ms: 0,
            ..ToolkitConfig::default()
        }
    }

    #[test]
    fn placeholder_is_labeled() {
        let op = SimulatedConversion::new(ToolId::WordToPdf, &instant());
        let result = op
            .execute(&OperationInput::Files(Vec::new()), &ToolOptions::None)
            .expect("simulate");

        assert_eq!(result.artifact.filename, "word_to_pdf.pdf");
        assert_eq!(result.notices, vec![Notice::Simulated { tool: "Word to PDF" }]);
        let reader = PdfReader::from_bytes(&result.artifact.bytes).expect("valid pdf");
        assert_eq!(reader.page_count(), 1);
    }

    #[test]
    fn filenames_replace_every_dash() {
        let op = SimulatedConversion::new(ToolId::PdfToPowerpoint, &instant());
        assert_eq!(op.filename(), "pdf_to_powerpoint.pdf");
    }
}
