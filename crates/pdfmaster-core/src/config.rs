// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Toolkit configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

/// Settings shared by the dispatcher, the PDF writer and delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Paper size for synthesized documents.
    pub paper_size: crate::PaperSize,
    /// Left/right/bottom margin for text layout, in millimetres.
    pub text_margin_mm: f32,
    /// Distance from the top edge to the first text baseline, in millimetres.
    pub text_top_mm: f32,
    pub font_size_pt: f32,
    pub line_height_pt: f32,
    /// Producer string written by protect and PDF/A tagging.
    pub producer: String,
    /// Creator string written by protect and PDF/A tagging.
    pub creator: String,
    /// Artificial processing time for simulated conversions.
    pub simulated_delay_ms: u64,
    /// Produce a labeled placeholder for catalog tools without a real
    /// implementation. When false those tools are rejected.
    pub simulate_unsupported: bool,
    /// Directory delivered artifacts are written to.
    pub output_dir: PathBuf,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            paper_size: crate::PaperSize::A4,
            text_margin_mm: 15.0,
            text_top_mm: 20.0,
            font_size_pt: 11.0,
            line_height_pt: 14.0,
            producer: "PDFMaster".to_string(),
            creator: "PDFMaster".to_string(),
            simulated_delay_ms: 1500,
            simulate_unsupported: true,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ToolkitConfig {
    /// Load settings from a JSON file. A missing file yields the defaults; a
    /// file that exists but does not parse is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Write settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfMasterError;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ToolkitConfig::load(dir.path().join("absent.json")).expect("defaults");
        assert_eq!(config, ToolkitConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pdfmaster.json");
        std::fs::write(&path, r#"{ "simulated_delay_ms": 0, "producer": "Acme" }"#)
            .expect("write");
        let config = ToolkitConfig::load(&path).expect("load");
        assert_eq!(config.simulated_delay_ms, 0);
        assert_eq!(config.producer, "Acme");
        assert_eq!(config.creator, "PDFMaster");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            ToolkitConfig::load(&path),
            Err(PdfMasterError::Serialization(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pdfmaster.json");
        let config = ToolkitConfig {
            simulate_unsupported: false,
            ..ToolkitConfig::default()
        };
        config.save(&path).expect("save");
        assert_eq!(ToolkitConfig::load(&path).expect("load"), config);
    }
}
