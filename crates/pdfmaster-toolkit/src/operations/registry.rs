// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tool identifier → strategy table.

use std::collections::HashMap;
use std::sync::Arc;

use pdfmaster_core::{CATALOG, ToolId, ToolkitConfig};
use tracing::debug;

use super::{
    DeletePages, ExtractImages, FlattenForms, ImagesToPdf, MergeDocuments, Operation,
    PdfAConversion, ProtectPlaceholder, RotatePages, SimulatedConversion, SplitDocument, TextToPdf,
};

/// Maps each tool to the strategy that executes it.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    strategies: HashMap<ToolId, Arc<dyn Operation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every implemented tool, plus simulated placeholders for the rest of
    /// the catalog when `config.simulate_unsupported` is set.
    pub fn standard(config: &ToolkitConfig) -> Self {
        let mut registry = Self::new();
        registry.register(ToolId::TextToPdf, TextToPdf::new(config));
        registry.register(ToolId::JpgToPdf, ImagesToPdf::new(config));
        registry.register(ToolId::MergePdf, MergeDocuments);
        registry.register(ToolId::SplitPdf, SplitDocument);
        registry.register(ToolId::DeletePdfPages, DeletePages);
        registry.register(ToolId::RotatePdf, RotatePages);
        registry.register(ToolId::FlattenPdf, FlattenForms);
        registry.register(ToolId::ProtectPdf, ProtectPlaceholder::new(config));
        registry.register(ToolId::ExtractPdfImages, ExtractImages);
        registry.register(ToolId::PdfToPdfa, PdfAConversion::new(config));

        if config.simulate_unsupported {
            for descriptor in &CATALOG {
                if !registry.contains(descriptor.id) {
                    let simulated = SimulatedConversion::new(descriptor.id, config);
                    registry.register(descriptor.id, simulated);
                }
            }
        }

        debug!(strategies = registry.len(), "Operation registry built");
        registry
    }

    /// Install (or replace) the strategy for `tool`.
    pub fn register(&mut self, tool: ToolId, operation: impl Operation + 'static) {
        self.strategies.insert(tool, Arc::new(operation));
    }

    pub fn get(&self, tool: ToolId) -> Option<Arc<dyn Operation>> {
        self.strategies.get(&tool).cloned()
    }

    pub fn contains(&self, tool: ToolId) -> bool {
        self.strategies.contains_key(&tool)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
