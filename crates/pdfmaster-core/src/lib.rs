// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDFMaster — Core types, tool catalog, options and error definitions shared
// across all crates.

pub mod catalog;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod options;
pub mod types;

pub use catalog::{CATALOG, ToolDescriptor, ToolId};
pub use config::ToolkitConfig;
pub use error::PdfMasterError;
pub use options::{OptionMap, PageSelection, PageSpan, Rotation, ToolOptions};
pub use types::*;
