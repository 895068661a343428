// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding raster images for page composition.

pub mod decoder;

pub use decoder::{DecodedImage, JpegSource};
