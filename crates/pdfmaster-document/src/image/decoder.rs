// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster image decoding. Images are decoded once to learn their intrinsic
// pixel dimensions and converted to packed RGB8 for embedding. Baseline and
// progressive JPEGs also keep their original bytes so the writer can embed
// the DCT stream as-is.

use ::image::{DynamicImage, ImageFormat};
use pdfmaster_core::error::{PdfMasterError, Result};
use tracing::{debug, instrument};

/// A decoded image as packed 8-bit RGB rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 3` bytes, row-major, top row first. Transparent
    /// pixels are composited onto white.
    pub rgb: Vec<u8>,
    /// Present when the source is a JPEG a PDF reader can decode directly.
    pub jpeg: Option<JpegSource>,
}

/// Original JPEG bytes, embeddable with `/Filter /DCTDecode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegSource {
    pub data: Vec<u8>,
    /// 1 (grayscale) or 3 (YCbCr/RGB).
    pub components: u8,
}

impl DecodedImage {
    /// Decode an encoded image (JPEG, PNG, GIF, BMP, WebP, TIFF).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = ::image::load_from_memory(data).map_err(|err| {
            PdfMasterError::ImageError(format!("failed to decode image: {}", err))
        })?;
        if img.width() == 0 || img.height() == 0 {
            return Err(PdfMasterError::ImageError(
                "image has no pixels".to_string(),
            ));
        }

        let jpeg = match ::image::guess_format(data) {
            Ok(ImageFormat::Jpeg) => jpeg_components(data).map(|components| JpegSource {
                data: data.to_vec(),
                components,
            }),
            _ => None,
        };

        let (width, height) = (img.width(), img.height());
        let rgb = flatten_onto_white(img);
        debug!(width, height, passthrough = jpeg.is_some(), "Image decoded from bytes");
        Ok(Self {
            width,
            height,
            rgb,
            jpeg,
        })
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Packed RGB8, blending any alpha channel against a white page.
fn flatten_onto_white(img: DynamicImage) -> Vec<u8> {
    if !img.color().has_alpha() {
        return img.into_rgb8().into_raw();
    }
    let rgba = img.into_rgba8();
    let mut rgb = Vec::with_capacity(rgba.width() as usize * rgba.height() as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        for channel in [r, g, b] {
            let blended = (u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}

/// Component count of an 8-bit baseline or progressive JPEG with one or three
/// components. Anything else (CMYK, 12-bit, arithmetic, lossless) is `None`.
fn jpeg_components(data: &[u8]) -> Option<u8> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            pos += 2;
            continue;
        }
        let length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        match marker {
            0xC0..=0xC2 => {
                // precision, height (2), width (2), component count
                let precision = *data.get(pos + 4)?;
                let components = *data.get(pos + 9)?;
                return (precision == 8 && matches!(components, 1 | 3)).then_some(components);
            }
            0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => return None,
            0xD9 | 0xDA => return None,
            _ => pos += 2 + length,
        }
    }
    None
}
