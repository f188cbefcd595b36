//! QR decoding on top of the rqrr detection pipeline.

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::QrError;

/// A successfully decoded QR symbol.
#[derive(Debug, Clone)]
pub struct DecodedSymbol {
    /// Verbatim text payload of the symbol.
    pub text: String,

    /// Corner coordinates of the located symbol in original-image pixels.
    pub corners: [(f32, f32); 4],
}

/// Decoder that locates and decodes the first QR symbol in an image.
///
/// Multi-symbol images are not supported; the first detected grid wins.
#[derive(Debug, Clone)]
pub struct QrDecoder {
    max_image_size: u32,
}

impl QrDecoder {
    /// Create a decoder with the default size cap.
    pub fn new() -> Self {
        Self {
            max_image_size: 2048,
        }
    }

    /// Cap the longer image side before detection; larger inputs are
    /// downscaled. Corner coordinates are reported in original-image pixels
    /// regardless.
    pub fn with_max_image_size(mut self, size: u32) -> Self {
        self.max_image_size = size.max(1);
        self
    }

    /// Locate and decode the first QR symbol.
    pub fn decode(&self, image: &DynamicImage) -> Result<DecodedSymbol, QrError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(QrError::InvalidImage(format!(
                "zero-sized image ({width}x{height})"
            )));
        }

        let longer = width.max(height);
        let (luma, scale) = if longer > self.max_image_size {
            let resized = image.resize(
                self.max_image_size,
                self.max_image_size,
                FilterType::Triangle,
            );
            let scale = longer as f32 / resized.width().max(resized.height()) as f32;
            debug!(
                from = longer,
                to = self.max_image_size,
                "downscaling image before QR detection"
            );
            (resized.to_luma8(), scale)
        } else {
            (image.to_luma8(), 1.0)
        };

        let (lw, lh) = (luma.width() as usize, luma.height() as usize);
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(lw, lh, |x, y| {
            luma.get_pixel(x as u32, y as u32).0[0]
        });
        let grids = prepared.detect_grids();
        let Some(grid) = grids.into_iter().next() else {
            return Err(QrError::NotFound);
        };

        let corners = std::array::from_fn(|i| {
            let p = &grid.bounds[i];
            (p.x as f32 * scale, p.y as f32 * scale)
        });

        let (meta, text) = grid
            .decode()
            .map_err(|e| QrError::Decode(e.to_string()))?;

        debug!(
            version = meta.version.0,
            ecc_level = meta.ecc_level,
            payload_len = text.len(),
            "decoded QR symbol"
        );

        Ok(DecodedSymbol { text, corners })
    }
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}
