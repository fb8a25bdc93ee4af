//! Raster reader backed by the `image` crate.
//!
//! Any format the `image` crate can guess from the file header (PNG, JPEG, GIF,
//! BMP, TIFF, WebP, ...) is accepted. Alpha is dropped and higher bit depths are
//! scaled down to 8 bits per channel.

use tracing::debug;
use crate::melody_pipeline::common::error::{MelodyError, Result};
use crate::melody_pipeline::raster::reader::RasterImageReader;
use crate::melody_pipeline::raster::types::RasterImage;

pub struct ImageCrateReader;

impl RasterImageReader for ImageCrateReader {
    fn read_raster(&self, data: &[u8]) -> Result<RasterImage> {
        debug!("Decoding image, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| MelodyError::DecodeError(e.to_string()))?;
        let rgb = decoded.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);

        debug!("Decoded image: {}x{}", width, height);

        RasterImage::new(width, height, rgb.into_raw())
    }
}
