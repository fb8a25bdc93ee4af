//! Raster image data types

use crate::melody_pipeline::common::error::{MelodyError, Result};

/// A decoded image as an 8-bit RGB grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    /// RGB pixel data interleaved [R, G, B, R, G, B, ...]
    data: Vec<u8>,
}

impl RasterImage {
    /// Wraps an interleaved RGB buffer, rejecting a length that does not match the dimensions.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .ok_or(MelodyError::InvalidDimensions(width, height))?;
        if data.len() != expected {
            return Err(MelodyError::InvalidDimensions(width, height));
        }
        Ok(Self { width, height, data })
    }

    /// An image where every pixel has the same colour.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let data = rgb.repeat(width * height);
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
