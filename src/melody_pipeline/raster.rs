//! Raster image reading module
//!
//! This module decodes image files into plain 8-bit RGB grids for fingerprinting.

mod reader;
mod image_crate_reader;
pub mod types;

pub use reader::RasterImageReader;
pub use image_crate_reader::ImageCrateReader;
pub use types::RasterImage;
