//! Image fingerprinting module
//!
//! Reduces a decoded image to a handful of normalized statistics that drive the melody.

mod extractor;
pub mod types;

pub use extractor::{extract, luma};
pub use types::{Histogram, ImageFingerprint};
