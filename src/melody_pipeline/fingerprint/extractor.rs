use tracing::trace;
use crate::melody_pipeline::common::error::{MelodyError, Result};
use crate::melody_pipeline::fingerprint::types::{Histogram, ImageFingerprint};
use crate::melody_pipeline::raster::RasterImage;

/// Saturation has no agreed metric yet.
pub const SATURATION_UNDEFINED: f64 = 0.0;

const UNIFORM_PROPORTION: [f64; 3] = [1.0 / 3.0; 3];

/// ITU-R 601-2 luma in 16.16 fixed point, rounded to nearest.
pub fn luma([r, g, b]: [u8; 3]) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Computes the fingerprint of one image.
///
/// Fails only for an image without pixels. A fully black image gets an even
/// colour split instead of dividing by zero.
pub fn extract(image: &RasterImage) -> Result<ImageFingerprint> {
    let pixel_count = image.pixel_count();
    if pixel_count == 0 {
        return Err(MelodyError::InvalidDimensions(image.width(), image.height()));
    }

    let mut grey = Histogram::default();
    let mut channels: [Histogram; 3] = Default::default();
    for pixel in image.pixels() {
        grey.add(luma(pixel));
        for (histogram, &sample) in channels.iter_mut().zip(pixel.iter()) {
            histogram.add(sample);
        }
    }

    let intensities = channels.each_ref().map(|h| h.normalized_mean(pixel_count));
    let total: f64 = intensities.iter().sum();
    let colour_proportion = if total > 0.0 {
        intensities.map(|i| i / total)
    } else {
        trace!("No channel energy, using uniform colour proportion");
        UNIFORM_PROPORTION
    };

    Ok(ImageFingerprint {
        pixel_count,
        brightness: grey.normalized_mean(pixel_count),
        contrast: grey.mid_deviation(pixel_count),
        saturation: SATURATION_UNDEFINED,
        colour_proportion,
    })
}
