//! Fingerprint value types

/// Summary statistics of one image. Every ratio is normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFingerprint {
    /// Number of pixels the statistics were computed over (always > 0)
    pub pixel_count: usize,
    /// Mean luma
    pub brightness: f64,
    /// Mean absolute deviation of luma from mid-grey, scaled so pure black or white is 1.0
    pub contrast: f64,
    /// Reserved for a colourfulness metric; no metric is defined yet so this is always 0.0
    pub saturation: f64,
    /// Share of the red, green and blue channels in the total channel brightness.
    /// Sums to 1.0; an image with no channel energy at all gets an even split.
    pub colour_proportion: [f64; 3],
}

/// 256-bucket histogram of 8-bit samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; 256],
}

impl Default for Histogram {
    fn default() -> Self {
        Self { bins: [0; 256] }
    }
}

impl Histogram {
    pub fn from_samples(samples: impl IntoIterator<Item = u8>) -> Self {
        let mut histogram = Self::default();
        for sample in samples {
            histogram.add(sample);
        }
        histogram
    }

    pub fn add(&mut self, sample: u8) {
        self.bins[sample as usize] += 1;
    }

    pub fn bins(&self) -> &[u64; 256] {
        &self.bins
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Mean sample value on a 0..=1 scale.
    pub fn normalized_mean(&self, pixel_count: usize) -> f64 {
        self.weighted_sum(|i| i / 255.0) / pixel_count as f64
    }

    /// Mean absolute distance from 127.5 on a 0..=1 scale.
    pub fn mid_deviation(&self, pixel_count: usize) -> f64 {
        self.weighted_sum(|i| (i - 127.5).abs() / 127.5) / pixel_count as f64
    }

    fn weighted_sum(&self, weight: impl Fn(f64) -> f64) -> f64 {
        self.bins
            .iter()
            .enumerate()
            .map(|(i, &count)| count as f64 * weight(i as f64))
            .sum()
    }
}
