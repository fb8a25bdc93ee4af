//! Melody generation configuration types

use std::path::PathBuf;

use crate::melody_pipeline::common::error::{MelodyError, Result};

/// What to do with an input file that cannot be decoded as an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Stop the run on the first unreadable file
    #[default]
    Abort,
    /// Log a warning and leave the file out; later frames move up to fill the gap
    Skip,
}

/// Configuration for image sequence to MIDI conversion
#[derive(Debug, Clone)]
pub struct MelodyConfig {
    /// Frame rate of the image sequence
    pub frames_per_second: f64,
    /// How many frames make up one beat
    pub frames_per_beat: f64,
    /// Where `convert_dir` writes the MIDI file
    pub output_path: PathBuf,
    /// MIDI timing resolution (ticks per quarter note)
    pub ticks_per_beat: u16,
    pub decode_policy: DecodePolicy,
    /// Extract fingerprints on the rayon thread pool
    pub parallel: bool,
}

impl Default for MelodyConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 12.0,
            frames_per_beat: 9.0,
            output_path: PathBuf::from("output.mid"),
            ticks_per_beat: 480,
            decode_policy: DecodePolicy::Abort,
            parallel: false,
        }
    }
}

impl MelodyConfig {
    pub fn builder() -> MelodyConfigBuilder {
        MelodyConfigBuilder::default()
    }

    /// Tempo implied by the frame and beat rates.
    pub fn bpm(&self) -> f64 {
        (self.frames_per_second / self.frames_per_beat) * 60.0
    }

    pub fn validate(&self) -> Result<()> {
        validate_rates(self.frames_per_second, self.frames_per_beat)?;
        if self.ticks_per_beat == 0 || self.ticks_per_beat > 0x7FFF {
            return Err(MelodyError::InvalidConfig(format!(
                "ticks_per_beat must be in 1..=32767, got {}",
                self.ticks_per_beat
            )));
        }
        Ok(())
    }
}

/// Checks that both frame rates are positive and finite.
pub fn validate_rates(frames_per_second: f64, frames_per_beat: f64) -> Result<()> {
    for (name, value) in [
        ("frames_per_second", frames_per_second),
        ("frames_per_beat", frames_per_beat),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(MelodyError::InvalidConfig(format!(
                "{name} must be a positive number, got {value}"
            )));
        }
    }
    Ok(())
}

/// Builder for MelodyConfig
#[derive(Default)]
pub struct MelodyConfigBuilder {
    frames_per_second: Option<f64>,
    frames_per_beat: Option<f64>,
    output_path: Option<PathBuf>,
    ticks_per_beat: Option<u16>,
    decode_policy: Option<DecodePolicy>,
    parallel: Option<bool>,
}

impl MelodyConfigBuilder {
    pub fn frames_per_second(mut self, fps: f64) -> Self {
        self.frames_per_second = Some(fps);
        self
    }

    pub fn frames_per_beat(mut self, fpb: f64) -> Self {
        self.frames_per_beat = Some(fpb);
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn ticks_per_beat(mut self, ticks: u16) -> Self {
        self.ticks_per_beat = Some(ticks);
        self
    }

    pub fn decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = Some(policy);
        self
    }

    pub fn parallel(mut self, enable: bool) -> Self {
        self.parallel = Some(enable);
        self
    }

    pub fn build(self) -> MelodyConfig {
        let default = MelodyConfig::default();
        MelodyConfig {
            frames_per_second: self.frames_per_second.unwrap_or(default.frames_per_second),
            frames_per_beat: self.frames_per_beat.unwrap_or(default.frames_per_beat),
            output_path: self.output_path.unwrap_or(default.output_path),
            ticks_per_beat: self.ticks_per_beat.unwrap_or(default.ticks_per_beat),
            decode_policy: self.decode_policy.unwrap_or(default.decode_policy),
            parallel: self.parallel.unwrap_or(default.parallel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MelodyConfig::default();
        assert_eq!(config.frames_per_second, 12.0);
        assert_eq!(config.frames_per_beat, 9.0);
        assert_eq!(config.output_path, PathBuf::from("output.mid"));
        assert_eq!(config.decode_policy, DecodePolicy::Abort);
        assert_eq!(config.bpm(), 80.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = MelodyConfig::builder()
            .frames_per_second(24.0)
            .frames_per_beat(12.0)
            .output_path("song.mid")
            .decode_policy(DecodePolicy::Skip)
            .parallel(true)
            .build();

        assert_eq!(config.bpm(), 120.0);
        assert_eq!(config.output_path, PathBuf::from("song.mid"));
        assert_eq!(config.decode_policy, DecodePolicy::Skip);
        assert!(config.parallel);
        assert_eq!(config.ticks_per_beat, 480);
    }

    #[test]
    fn test_validate_rejects_bad_rates() {
        for config in [
            MelodyConfig::builder().frames_per_second(0.0).build(),
            MelodyConfig::builder().frames_per_beat(-1.0).build(),
            MelodyConfig::builder().frames_per_beat(f64::NAN).build(),
            MelodyConfig::builder().ticks_per_beat(0).build(),
        ] {
            assert!(matches!(config.validate(), Err(MelodyError::InvalidConfig(_))));
        }
    }
}
