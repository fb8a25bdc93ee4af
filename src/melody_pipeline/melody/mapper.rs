//! Frame-to-note mappings.
//!
//! A mapper is a pure function of the frame index and the fingerprint. The
//! returned event's `start_beat` is a placeholder: the timeline assembler
//! places every note on the beat derived from its frame index.

use crate::melody_pipeline::common::error::{MelodyError, Result};
use crate::melody_pipeline::fingerprint::ImageFingerprint;
use crate::melody_pipeline::melody::note::{note_to_pitch, REFERENCE_TUNE};
use crate::melody_pipeline::melody::types::MusicalEvent;

pub trait FrameMapper: Sync {
    fn map_frame(&self, frame_index: usize, fingerprint: &ImageFingerprint) -> MusicalEvent;
}

/// Plays a fixed tune on a loop, one note per frame, ignoring the image.
#[derive(Debug, Clone)]
pub struct TuneMapper {
    pitches: Vec<u8>,
    duration_beats: f64,
    velocity: u8,
}

impl TuneMapper {
    pub const DEFAULT_DURATION_BEATS: f64 = 1.0;
    pub const DEFAULT_VELOCITY: u8 = 100;

    /// Resolves every note name up front so a bad name fails before any frame is mapped.
    pub fn new<S: AsRef<str>>(tune: &[S]) -> Result<Self> {
        if tune.is_empty() {
            return Err(MelodyError::InvalidConfig("tune must contain at least one note".into()));
        }
        let pitches = tune
            .iter()
            .map(|name| note_to_pitch(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            pitches,
            duration_beats: Self::DEFAULT_DURATION_BEATS,
            velocity: Self::DEFAULT_VELOCITY,
        })
    }

    pub fn pitches(&self) -> &[u8] {
        &self.pitches
    }
}

impl Default for TuneMapper {
    /// Loops `REFERENCE_TUNE`.
    fn default() -> Self {
        Self {
            pitches: REFERENCE_TUNE
                .iter()
                .filter_map(|name| note_to_pitch(name).ok())
                .collect(),
            duration_beats: Self::DEFAULT_DURATION_BEATS,
            velocity: Self::DEFAULT_VELOCITY,
        }
    }
}

impl FrameMapper for TuneMapper {
    fn map_frame(&self, frame_index: usize, _fingerprint: &ImageFingerprint) -> MusicalEvent {
        let pitch = self.pitches[frame_index % self.pitches.len()];
        MusicalEvent::note(pitch, 0.0, self.duration_beats, self.velocity)
    }
}

/// Derives each note from the image itself.
///
/// | input             | range  | output   | range                |
/// |-------------------|--------|----------|----------------------|
/// | `brightness`      | 0..=1  | pitch    | 48 (C3) ..= 84 (C6)  |
/// | `contrast`        | 0..=1  | velocity | 40 ..= 127           |
///
/// Both outputs are linear in their input and rounded to the nearest integer.
/// Every note lasts one beat.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuminanceMapper;

impl LuminanceMapper {
    pub const LOWEST_PITCH: u8 = 48;
    pub const HIGHEST_PITCH: u8 = 84;
    pub const SOFTEST_VELOCITY: u8 = 40;
    pub const LOUDEST_VELOCITY: u8 = 127;

    fn scale(value: f64, low: u8, high: u8) -> u8 {
        let span = (high - low) as f64;
        low + (value.clamp(0.0, 1.0) * span).round() as u8
    }
}

impl FrameMapper for LuminanceMapper {
    fn map_frame(&self, _frame_index: usize, fingerprint: &ImageFingerprint) -> MusicalEvent {
        let pitch = Self::scale(fingerprint.brightness, Self::LOWEST_PITCH, Self::HIGHEST_PITCH);
        let velocity = Self::scale(
            fingerprint.contrast,
            Self::SOFTEST_VELOCITY,
            Self::LOUDEST_VELOCITY,
        );
        MusicalEvent::note(pitch, 0.0, 1.0, velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(brightness: f64, contrast: f64) -> ImageFingerprint {
        ImageFingerprint {
            pixel_count: 1,
            brightness,
            contrast,
            saturation: 0.0,
            colour_proportion: [1.0 / 3.0; 3],
        }
    }

    #[test]
    fn test_default_tune_matches_reference_names() {
        let resolved = TuneMapper::new(&REFERENCE_TUNE).unwrap();
        assert_eq!(resolved.pitches(), TuneMapper::default().pitches());
        assert_eq!(TuneMapper::default().pitches(), &[60u8, 67, 65, 59]);
    }

    #[test]
    fn test_tune_cycles_and_ignores_image() {
        let mapper = TuneMapper::default();
        let dark = fingerprint(0.0, 0.0);
        let bright = fingerprint(1.0, 1.0);

        let pitches: Vec<u8> = (0..6).map(|i| mapper.map_frame(i, &dark).pitch).collect();
        assert_eq!(pitches, vec![60, 67, 65, 59, 60, 67]);
        assert_eq!(mapper.map_frame(3, &dark), mapper.map_frame(3, &bright));

        let event = mapper.map_frame(0, &dark);
        assert_eq!(event.duration_beats, 1.0);
        assert_eq!(event.velocity, 100);
        assert_eq!((event.track, event.channel), (0, 0));
    }

    #[test]
    fn test_tune_rejects_bad_note() {
        let result = TuneMapper::new(&["C4", "X9"]);
        assert!(matches!(result, Err(MelodyError::InvalidNoteName(name)) if name == "X9"));
    }

    #[test]
    fn test_tune_rejects_empty() {
        let empty: [&str; 0] = [];
        assert!(matches!(TuneMapper::new(&empty), Err(MelodyError::InvalidConfig(_))));
    }

    #[test]
    fn test_luminance_ranges() {
        let mapper = LuminanceMapper;

        let low = mapper.map_frame(0, &fingerprint(0.0, 0.0));
        assert_eq!((low.pitch, low.velocity), (48, 40));

        let high = mapper.map_frame(0, &fingerprint(1.0, 1.0));
        assert_eq!((high.pitch, high.velocity), (84, 127));

        let mid = mapper.map_frame(0, &fingerprint(0.5, 0.5));
        assert_eq!(mid.pitch, 66);
    }
}
