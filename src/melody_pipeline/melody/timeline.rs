use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::melody_pipeline::common::error::Result;
use crate::melody_pipeline::config::{validate_rates, MelodyConfig};
use crate::melody_pipeline::fingerprint::{extract, ImageFingerprint};
use crate::melody_pipeline::melody::mapper::FrameMapper;
use crate::melody_pipeline::melody::types::{MusicalEvent, Score};
use crate::melody_pipeline::raster::RasterImage;

/// Lays one note per frame on a beat grid derived from the frame rate.
pub struct TimelineAssembler<'m, M: FrameMapper + ?Sized> {
    mapper: &'m M,
    frames_per_second: f64,
    frames_per_beat: f64,
    parallel: bool,
}

impl<'m, M: FrameMapper + ?Sized> TimelineAssembler<'m, M> {
    /// Both rates must be positive and finite; `assemble` rejects anything else
    /// with `InvalidConfig` before touching a frame.
    pub fn new(mapper: &'m M, frames_per_second: f64, frames_per_beat: f64) -> Self {
        Self {
            mapper,
            frames_per_second,
            frames_per_beat,
            parallel: false,
        }
    }

    pub fn from_config(mapper: &'m M, config: &MelodyConfig) -> Self {
        Self::new(mapper, config.frames_per_second, config.frames_per_beat)
            .parallel(config.parallel)
    }

    pub fn parallel(mut self, enable: bool) -> Self {
        self.parallel = enable;
        self
    }

    pub fn bpm(&self) -> f64 {
        (self.frames_per_second / self.frames_per_beat) * 60.0
    }

    /// Fingerprints every image and builds the score, in input order.
    #[instrument(skip_all, fields(frames = images.len(), parallel = self.parallel))]
    pub fn assemble(&self, images: &[RasterImage]) -> Result<Score> {
        validate_rates(self.frames_per_second, self.frames_per_beat)?;
        let fingerprints = if self.parallel {
            images.par_iter().map(extract).collect::<Result<Vec<_>>>()?
        } else {
            images.iter().map(extract).collect::<Result<Vec<_>>>()?
        };
        self.assemble_fingerprints(&fingerprints)
    }

    pub fn assemble_fingerprints(&self, fingerprints: &[ImageFingerprint]) -> Result<Score> {
        validate_rates(self.frames_per_second, self.frames_per_beat)?;
        let mut score = Score::new(self.bpm());
        info!("BPM of {}", score.tempo_bpm());

        for (frame, fingerprint) in fingerprints.iter().enumerate() {
            let beat = frame as f64 / self.frames_per_beat;
            debug!(
                frame,
                beat,
                brightness = fingerprint.brightness,
                contrast = fingerprint.contrast,
                saturation = fingerprint.saturation,
                colour_proportion = ?fingerprint.colour_proportion,
                "Frame statistics"
            );
            let event = self.mapper.map_frame(frame, fingerprint);
            score.push(MusicalEvent {
                start_beat: beat,
                ..event
            });
        }

        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melody_pipeline::common::error::MelodyError;
    use crate::melody_pipeline::melody::mapper::{LuminanceMapper, TuneMapper};

    fn frames(count: usize) -> Vec<RasterImage> {
        (0..count)
            .map(|i| RasterImage::filled(4, 4, [(i * 40) as u8, 90, 200]))
            .collect()
    }

    #[test]
    fn test_four_frame_scenario() {
        let mapper = TuneMapper::default();
        let score = TimelineAssembler::new(&mapper, 12.0, 9.0)
            .assemble(&frames(4))
            .unwrap();

        assert_eq!(score.tempo_bpm(), 80.0);
        let pitches: Vec<u8> = score.events().iter().map(|e| e.pitch).collect();
        assert_eq!(pitches, vec![60, 67, 65, 59]);
        let beats: Vec<f64> = score.events().iter().map(|e| e.start_beat).collect();
        assert_eq!(beats, vec![0.0, 1.0 / 9.0, 2.0 / 9.0, 3.0 / 9.0]);
    }

    #[test]
    fn test_one_event_per_frame_in_order() {
        let mapper = TuneMapper::default();
        let score = TimelineAssembler::new(&mapper, 10.0, 4.0)
            .assemble(&frames(11))
            .unwrap();

        assert_eq!(score.events().len(), 11);
        assert!(score.events().windows(2).all(|w| w[0].start_beat <= w[1].start_beat));
        for (i, event) in score.events().iter().enumerate() {
            assert_eq!(event.start_beat, i as f64 / 4.0);
        }
        assert_eq!(score.tempo_bpm(), 150.0);
    }

    #[test]
    fn test_empty_input_gives_silent_score() {
        let mapper = TuneMapper::default();
        let score = TimelineAssembler::new(&mapper, 12.0, 9.0).assemble(&[]).unwrap();

        assert_eq!(score.tempo_bpm(), 80.0);
        assert!(score.is_empty());
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let mapper = LuminanceMapper;
        let images = frames(6);
        let assembler = TimelineAssembler::new(&mapper, 12.0, 9.0);

        assert_eq!(assembler.assemble(&images).unwrap(), assembler.assemble(&images).unwrap());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mapper = LuminanceMapper;
        let images = frames(32);

        let sequential = TimelineAssembler::new(&mapper, 12.0, 9.0).assemble(&images).unwrap();
        let parallel = TimelineAssembler::new(&mapper, 12.0, 9.0)
            .parallel(true)
            .assemble(&images)
            .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_rejects_non_positive_rates() {
        let mapper = TuneMapper::default();
        for (fps, fpb) in [(12.0, 0.0), (12.0, -9.0), (12.0, f64::NAN), (0.0, 9.0), (f64::INFINITY, 9.0)] {
            let result = TimelineAssembler::new(&mapper, fps, fpb).assemble(&frames(2));
            assert!(
                matches!(result, Err(MelodyError::InvalidConfig(_))),
                "fps={fps} fpb={fpb} should be rejected"
            );
        }

        let result = TimelineAssembler::new(&mapper, 12.0, 0.0).assemble_fingerprints(&[]);
        assert!(matches!(result, Err(MelodyError::InvalidConfig(_))));
    }

    #[test]
    fn test_works_through_trait_object() {
        let mapper: Box<dyn FrameMapper> = Box::new(TuneMapper::default());
        let score = TimelineAssembler::new(mapper.as_ref(), 12.0, 9.0)
            .assemble(&frames(2))
            .unwrap();
        assert_eq!(score.events().len(), 2);
    }
}
