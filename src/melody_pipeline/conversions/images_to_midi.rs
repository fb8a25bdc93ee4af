use tracing::{info, instrument, warn};
use std::io::Write;
use std::path::Path;

use crate::melody_pipeline::{
    common::error::{MelodyError, Result},
    common::timing::PipelineTimings,
    config::{DecodePolicy, MelodyConfig},
    conversions::frame_source::list_frames,
    melody::{FrameMapper, Score, TimelineAssembler, TuneMapper},
    midi::{ScoreWriter, StandardMidiWriter},
    raster::{ImageCrateReader, RasterImage, RasterImageReader},
};

pub struct ImagesToMidiPipeline<R: RasterImageReader, W: ScoreWriter, M: FrameMapper> {
    reader: R,
    writer: W,
    mapper: M,
    config: MelodyConfig,
}

impl ImagesToMidiPipeline<ImageCrateReader, StandardMidiWriter, TuneMapper> {
    pub fn new(config: MelodyConfig) -> Result<Self> {
        Self::with_custom(ImageCrateReader, StandardMidiWriter, TuneMapper::default(), config)
    }
}

impl<R: RasterImageReader, W: ScoreWriter, M: FrameMapper> ImagesToMidiPipeline<R, W, M> {
    pub fn with_custom(reader: R, writer: W, mapper: M, config: MelodyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader,
            writer,
            mapper,
            config,
        })
    }

    /// Replaces the mapper, keeping reader, writer and configuration.
    pub fn with_mapper<N: FrameMapper>(self, mapper: N) -> ImagesToMidiPipeline<R, W, N> {
        ImagesToMidiPipeline {
            reader: self.reader,
            writer: self.writer,
            mapper,
            config: self.config,
        }
    }

    fn decode_frame(&self, label: &str, data: Result<Vec<u8>>) -> Result<Option<RasterImage>> {
        info!("Processing {}", label);
        match data.and_then(|bytes| self.reader.read_raster(&bytes)) {
            Ok(image) => Ok(Some(image)),
            Err(e @ (MelodyError::DecodeError(_) | MelodyError::InputReadError(_)))
                if self.config.decode_policy == DecodePolicy::Skip =>
            {
                warn!(frame = label, error = %e, "Skipping unreadable frame");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Fingerprints the images and maps them to a score. Nothing is written.
    pub fn assemble(&self, images: &[RasterImage]) -> Result<Score> {
        TimelineAssembler::from_config(&self.mapper, &self.config).assemble(images)
    }

    /// Decodes one encoded image per frame, in order, and writes the MIDI file to `output`.
    #[instrument(skip_all)]
    pub fn convert<I, B>(&self, frames: I, output: &mut dyn Write) -> Result<Score>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let images = {
            let _span = tracing::info_span!("decode_frames").entered();
            let mut images = Vec::new();
            for (index, data) in frames.into_iter().enumerate() {
                let label = format!("frame {index}");
                images.extend(self.decode_frame(&label, Ok(data.as_ref().to_vec()))?);
            }
            images
        };

        let score = {
            let _span = tracing::info_span!("assemble", frames = images.len()).entered();
            self.assemble(&images)?
        };

        {
            let _span = tracing::info_span!("encode_midi").entered();
            self.writer.write_score(&score, output, &self.config)?;
        }

        info!(notes = score.events().len(), bpm = score.tempo_bpm(), "Conversion complete");
        Ok(score)
    }

    /// Converts image files in the given order and writes the MIDI file to `output_path`.
    #[instrument(skip_all, fields(frames = paths.len()))]
    pub fn convert_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        paths: &[P],
        output_path: Q,
    ) -> Result<Score> {
        self.convert_files_with_timings(paths, output_path)
            .map(|(score, _)| score)
    }

    pub fn convert_files_with_timings<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        paths: &[P],
        output_path: Q,
    ) -> Result<(Score, PipelineTimings)> {
        let mut timings = PipelineTimings::new();
        let output_path = output_path.as_ref();

        let images = timings.time("decode_frames", || -> Result<Vec<RasterImage>> {
            let mut images = Vec::with_capacity(paths.len());
            for path in paths {
                let path = path.as_ref();
                let data = std::fs::read(path).map_err(|e| {
                    MelodyError::InputReadError(format!("{}: {}", path.display(), e))
                });
                images.extend(self.decode_frame(&path.display().to_string(), data)?);
            }
            Ok(images)
        })?;

        let score = timings.time("assemble", || self.assemble(&images))?;

        let mut buffer = Vec::new();
        timings.time("encode_midi", || {
            self.writer.write_score(&score, &mut buffer, &self.config)
        })?;

        timings.time("write_output", || -> Result<()> {
            let mut output_file = std::fs::File::create(output_path).map_err(|e| {
                MelodyError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?;
            output_file.write_all(&buffer).map_err(|e| {
                MelodyError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })
        })?;

        info!(
            output = %output_path.display(),
            notes = score.events().len(),
            "Wrote MIDI file"
        );
        Ok((score, timings))
    }

    /// Converts every frame in `dir` and writes to the configured output path.
    pub fn convert_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Score> {
        self.convert_dir_with_timings(dir).map(|(score, _)| score)
    }

    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn convert_dir_with_timings<P: AsRef<Path>>(&self, dir: P) -> Result<(Score, PipelineTimings)> {
        let dir = dir.as_ref();
        info!("Searching through {}", dir.display());

        let mut timings = PipelineTimings::new();
        let paths = timings.time("list_frames", || list_frames(dir))?;

        let (score, conversion) = self.convert_files_with_timings(&paths, &self.config.output_path)?;
        for step in conversion.steps() {
            timings.add_step(step.name.clone(), step.duration);
        }
        Ok((score, timings))
    }

    pub fn config(&self) -> &MelodyConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MelodyConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }
}
