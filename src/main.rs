use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image_melody::logger;
use image_melody::melody_pipeline::{
    DecodePolicy, FrameMapper, ImagesToMidiPipeline, ImageCrateReader, LuminanceMapper,
    MelodyConfig, StandardMidiWriter, TuneMapper, REFERENCE_TUNE,
};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MapperKind {
    /// Loop a fixed tune, one note per frame
    Tune,
    /// Pitch from brightness, velocity from contrast
    Luminance,
}

/// Turn a directory of images into a MIDI melody, one note per image
#[derive(Parser, Debug)]
#[command(name = "image_melody")]
#[command(version)]
struct Args {
    /// Directory holding the image sequence, read in file name order
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Frames per second of the image sequence [default: 12]
    #[arg(long)]
    fps: Option<f64>,

    /// Frames per beat [default: 9]
    #[arg(long)]
    fpb: Option<f64>,

    /// Output MIDI file [default: output.mid]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// How frames become notes
    #[arg(long, value_enum, default_value_t = MapperKind::Tune)]
    mapper: MapperKind,

    /// Comma-separated note names looped by the tune mapper
    #[arg(long, value_delimiter = ',')]
    tune: Vec<String>,

    /// Leave out files that cannot be decoded instead of stopping
    #[arg(long)]
    skip_unreadable: bool,

    /// Fingerprint frames in parallel
    #[arg(long)]
    parallel: bool,

    /// Print per-stage timings when done
    #[arg(long)]
    timings: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> MelodyConfig {
        let mut builder = MelodyConfig::builder()
            .parallel(self.parallel)
            .decode_policy(if self.skip_unreadable {
                DecodePolicy::Skip
            } else {
                DecodePolicy::Abort
            });
        if let Some(fps) = self.fps {
            builder = builder.frames_per_second(fps);
        }
        if let Some(fpb) = self.fpb {
            builder = builder.frames_per_beat(fpb);
        }
        if let Some(output) = &self.output {
            builder = builder.output_path(output);
        }
        builder.build()
    }
}

fn run<M: FrameMapper>(args: &Args, config: MelodyConfig, mapper: M) -> Result<()> {
    let pipeline =
        ImagesToMidiPipeline::with_custom(ImageCrateReader, StandardMidiWriter, mapper, config)
            .context("Invalid configuration")?;

    info!(
        "Frames per second: {}, frames per beat: {}",
        pipeline.config().frames_per_second,
        pipeline.config().frames_per_beat
    );

    let (score, timings) = pipeline
        .convert_dir_with_timings(&args.dir)
        .with_context(|| format!("Failed to convert images in {}", args.dir.display()))?;

    info!(
        "Wrote {} notes to {}",
        score.events().len(),
        pipeline.config().output_path.display()
    );
    if args.timings {
        print!("{}", timings.summary());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose);

    let config = args.config();
    match args.mapper {
        MapperKind::Tune => {
            let mapper = if args.tune.is_empty() {
                TuneMapper::new(&REFERENCE_TUNE)
            } else {
                TuneMapper::new(&args.tune)
            }
            .context("Invalid tune")?;
            run(&args, config, mapper)
        }
        MapperKind::Luminance => run(&args, config, LuminanceMapper),
    }
}
