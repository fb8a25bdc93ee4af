//! Image sequence to melody pipeline module
//!
//! This module provides a structured approach to turning image sequences into MIDI,
//! with separate modules for image reading, fingerprinting, melody mapping,
//! MIDI writing, and conversion orchestration.

pub mod raster;
pub mod fingerprint;
pub mod melody;
pub mod midi;
pub mod config;
pub mod conversions;
pub mod common;

pub use common::{
    MelodyError,
    PipelineTimings,
    Result,
};

pub use raster::{
    RasterImage,
    RasterImageReader,
    ImageCrateReader,
};

pub use fingerprint::{
    extract,
    ImageFingerprint,
};

pub use melody::{
    note_to_pitch,
    FrameMapper,
    LuminanceMapper,
    MusicalEvent,
    Score,
    TimelineAssembler,
    TuneMapper,
    REFERENCE_TUNE,
};

pub use midi::{
    ScoreWriter,
    StandardMidiWriter,
};

pub use config::{
    DecodePolicy,
    MelodyConfig,
    MelodyConfigBuilder,
};

pub use conversions::{
    list_frames,
    ImagesToMidiPipeline,
};
