//! Melody generation module
//!
//! Turns per-frame fingerprints into note events and assembles them into a score.

mod note;
mod mapper;
mod timeline;
pub mod types;

pub use note::{note_to_pitch, REFERENCE_TUNE};
pub use mapper::{FrameMapper, LuminanceMapper, TuneMapper};
pub use timeline::TimelineAssembler;
pub use types::{MusicalEvent, Score};
