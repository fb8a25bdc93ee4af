//! Pipeline conversions module
//!
//! This module contains orchestration logic from image sequences to MIDI files.

mod frame_source;
mod images_to_midi;


pub use frame_source::list_frames;
pub use images_to_midi::ImagesToMidiPipeline;
