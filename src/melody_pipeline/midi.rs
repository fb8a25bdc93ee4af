//! MIDI writing module
//!
//! This module serializes assembled scores as Standard MIDI Files.

mod writer;
mod standard_midi_writer;

pub use writer::ScoreWriter;
pub use standard_midi_writer::StandardMidiWriter;
