//! Standard MIDI File output using the `midly` crate.
//!
//! Output is SMF format 0: a single track holding the tempo at tick 0, the
//! note-on/note-off pairs of every event, and an end-of-track marker. Beats map
//! to quarter notes at `ticks_per_beat` resolution.

use std::collections::HashMap;
use std::io::Write;

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use tracing::debug;

use crate::melody_pipeline::common::error::{MelodyError, Result};
use crate::melody_pipeline::config::MelodyConfig;
use crate::melody_pipeline::melody::{MusicalEvent, Score};
use crate::melody_pipeline::midi::writer::ScoreWriter;

const TRACK_NAME: &[u8] = b"image_melody";

/// Largest delta time a variable-length quantity can hold.
const MAX_DELTA_TICKS: u32 = (1 << 28) - 1;

/// Largest tempo a tempo meta event can hold, in microseconds per quarter note.
const MAX_TEMPO_MICROS: u32 = (1 << 24) - 1;

pub struct StandardMidiWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum NoteEdge {
    // Releases sort first so a repeated pitch is not cut off by its own predecessor.
    Off,
    On,
}

#[derive(Debug, Clone, Copy)]
struct TimedNote {
    tick: u32,
    edge: NoteEdge,
    channel: u8,
    pitch: u8,
    velocity: u8,
}

impl StandardMidiWriter {
    fn beat_to_tick(beat: f64, ticks_per_beat: u16) -> Result<u32> {
        let tick = (beat * ticks_per_beat as f64).round();
        if !tick.is_finite() || tick < 0.0 || tick > MAX_DELTA_TICKS as f64 {
            return Err(MelodyError::EncodeError(format!("beat {beat} is out of range")));
        }
        Ok(tick as u32)
    }

    fn tempo_micros(bpm: f64) -> Result<u32> {
        let micros = (60_000_000.0 / bpm).round();
        if !micros.is_finite() || micros < 1.0 || micros > MAX_TEMPO_MICROS as f64 {
            return Err(MelodyError::EncodeError(format!(
                "tempo of {bpm} BPM cannot be stored in a MIDI file"
            )));
        }
        Ok(micros as u32)
    }

    fn timed_notes(score: &Score, ticks_per_beat: u16) -> Result<Vec<TimedNote>> {
        let mut notes = Vec::with_capacity(score.events().len() * 2);
        for event in score.events() {
            let MusicalEvent { channel, pitch, velocity, .. } = *event;
            if channel > 15 || pitch > 127 || velocity > 127 {
                return Err(MelodyError::EncodeError(format!(
                    "event out of MIDI range: channel={channel} pitch={pitch} velocity={velocity}"
                )));
            }
            let on = Self::beat_to_tick(event.start_beat, ticks_per_beat)?;
            let off = Self::beat_to_tick(event.end_beat(), ticks_per_beat)?.max(on + 1);
            notes.push(TimedNote { tick: on, edge: NoteEdge::On, channel, pitch, velocity });
            notes.push(TimedNote { tick: off, edge: NoteEdge::Off, channel, pitch, velocity: 0 });
        }
        notes.sort_by_key(|n| (n.tick, n.edge));
        Ok(Self::deinterleave(notes))
    }

    /// Ends a sounding note when the same pitch is struck again on its channel.
    ///
    /// The early release goes right before the new attack and the next pending
    /// release of that pitch is dropped, so no note-off cuts a later note short.
    fn deinterleave(notes: Vec<TimedNote>) -> Vec<TimedNote> {
        let mut open: HashMap<(u8, u8), u32> = HashMap::new();
        let mut dropped: HashMap<(u8, u8), u32> = HashMap::new();
        let mut out = Vec::with_capacity(notes.len());

        for note in notes {
            let key = (note.channel, note.pitch);
            match note.edge {
                NoteEdge::On => {
                    let sounding = open.entry(key).or_insert(0);
                    if *sounding > 0 {
                        out.push(TimedNote { edge: NoteEdge::Off, velocity: 0, ..note });
                        *dropped.entry(key).or_insert(0) += 1;
                    } else {
                        *sounding += 1;
                    }
                    out.push(note);
                }
                NoteEdge::Off => {
                    let pending = dropped.entry(key).or_insert(0);
                    if *pending > 0 {
                        *pending -= 1;
                        continue;
                    }
                    if let Some(sounding) = open.get_mut(&key) {
                        *sounding = sounding.saturating_sub(1);
                    }
                    out.push(note);
                }
            }
        }
        out
    }

    /// Converts a score to an in-memory SMF.
    pub fn score_to_smf(score: &Score, ticks_per_beat: u16) -> Result<Smf<'static>> {
        let mut track: Track<'static> = Vec::new();
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(TRACK_NAME)),
        });
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(Self::tempo_micros(
                score.tempo_bpm(),
            )?))),
        });

        let mut last_tick = 0;
        for note in Self::timed_notes(score, ticks_per_beat)? {
            let key = u7::new(note.pitch);
            let message = match note.edge {
                NoteEdge::On => MidiMessage::NoteOn { key, vel: u7::new(note.velocity) },
                NoteEdge::Off => MidiMessage::NoteOff { key, vel: u7::new(note.velocity) },
            };
            track.push(TrackEvent {
                delta: u28::new(note.tick - last_tick),
                kind: TrackEventKind::Midi {
                    channel: u4::new(note.channel),
                    message,
                },
            });
            last_tick = note.tick;
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });

        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(ticks_per_beat)),
        ));
        smf.tracks.push(track);
        Ok(smf)
    }
}

impl ScoreWriter for StandardMidiWriter {
    fn write_score(&self, score: &Score, output: &mut dyn Write, config: &MelodyConfig) -> Result<()> {
        debug!(
            "Encoding MIDI: {} notes at {} BPM",
            score.events().len(),
            score.tempo_bpm()
        );

        let smf = Self::score_to_smf(score, config.ticks_per_beat)?;
        let mut buffer = Vec::new();
        smf.write(&mut buffer)
            .map_err(|e| MelodyError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("MIDI encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melody_pipeline::melody::{TimelineAssembler, TuneMapper};
    use crate::melody_pipeline::raster::RasterImage;

    fn encode(score: &Score) -> Vec<u8> {
        let mut bytes = Vec::new();
        StandardMidiWriter
            .write_score(score, &mut bytes, &MelodyConfig::default())
            .unwrap();
        bytes
    }

    fn note_events(track: &Track<'_>) -> Vec<(u32, bool, u8)> {
        let mut tick = 0;
        let mut notes = Vec::new();
        for event in track {
            tick += event.delta.as_int();
            if let TrackEventKind::Midi { message, .. } = event.kind {
                match message {
                    MidiMessage::NoteOn { key, .. } => notes.push((tick, true, key.as_int())),
                    MidiMessage::NoteOff { key, .. } => notes.push((tick, false, key.as_int())),
                    _ => {}
                }
            }
        }
        notes
    }

    #[test]
    fn test_empty_score_is_valid_silent_file() {
        let bytes = encode(&Score::new(80.0));
        let smf = Smf::parse(&bytes).unwrap();

        assert_eq!(smf.header.format, Format::SingleTrack);
        assert_eq!(smf.tracks.len(), 1);
        assert!(note_events(&smf.tracks[0]).is_empty());
        assert!(smf.tracks[0].iter().any(|e| matches!(
            e.kind,
            TrackEventKind::Meta(MetaMessage::Tempo(t)) if t.as_int() == 750_000
        )));
        assert!(matches!(
            smf.tracks[0].last().map(|e| e.kind),
            Some(TrackEventKind::Meta(MetaMessage::EndOfTrack))
        ));
    }

    #[test]
    fn test_notes_are_placed_on_ticks() {
        let mut score = Score::new(80.0);
        score.push(MusicalEvent::note(60, 0.0, 1.0, 100));
        score.push(MusicalEvent::note(67, 1.0 / 9.0, 1.0, 100));

        let bytes = encode(&score);
        let smf = Smf::parse(&bytes).unwrap();
        let notes = note_events(&smf.tracks[0]);

        // 480 ticks per beat; 480/9 rounds to 53.
        assert_eq!(
            notes,
            vec![(0, true, 60), (53, true, 67), (480, false, 60), (533, false, 67)]
        );
    }

    #[test]
    fn test_release_precedes_attack_on_same_tick() {
        let mut score = Score::new(120.0);
        score.push(MusicalEvent::note(60, 0.0, 1.0, 90));
        score.push(MusicalEvent::note(60, 1.0, 1.0, 90));

        let bytes = encode(&score);
        let smf = Smf::parse(&bytes).unwrap();
        let notes = note_events(&smf.tracks[0]);

        assert_eq!(
            notes,
            vec![(0, true, 60), (480, false, 60), (480, true, 60), (960, false, 60)]
        );
    }

    #[test]
    fn test_restruck_pitch_releases_before_attack() {
        let frames = vec![RasterImage::filled(2, 2, [50, 50, 50]); 5];
        let mapper = TuneMapper::default();
        let score = TimelineAssembler::new(&mapper, 12.0, 9.0).assemble(&frames).unwrap();

        let smf = StandardMidiWriter::score_to_smf(&score, 480).unwrap();
        let middle_c: Vec<(u32, bool)> = note_events(&smf.tracks[0])
            .into_iter()
            .filter(|&(_, _, key)| key == 60)
            .map(|(tick, on, _)| (tick, on))
            .collect();

        // Frame 4 strikes C4 again at 4/9 beat (tick 213) while frame 0 still sounds.
        assert_eq!(middle_c, vec![(0, true), (213, false), (213, true), (693, false)]);
    }

    #[test]
    fn test_every_attack_has_one_release() {
        let mut score = Score::new(80.0);
        for i in 0..12 {
            score.push(MusicalEvent::note(62, i as f64 * 0.25, 1.0, 100));
        }

        let smf = StandardMidiWriter::score_to_smf(&score, 480).unwrap();
        let notes = note_events(&smf.tracks[0]);
        let mut sounding = 0i32;
        for &(_, on, _) in &notes {
            sounding += if on { 1 } else { -1 };
            assert!((0..=1).contains(&sounding), "{notes:?}");
        }
        assert_eq!(sounding, 0);
    }

    #[test]
    fn test_unrepresentable_tempo_is_encode_error() {
        let result = StandardMidiWriter::score_to_smf(&Score::new(0.5), 480);
        assert!(matches!(result, Err(MelodyError::EncodeError(_))));
    }
}
