//! Score value types

/// One note of the output melody
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusicalEvent {
    pub track: u8,
    pub channel: u8,
    /// MIDI note number, 0..=127
    pub pitch: u8,
    pub start_beat: f64,
    pub duration_beats: f64,
    /// 0..=127
    pub velocity: u8,
}

impl MusicalEvent {
    /// A note on track 0, channel 0.
    pub fn note(pitch: u8, start_beat: f64, duration_beats: f64, velocity: u8) -> Self {
        Self {
            track: 0,
            channel: 0,
            pitch: pitch.min(127),
            start_beat,
            duration_beats,
            velocity: velocity.min(127),
        }
    }

    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.duration_beats
    }
}

/// A single-track melody at a fixed tempo
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    tempo_bpm: f64,
    events: Vec<MusicalEvent>,
}

impl Score {
    pub fn new(tempo_bpm: f64) -> Self {
        Self {
            tempo_bpm,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: MusicalEvent) {
        self.events.push(event);
    }

    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    pub fn events(&self) -> &[MusicalEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Beat at which the last note stops sounding.
    pub fn length_beats(&self) -> f64 {
        self.events.iter().map(MusicalEvent::end_beat).fold(0.0, f64::max)
    }
}
