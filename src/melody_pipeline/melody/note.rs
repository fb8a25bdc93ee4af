use crate::melody_pipeline::common::error::{MelodyError, Result};

/// The test melody played when no tune is configured.
pub const REFERENCE_TUNE: [&str; 4] = ["C4", "G4", "F4", "B3"];

const NOTE_OFFSETS: [(char, u32); 7] = [
    ('C', 0),
    ('D', 2),
    ('E', 4),
    ('F', 5),
    ('G', 7),
    ('A', 9),
    ('B', 11),
];

/// Converts a note name such as `"C4"`, `"f#3"` or `"Bb2"` to a MIDI note number.
///
/// Octave 4 holds middle C, so `"C4"` is 60. The whole string must be a note
/// name and the result must fit in 0..=127.
pub fn note_to_pitch(note: &str) -> Result<u8> {
    let invalid = || MelodyError::InvalidNoteName(note.to_string());

    let mut chars = note.chars();
    let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
    let base = NOTE_OFFSETS
        .iter()
        .find(|(name, _)| *name == letter)
        .map(|&(_, offset)| offset)
        .ok_or_else(invalid)?;

    let rest = chars.as_str();
    let (accidental, octave) = match rest.as_bytes().first() {
        Some(b'#') => (1, &rest[1..]),
        Some(b'b') => (-1, &rest[1..]),
        _ => (0, rest),
    };
    if octave.is_empty() || !octave.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let octave: u32 = octave.parse().map_err(|_| invalid())?;

    let pitch = octave
        .checked_mul(12)
        .and_then(|p| p.checked_add(12 + base))
        .map(|p| p as i64 + accidental)
        .ok_or_else(invalid)?;
    u8::try_from(pitch)
        .ok()
        .filter(|&p| p <= 127)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_pitches() {
        assert_eq!(note_to_pitch("C4").unwrap(), 60);
        assert_eq!(note_to_pitch("A4").unwrap(), 69);
        assert_eq!(note_to_pitch("C#4").unwrap(), 61);
        assert_eq!(note_to_pitch("Cb4").unwrap(), 59);
        assert_eq!(note_to_pitch("G4").unwrap(), 67);
        assert_eq!(note_to_pitch("F4").unwrap(), 65);
        assert_eq!(note_to_pitch("B3").unwrap(), 59);
    }

    #[test]
    fn test_letter_is_case_insensitive() {
        assert_eq!(note_to_pitch("e2").unwrap(), note_to_pitch("E2").unwrap());
        assert_eq!(note_to_pitch("bb3").unwrap(), 58);
    }

    #[test]
    fn test_range_edges() {
        assert_eq!(note_to_pitch("C0").unwrap(), 12);
        assert_eq!(note_to_pitch("Cb0").unwrap(), 11);
        assert_eq!(note_to_pitch("G9").unwrap(), 127);
        assert!(note_to_pitch("G#9").is_err());
        assert!(note_to_pitch("C99999999999").is_err());
    }

    #[test]
    fn test_rejects_malformed_names() {
        for name in ["", "H4", "C", "C#", "4C", "C4 ", "Cx4", "C-1", "C##4", "C4b"] {
            assert!(
                matches!(note_to_pitch(name), Err(MelodyError::InvalidNoteName(_))),
                "{name:?} should be rejected"
            );
        }
    }
}
