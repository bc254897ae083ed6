//! MIDI number to pitch-name mapping.
//!
//! Names use flats and the octave convention where MIDI 60 is `C3`, so the
//! full MIDI range runs from `C-2` (0) to `G8` (127).

use crate::error::{Error, Result};

const NOTE_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

pub const MAX_PITCH: u8 = 127;

const MIN_OCTAVE: i32 = -2;
const MAX_OCTAVE: i32 = 8;

/// Convert a MIDI note number to its name (e.g. 60 -> "C3", 42 -> "Gb1").
pub fn midi_to_name(pitch: u8) -> Result<String> {
    if pitch > MAX_PITCH {
        return Err(Error::range(format!(
            "MIDI pitch must be 0-{}, got {}",
            MAX_PITCH, pitch
        )));
    }

    let name = NOTE_NAMES[(pitch % 12) as usize];
    let octave = (pitch / 12) as i32 - 2;

    Ok(format!("{}{}", name, octave))
}

/// Parse a pitch name back to a MIDI note number.
///
/// Accepts upper or lower case letters and either `b` or `#` accidentals.
pub fn name_to_midi(name: &str) -> Result<u8> {
    let mut chars = name.chars();

    let letter_offset = match chars.next().map(|c| c.to_ascii_uppercase()) {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        _ => return Err(Error::format(name, "pitch must start with a letter A-G")),
    };

    let rest = &name[1..];
    let (accidental, octave_str) = match rest.as_bytes().first() {
        Some(b'#') => (1, &rest[1..]),
        Some(b'b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let digits = octave_str.strip_prefix('-').unwrap_or(octave_str);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::format(name, "pitch octave is not a number"));
    }

    let out_of_range = || {
        Error::range(format!(
            "pitch '{}' is outside the MIDI range C-2..G8",
            name
        ))
    };

    // Octaves too large for i32 are still just out of range
    let octave: i32 = octave_str.parse().map_err(|_| out_of_range())?;
    if !(MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
        return Err(out_of_range());
    }

    let midi = (octave + 2) * 12 + letter_offset + accidental;
    if !(0..=MAX_PITCH as i32).contains(&midi) {
        return Err(out_of_range());
    }

    Ok(midi as u8)
}
