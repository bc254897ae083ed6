//! Conversion between performance beats and bar|beat text.
//!
//! Performance beats are quarter notes, the host's clock. Musical beats count
//! one unit per time-signature denominator note, so in 6/8 one quarter note is
//! two musical beats. Positions (`bar|beat`) are 1-based, durations
//! (`bars:beats`) are 0-based, and the two separators are never interchangeable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::numeric::{format_position_beat, format_unsigned, parse_number};

pub const DEFAULT_BEATS_PER_BAR: u32 = 4;

/// Message for a `:` used where a `bar|beat` position belongs.
pub const COLON_IN_POSITION: &str = "':' marks bars:beats durations; write positions as bar|beat";

/// Message for a `|` used where a `bars:beats` duration belongs.
pub const PIPE_IN_DURATION: &str = "'|' marks bar|beat positions; write durations as bars:beats";

/// Values closer than this to a whole musical beat are snapped onto it.
const SNAP_EPSILON: f64 = 1e-9;

/// Options shared by the serializer and the interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotationOptions {
    pub beats_per_bar: Option<u32>,
    pub time_sig_numerator: Option<u32>,
    pub time_sig_denominator: Option<u32>,
    pub drum_mode: bool,
}

impl NotationOptions {
    pub fn with_time_signature(numerator: u32, denominator: u32) -> Self {
        NotationOptions {
            time_sig_numerator: Some(numerator),
            time_sig_denominator: Some(denominator),
            ..Default::default()
        }
    }

    pub fn drums(mut self) -> Self {
        self.drum_mode = true;
        self
    }

    /// Validate the options and build the time context they describe.
    pub fn resolve(&self) -> Result<TimeContext> {
        if self.beats_per_bar == Some(0) {
            return Err(Error::config("beats per bar must be at least 1"));
        }

        match (self.time_sig_numerator, self.time_sig_denominator) {
            (Some(numerator), Some(denominator)) => {
                if numerator == 0 || denominator == 0 {
                    return Err(Error::config(format!(
                        "time signature {}/{} must have non-zero parts",
                        numerator, denominator
                    )));
                }
                Ok(TimeContext::new(
                    self.beats_per_bar.unwrap_or(numerator),
                    Some(denominator),
                ))
            }
            (None, None) => Ok(TimeContext::new(
                self.beats_per_bar.unwrap_or(DEFAULT_BEATS_PER_BAR),
                None,
            )),
            _ => Err(Error::config(
                "time signature numerator and denominator must be supplied together",
            )),
        }
    }
}

/// A 1-based bar|beat position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub bar: u32,
    pub beat: f64,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.bar, format_position_beat(self.beat))
    }
}

fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < SNAP_EPSILON {
        rounded
    } else {
        value
    }
}

/// Resolved bar length and beat unit for one encode or decode pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeContext {
    beats_per_bar: f64,
    /// Musical beats per performance beat (`denominator / 4`).
    beat_scale: f64,
}

impl Default for TimeContext {
    fn default() -> Self {
        TimeContext::new(DEFAULT_BEATS_PER_BAR, None)
    }
}

impl TimeContext {
    pub fn new(beats_per_bar: u32, denominator: Option<u32>) -> Self {
        TimeContext {
            beats_per_bar: beats_per_bar as f64,
            beat_scale: denominator.map_or(1.0, |d| d as f64 / 4.0),
        }
    }

    pub fn beats_per_bar(&self) -> f64 {
        self.beats_per_bar
    }

    pub fn to_musical(&self, performance_beats: f64) -> f64 {
        performance_beats * self.beat_scale
    }

    pub fn to_performance(&self, musical_beats: f64) -> f64 {
        musical_beats / self.beat_scale
    }

    /// Position of a musical-beat offset from the start of bar 1.
    pub fn position_of_musical(&self, musical_beats: f64) -> Position {
        let musical = snap(musical_beats);
        let bar_index = (musical / self.beats_per_bar).floor();
        let beat = snap(musical - bar_index * self.beats_per_bar) + 1.0;

        Position {
            bar: bar_index as u32 + 1,
            beat,
        }
    }

    /// Position of a performance-beat start time.
    pub fn position_of(&self, performance_beats: f64) -> Position {
        self.position_of_musical(self.to_musical(performance_beats))
    }

    /// Musical beats from the start of bar 1 to a position.
    pub fn musical_beats_of(&self, position: Position) -> f64 {
        (position.bar as f64 - 1.0) * self.beats_per_bar + (position.beat - 1.0)
    }

    /// Format a performance-beat start time as `bar|beat`.
    pub fn beats_to_bar_beat(&self, performance_beats: f64) -> String {
        self.position_of(performance_beats).to_string()
    }

    /// Parse a `bar|beat` position into performance beats.
    pub fn bar_beat_to_beats(&self, text: &str) -> Result<f64> {
        let position = parse_position(text)?;
        Ok(self.to_performance(self.musical_beats_of(position)))
    }

    /// Parse a `bars:beats` duration into musical beats.
    pub fn duration_musical_beats(&self, text: &str) -> Result<f64> {
        if text.contains('|') {
            return Err(Error::format(text, PIPE_IN_DURATION));
        }
        let (bars, beats) = text
            .split_once(':')
            .ok_or_else(|| Error::format(text, "expected a bars:beats duration"))?;

        if bars.starts_with('-') || beats.starts_with('-') {
            return Err(Error::range(format!("duration must not be negative, got {}", text)));
        }
        if bars.is_empty() || !bars.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::format(text, "bar count is not a whole number"));
        }
        let bars: u32 = bars
            .parse()
            .map_err(|_| Error::format(text, "bar count is not a whole number"))?;
        let beats = parse_number(beats)?;

        Ok(bars as f64 * self.beats_per_bar + beats)
    }

    /// Parse a `bars:beats` duration into performance beats.
    pub fn bar_beat_duration_to_beats(&self, text: &str) -> Result<f64> {
        Ok(self.to_performance(self.duration_musical_beats(text)?))
    }

    /// Format a performance-beat duration as `bars:beats`.
    pub fn beats_to_bar_beat_duration(&self, performance_beats: f64) -> String {
        let musical = snap(self.to_musical(performance_beats));
        let bars = (musical / self.beats_per_bar).floor();
        let beats = snap(musical - bars * self.beats_per_bar);
        format!("{}:{}", bars, format_unsigned(beats))
    }
}

/// Parse a single `bar|beat` position (no comma lists).
pub fn parse_position(text: &str) -> Result<Position> {
    let Some((bar, beat)) = text.split_once('|') else {
        if text.contains(':') {
            return Err(Error::format(text, COLON_IN_POSITION));
        }
        return Err(Error::format(text, "expected a bar|beat position"));
    };

    Ok(Position {
        bar: parse_bar(bar)?,
        beat: parse_beat(beat)?,
    })
}

/// Parse the bar half of a position, enforcing bar >= 1.
pub fn parse_bar(text: &str) -> Result<u32> {
    if text.starts_with('-') {
        return Err(Error::range(format!("bar must be 1 or greater, got {}", text)));
    }
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::format(text, "bar is not a whole number"));
    }
    let bar: u32 = text
        .parse()
        .map_err(|_| Error::format(text, "bar is not a whole number"))?;
    if bar < 1 {
        return Err(Error::range(format!("bar must be 1 or greater, got {}", bar)));
    }
    Ok(bar)
}

/// Parse the beat half of a position, enforcing beat >= 1.
pub fn parse_beat(text: &str) -> Result<f64> {
    if text.contains(':') {
        return Err(Error::format(text, COLON_IN_POSITION));
    }
    if text.starts_with('-') {
        return Err(Error::range(format!("beat must be 1 or greater, got {}", text)));
    }
    let beat = parse_number(text)?;
    if beat < 1.0 {
        return Err(Error::range(format!("beat must be 1 or greater, got {}", text)));
    }
    Ok(beat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn ctx(options: NotationOptions) -> TimeContext {
        options.resolve().unwrap()
    }

    #[test]
    fn test_resolve_defaults() {
        let time = ctx(NotationOptions::default());
        assert_eq!(time.beats_per_bar(), 4.0);
        assert_eq!(time.to_musical(3.0), 3.0);
    }

    #[test]
    fn test_resolve_time_signature() {
        let time = ctx(NotationOptions::with_time_signature(6, 8));
        assert_eq!(time.beats_per_bar(), 6.0);
        assert_eq!(time.to_musical(1.0), 2.0);

        let explicit = NotationOptions {
            beats_per_bar: Some(3),
            ..NotationOptions::with_time_signature(6, 8)
        };
        assert_eq!(ctx(explicit).beats_per_bar(), 3.0);
    }

    #[test]
    fn test_resolve_rejects_half_time_signature() {
        let options = NotationOptions {
            time_sig_numerator: Some(3),
            ..Default::default()
        };
        assert_eq!(options.resolve().unwrap_err().kind(), ErrorKind::Config);

        let options = NotationOptions {
            time_sig_denominator: Some(4),
            ..Default::default()
        };
        assert_eq!(options.resolve().unwrap_err().kind(), ErrorKind::Config);
        assert!(NotationOptions::with_time_signature(0, 4).resolve().is_err());
    }

    #[test]
    fn test_options_from_json() {
        let options: NotationOptions =
            serde_json::from_str(r#"{"time_sig_numerator":3,"time_sig_denominator":4}"#).unwrap();
        assert_eq!(options, NotationOptions::with_time_signature(3, 4));
        assert!(!options.drum_mode);
    }

    #[test]
    fn test_positions() {
        let time = TimeContext::default();
        assert_eq!(time.beats_to_bar_beat(0.0), "1|1");
        assert_eq!(time.beats_to_bar_beat(1.0), "1|2");
        assert_eq!(time.beats_to_bar_beat(4.0), "2|1");
        assert_eq!(time.beats_to_bar_beat(5.5), "2|2.5");
        assert_eq!(time.beats_to_bar_beat(1.0 / 3.0), "1|1+1/3");
    }

    #[test]
    fn test_positions_in_compound_time() {
        let time = ctx(NotationOptions::with_time_signature(6, 8));
        assert_eq!(time.beats_to_bar_beat(3.0), "2|1");
        assert_eq!(time.beats_to_bar_beat(0.5), "1|2");
        assert_eq!(time.bar_beat_to_beats("2|4").unwrap(), 4.5);
    }

    #[test]
    fn test_parse_position() {
        let time = TimeContext::default();
        assert_eq!(time.bar_beat_to_beats("1|1").unwrap(), 0.0);
        assert_eq!(time.bar_beat_to_beats("3|2.5").unwrap(), 9.5);
        assert_eq!(time.bar_beat_to_beats("1|1+1/2").unwrap(), 0.5);
        // beats past the bar length advance without wrapping
        assert_eq!(time.bar_beat_to_beats("1|6").unwrap(), 5.0);
    }

    #[test]
    fn test_parse_position_errors() {
        assert_eq!(parse_position("0|1").unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(parse_position("-1|1").unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(parse_position("1|0").unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(parse_position("1|-2").unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(parse_position("1|/2").unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(parse_position("x|1").unwrap_err().kind(), ErrorKind::Format);

        let err = parse_position("1:1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("bar|beat"));

        let err = parse_position("1|1:2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("bar|beat"));
        assert_eq!(parse_beat("2:1").unwrap_err(), Error::format("2:1", COLON_IN_POSITION));
    }

    #[test]
    fn test_durations() {
        let time = TimeContext::default();
        assert_eq!(time.bar_beat_duration_to_beats("0:1").unwrap(), 1.0);
        assert_eq!(time.bar_beat_duration_to_beats("2:1.5").unwrap(), 9.5);
        assert_eq!(time.beats_to_bar_beat_duration(9.5), "2:1.5");
        assert_eq!(time.beats_to_bar_beat_duration(0.5), "0:/2");
    }

    #[test]
    fn test_duration_errors() {
        let time = TimeContext::default();
        let err = time.bar_beat_duration_to_beats("1|2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("bars:beats"));
        assert_eq!(
            time.bar_beat_duration_to_beats("-1:0").unwrap_err().kind(),
            ErrorKind::Range
        );
        assert_eq!(
            time.bar_beat_duration_to_beats("1:1/0").unwrap_err().kind(),
            ErrorKind::Range
        );
    }
}
