//! Bar|beat notation back to note events.
//!
//! Tokens are read left to right. State tokens (`v`, `t`, `p`) change the
//! state applied to following pitches, pitch tokens collect into a pending
//! set, and each position token places that set at one or more times. A
//! position that directly follows another position replays the same set.

use barbeat_core::{
    name_to_midi, parse_bar, parse_beat, parse_number, Error, NotationOptions, NoteEvent,
    Position, TimeContext, COLON_IN_POSITION,
};
use log::trace;

use crate::drums::MAX_REPEAT_COUNT;
use crate::error::{NotationError, Result};
use crate::lexer::{Lexer, Span, Token};
use crate::state::{PerformanceState, MAX_VELOCITY, MIN_VELOCITY};

#[derive(Debug, Clone)]
struct PendingPitch {
    pitch: u8,
    state: PerformanceState,
    span: Span,
}

/// Interpret notation text into note events.
pub fn interpret(text: &str, options: &NotationOptions) -> Result<Vec<NoteEvent>> {
    let time = options.resolve()?;
    Interpreter::new(text, time).run()
}

pub struct Interpreter<'source> {
    lexer: Lexer<'source>,
    time: TimeContext,
    state: PerformanceState,
    pending: Vec<PendingPitch>,
    /// The pending set has already been placed at least once
    placed: bool,
    notes: Vec<NoteEvent>,
}

impl<'source> Interpreter<'source> {
    pub fn new(source: &'source str, time: TimeContext) -> Self {
        Interpreter {
            lexer: Lexer::new(source),
            time,
            state: PerformanceState::default(),
            pending: Vec::new(),
            placed: false,
            notes: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<Vec<NoteEvent>> {
        while let Some((token, span)) = self.lexer.next() {
            let text = self.lexer.slice(span);
            trace!("{} token '{}'", token, text);
            self.apply(token, text, span)
                .map_err(|e| NotationError::at_token(text, span, e))?;
        }

        if !self.placed {
            if let Some(dangling) = self.pending.first() {
                let text = self.lexer.slice(dangling.span);
                return Err(NotationError::at_token(
                    text,
                    dangling.span,
                    Error::format(text, "pitch has no position after it"),
                ));
            }
        }

        Ok(self.notes)
    }

    fn apply(&mut self, token: Token, text: &str, span: Span) -> barbeat_core::Result<()> {
        match token {
            Token::Velocity => {
                let (min, max) = parse_velocity(text)?;
                self.set_state(self.state.with_velocity(min, max));
            }
            Token::Duration => {
                let duration = self.parse_duration(text)?;
                self.set_state(self.state.with_duration(duration));
            }
            Token::Probability => {
                let probability = parse_probability(text)?;
                self.set_state(self.state.with_probability(probability));
            }
            Token::Pitch => {
                let pitch = name_to_midi(text)?;
                if self.placed {
                    self.pending.clear();
                    self.placed = false;
                }
                self.pending.push(PendingPitch {
                    pitch,
                    state: self.state,
                    span,
                });
            }
            Token::Position => {
                let offsets = self.parse_offsets(text)?;
                self.place(text, &offsets)?;
            }
            Token::ColonPosition => return Err(Error::format(text, COLON_IN_POSITION)),
            Token::Unknown => return Err(Error::format(text, "unrecognised token")),
        }
        Ok(())
    }

    /// New state applies to pitches read from now on, and to a set that is
    /// waiting to be replayed at further positions.
    fn set_state(&mut self, state: PerformanceState) {
        self.state = state;
        if self.placed {
            for pending in &mut self.pending {
                pending.state = state;
            }
        }
    }

    fn parse_duration(&self, text: &str) -> barbeat_core::Result<f64> {
        let body = &text[1..];
        if body.contains(':') || body.contains('|') {
            self.time.duration_musical_beats(body)
        } else {
            parse_number(body)
        }
    }

    /// Musical-beat offsets named by a position or repeat token.
    fn parse_offsets(&self, text: &str) -> barbeat_core::Result<Vec<f64>> {
        let (bar, beats) = text
            .split_once('|')
            .ok_or_else(|| Error::format(text, "expected a bar|beat position"))?;
        let bar = parse_bar(bar)?;

        if let Some((start, repeat)) = beats.split_once('x') {
            if start.contains(',') {
                return Err(Error::format(text, "a repeat takes a single start beat"));
            }
            let first = self.time.musical_beats_of(Position {
                bar,
                beat: parse_beat(start)?,
            });

            let (count, step) = match repeat.split_once('@') {
                Some((count, step)) => (count, parse_number(step)?),
                None => (repeat, self.state.duration),
            };
            let count = parse_count(count, text)?;
            if step <= 0.0 {
                return Err(Error::range(format!(
                    "repeat step must be greater than 0 in {}",
                    text
                )));
            }

            return Ok((0..count).map(|i| first + i as f64 * step).collect());
        }

        beats
            .split(',')
            .map(|beat| -> barbeat_core::Result<f64> {
                let beat = parse_beat(beat)?;
                Ok(self.time.musical_beats_of(Position { bar, beat }))
            })
            .collect()
    }

    fn place(&mut self, text: &str, offsets: &[f64]) -> barbeat_core::Result<()> {
        if self.pending.is_empty() {
            return Err(Error::format(text, "position has no pitch before it"));
        }

        for &offset in offsets {
            for pending in &self.pending {
                self.notes
                    .push(pending.state.note_at(pending.pitch, offset, &self.time));
            }
        }
        self.placed = true;
        Ok(())
    }
}

fn parse_whole(part: &str, text: &str, what: &str) -> barbeat_core::Result<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::format(text, format!("{} is not a whole number", what)));
    }
    part.parse()
        .map_err(|_| Error::format(text, format!("{} is not a whole number", what)))
}

fn parse_count(part: &str, text: &str) -> barbeat_core::Result<u32> {
    let count = parse_whole(part, text, "repeat count")?;
    if count == 0 || count as usize > MAX_REPEAT_COUNT {
        return Err(Error::range(format!(
            "repeat count must be 1-{}, got {}",
            MAX_REPEAT_COUNT, count
        )));
    }
    Ok(count)
}

/// `v80` or `v80-100`, returned as (min, max).
fn parse_velocity(text: &str) -> barbeat_core::Result<(f64, f64)> {
    let body = &text[1..];
    let (min, max) = match body.split_once('-') {
        Some((min, max)) => (
            parse_whole(min, text, "velocity")?,
            parse_whole(max, text, "velocity")?,
        ),
        None => {
            let velocity = parse_whole(body, text, "velocity")?;
            (velocity, velocity)
        }
    };

    let (min, max) = (min as f64, max as f64);
    for value in [min, max] {
        if !(MIN_VELOCITY..=MAX_VELOCITY).contains(&value) {
            return Err(Error::range(format!("velocity must be 1-127, got {}", value)));
        }
    }
    if max < min {
        return Err(Error::range(format!(
            "velocity range {} has its maximum below its minimum",
            text
        )));
    }

    Ok((min, max))
}

fn parse_probability(text: &str) -> barbeat_core::Result<f64> {
    let body = &text[1..];
    if body.contains('/') || body.contains('+') {
        return Err(Error::format(text, "probability is written as a decimal"));
    }
    let probability = parse_number(body)?;
    if probability > 1.0 {
        return Err(Error::range(format!(
            "probability must be between 0 and 1, got {}",
            body
        )));
    }
    Ok(probability)
}
