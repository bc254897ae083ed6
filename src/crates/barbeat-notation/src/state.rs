//! Performance state carried across the token stream.
//!
//! The serializer only writes a `v`, `t` or `p` token when the value it
//! describes changes, and the interpreter applies each of those tokens to
//! every following pitch. Both sides start every pass from the same default.

use barbeat_core::{format_plain_decimal, format_unsigned, NoteEvent, TimeContext};

/// Tolerance used when comparing durations and probabilities.
pub const STATE_EPSILON: f64 = 0.001;

pub const DEFAULT_VELOCITY: f64 = 100.0;
pub const MIN_VELOCITY: f64 = 1.0;
pub const MAX_VELOCITY: f64 = 127.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceState {
    pub velocity: f64,
    pub velocity_deviation: f64,
    /// Duration in musical beats
    pub duration: f64,
    pub probability: f64,
}

impl Default for PerformanceState {
    fn default() -> Self {
        PerformanceState {
            velocity: DEFAULT_VELOCITY,
            velocity_deviation: 0.0,
            duration: 1.0,
            probability: 1.0,
        }
    }
}

/// Whether two notes carry the same performance state.
pub fn same_state(a: &NoteEvent, b: &NoteEvent) -> bool {
    a.velocity.round() == b.velocity.round()
        && a.velocity_deviation.round() == b.velocity_deviation.round()
        && (a.duration - b.duration).abs() <= STATE_EPSILON
        && (a.probability - b.probability).abs() <= STATE_EPSILON
}

/// Whether every note in the slice shares the first note's state.
pub fn uniform_state(notes: &[&NoteEvent]) -> bool {
    match notes.split_first() {
        Some((first, rest)) => rest.iter().all(|note| same_state(first, note)),
        None => true,
    }
}

impl PerformanceState {
    fn velocity_max(&self) -> f64 {
        (self.velocity + self.velocity_deviation).min(MAX_VELOCITY)
    }

    /// Move to the state of `note`, returning the new state and the tokens
    /// (velocity, duration, probability, in that order) needed to get there.
    pub fn transition(
        self,
        note: &NoteEvent,
        time: &TimeContext,
    ) -> (PerformanceState, Vec<String>) {
        let mut next = self;
        let mut tokens = Vec::new();

        let velocity = note.velocity.round().clamp(MIN_VELOCITY, MAX_VELOCITY);
        let deviation = note.velocity_deviation.round();

        if deviation > 0.0 {
            let max = (velocity + deviation).min(MAX_VELOCITY);
            if velocity != self.velocity || max != self.velocity_max() {
                if velocity == max {
                    tokens.push(format!("v{}", velocity));
                } else {
                    tokens.push(format!("v{}-{}", velocity, max));
                }
                next.velocity = velocity;
                next.velocity_deviation = max - velocity;
            }
        } else if velocity != self.velocity || self.velocity_deviation != 0.0 {
            tokens.push(format!("v{}", velocity));
            next.velocity = velocity;
            next.velocity_deviation = 0.0;
        }

        let duration = time.to_musical(note.duration);
        if (duration - self.duration).abs() > STATE_EPSILON {
            tokens.push(format!("t{}", format_unsigned(duration)));
            next.duration = duration;
        }

        if (note.probability - self.probability).abs() > STATE_EPSILON {
            tokens.push(format!("p{}", format_plain_decimal(note.probability)));
            next.probability = note.probability;
        }

        (next, tokens)
    }

    pub fn with_velocity(self, min: f64, max: f64) -> Self {
        PerformanceState {
            velocity: min,
            velocity_deviation: max - min,
            ..self
        }
    }

    pub fn with_duration(self, duration: f64) -> Self {
        PerformanceState { duration, ..self }
    }

    pub fn with_probability(self, probability: f64) -> Self {
        PerformanceState {
            probability,
            ..self
        }
    }

    /// Stamp a pitch with this state at a musical-beat start time.
    pub fn note_at(&self, pitch: u8, musical_start: f64, time: &TimeContext) -> NoteEvent {
        NoteEvent {
            pitch,
            start_time: time.to_performance(musical_start),
            duration: time.to_performance(self.duration),
            velocity: self.velocity,
            velocity_deviation: self.velocity_deviation,
            probability: self.probability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barbeat_core::NotationOptions;

    fn note(velocity: f64, duration: f64) -> NoteEvent {
        NoteEvent::new(60, 0.0, duration, velocity)
    }

    #[test]
    fn test_default_state_emits_nothing() {
        let time = TimeContext::default();
        let (_, tokens) = PerformanceState::default().transition(&note(100.0, 1.0), &time);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_tokens_in_fixed_order() {
        let time = TimeContext::default();
        let n = note(80.0, 0.5).with_probability(0.8);
        let (state, tokens) = PerformanceState::default().transition(&n, &time);
        assert_eq!(tokens, vec!["v80", "t/2", "p0.8"]);

        let (_, tokens) = state.transition(&n, &time);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_velocity_range() {
        let time = TimeContext::default();
        let n = note(80.0, 1.0).with_deviation(20.0);
        let (state, tokens) = PerformanceState::default().transition(&n, &time);
        assert_eq!(tokens, vec!["v80-100"]);
        assert_eq!(state.velocity_deviation, 20.0);

        // dropping the spread must be written even though the base velocity is unchanged
        let (state, tokens) = state.transition(&note(80.0, 1.0), &time);
        assert_eq!(tokens, vec!["v80"]);
        assert_eq!(state.velocity_deviation, 0.0);
    }

    #[test]
    fn test_velocity_range_is_capped() {
        let time = TimeContext::default();
        let n = note(120.0, 1.0).with_deviation(20.0);
        let (state, tokens) = PerformanceState::default().transition(&n, &time);
        assert_eq!(tokens, vec!["v120-127"]);
        assert_eq!(state.velocity_deviation, 7.0);
    }

    #[test]
    fn test_duration_in_musical_beats() {
        let time = NotationOptions::with_time_signature(6, 8).resolve().unwrap();
        let (state, tokens) = PerformanceState::default().transition(&note(100.0, 1.5), &time);
        assert_eq!(tokens, vec!["t3"]);
        assert_eq!(state.duration, 3.0);
    }

    #[test]
    fn test_small_changes_are_ignored() {
        let time = TimeContext::default();
        let (_, tokens) = PerformanceState::default().transition(&note(100.0, 1.0005), &time);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_same_state() {
        let a = note(80.0, 1.0);
        let b = note(80.2, 1.0004);
        assert!(same_state(&a, &b));
        assert!(!same_state(&a, &b.clone().with_probability(0.5)));
        assert!(uniform_state(&[&a, &note(80.0, 1.0)]));
        assert!(!uniform_state(&[&a, &note(90.0, 1.0)]));
    }
}
