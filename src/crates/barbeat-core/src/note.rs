use serde::{Deserialize, Serialize};

fn default_probability() -> f64 {
    1.0
}

/// A single note as exchanged with the host performance API.
///
/// Times and durations are in performance beats (quarter notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch: u8,
    pub start_time: f64,
    pub duration: f64,
    pub velocity: f64,
    #[serde(default)]
    pub velocity_deviation: f64,
    #[serde(default = "default_probability")]
    pub probability: f64,
}

impl NoteEvent {
    /// Note with default probability and no velocity spread.
    pub fn new(pitch: u8, start_time: f64, duration: f64, velocity: f64) -> Self {
        NoteEvent {
            pitch,
            start_time,
            duration,
            velocity,
            velocity_deviation: 0.0,
            probability: 1.0,
        }
    }

    pub fn with_deviation(mut self, velocity_deviation: f64) -> Self {
        self.velocity_deviation = velocity_deviation;
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }
}
