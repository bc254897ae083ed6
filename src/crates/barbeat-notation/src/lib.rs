//! Bar|beat notation for note events
//!
//! This crate turns lists of note events into compact text and back again.
//! The two directions are exact inverses: interpreting serialized text gives
//! back the same notes.
//!
//! # Examples
//!
//! ```
//! use barbeat_core::{NotationOptions, NoteEvent};
//! use barbeat_notation::{interpret, serialize};
//!
//! let notes = vec![
//!     NoteEvent::new(60, 0.0, 1.0, 100.0),
//!     NoteEvent::new(60, 2.0, 1.0, 100.0),
//! ];
//! let options = NotationOptions::default();
//!
//! let text = serialize(&notes, &options).unwrap();
//! assert_eq!(text, "C3 1|1,3");
//! assert_eq!(interpret(&text, &options).unwrap(), notes);
//! ```
//!
//! # Notation
//!
//! - Velocity: `v80`, or a random range `v80-100`
//! - Duration in beats: `t2`, `t/4`, `t1+1/2`, or `t1:2` (bars:beats)
//! - Probability: `p0.5`
//! - Pitches: `C3`, `Gb1`, `F#2` (MIDI 60 is `C3`)
//! - Positions: `1|1`, several beats in one bar `1|1,2.5,4`
//! - Repeats (drum mode): `1|1x16` or `1|1x4@2`
//!
//! State tokens carry forward until changed. Pitches collect until a
//! position places them; a position right after another position places
//! the same pitches again.

pub mod drums;
pub mod error;
pub mod grouping;
pub mod interpreter;
pub mod lexer;
pub mod merge;
pub mod serializer;
pub mod state;


pub use error::{NotationError, Result};
pub use interpreter::{interpret, Interpreter};
pub use lexer::{Lexer, Span, Token};
pub use serializer::serialize;
pub use state::PerformanceState;

use barbeat_core::NotationOptions;

/// Rewrite notation in its canonical, shortest form.
pub fn normalize(text: &str, options: &NotationOptions) -> Result<String> {
    let notes = interpret(text, options)?;
    serialize(&notes, options)
}
