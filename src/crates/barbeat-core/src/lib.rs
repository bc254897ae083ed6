//! Core types for barbeat notation
//!
//! This crate holds the leaf pieces of the bar|beat codec: the note value
//! type, the pitch-name table, the numeric formatter that chooses between
//! decimal and fraction text, and the conversion between performance beats
//! and bar|beat positions.
//!
//! # Examples
//!
//! ```
//! use barbeat_core::{format_position_beat, NotationOptions};
//!
//! let time = NotationOptions::default().resolve().unwrap();
//! assert_eq!(time.beats_to_bar_beat(5.5), "2|2.5");
//! assert_eq!(format_position_beat(1.0 + 1.0 / 3.0), "1+1/3");
//! ```

pub mod error;
pub mod note;
pub mod numeric;
pub mod pitch;
pub mod timing;

pub use error::{Error, ErrorKind, Result};
pub use note::NoteEvent;
pub use numeric::{
    choose_style, format_plain_decimal, format_position_beat, format_unsigned, parse_number,
    NumberStyle, ValueMode,
};
pub use pitch::{midi_to_name, name_to_midi};
pub use timing::{
    parse_bar, parse_beat, parse_position, NotationOptions, Position, TimeContext,
    COLON_IN_POSITION, PIPE_IN_DURATION,
};
