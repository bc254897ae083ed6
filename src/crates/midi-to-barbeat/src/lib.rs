//! MIDI to bar|beat converter library
//!
//! Reads a Standard MIDI File into note events (times in quarter-note beats)
//! and renders each track as one line of notation.

pub mod drums;
pub mod midi;
pub mod output;

pub use midi::{MidiData, TrackInfo};
pub use output::{render_tracks, RenderOptions, RenderedTrack};
