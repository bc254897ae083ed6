use anyhow::{Context, Result};
use barbeat_core::{NotationOptions, NoteEvent};
use barbeat_notation::serialize;
use log::info;
use serde::Serialize;

use crate::drums::is_drum_track;
use crate::midi::{MidiData, TrackInfo};

/// How MIDI tracks become notation.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Snap starts and durations to 1/grid of a beat; 0 keeps raw tick timing
    pub grid: u32,
    pub detect_drum_names: bool,
    pub forced_drum_channels: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedTrack {
    pub name: String,
    /// 1-based MIDI channel
    pub channel: u8,
    pub drums: bool,
    pub notation: String,
}

/// Render every track with notes as one line of notation.
pub fn render_tracks(midi: &MidiData, options: &RenderOptions) -> Result<Vec<RenderedTrack>> {
    midi.tracks
        .iter()
        .map(|track| render_track(track, midi.time_signature, options))
        .collect()
}

fn render_track(
    track: &TrackInfo,
    time_signature: Option<(u32, u32)>,
    options: &RenderOptions,
) -> Result<RenderedTrack> {
    let drums = is_drum_track(
        track.channel,
        track.name.as_deref(),
        &options.forced_drum_channels,
        options.detect_drum_names,
    );

    let mut notation_options = match time_signature {
        Some((numerator, denominator)) => {
            NotationOptions::with_time_signature(numerator, denominator)
        }
        None => NotationOptions::default(),
    };
    notation_options.drum_mode = drums;

    let notes: Vec<NoteEvent> = track.notes.iter().map(|n| quantize(n, options.grid)).collect();
    let notation = serialize(&notes, &notation_options)
        .with_context(|| format!("Failed to encode {}", track.label()))?;

    info!(
        "{} (channel {}): {} notes{}",
        track.label(),
        track.channel + 1,
        notes.len(),
        if drums { ", drums" } else { "" }
    );

    Ok(RenderedTrack {
        name: track.label(),
        channel: track.channel + 1,
        drums,
        notation,
    })
}

fn quantize(note: &NoteEvent, grid: u32) -> NoteEvent {
    if grid == 0 {
        return note.clone();
    }
    let grid = grid as f64;
    let steps = (note.duration * grid).round().max(1.0);
    NoteEvent {
        start_time: (note.start_time * grid).round() / grid,
        duration: steps / grid,
        ..note.clone()
    }
}
