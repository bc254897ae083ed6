//! Drum-mode encoding: one entry per pitch rather than per time slot.
//!
//! Each pitch's hits are split into runs that share performance state. A run
//! of evenly spaced hits can be written as `start x count [@step]` when that
//! is shorter than listing every position, so a 16th-note hi-hat bar becomes
//! `Gb1 1|1x16`.

use barbeat_core::{format_unsigned, midi_to_name, NoteEvent, Position, TimeContext};
use log::{debug, trace};

use crate::error::Result;
use crate::grouping::format_positions;
use crate::state::{same_state, PerformanceState};

/// Tolerance on the spacing between hits of a repeat pattern.
pub const REPEAT_TOLERANCE: f64 = 0.002;

/// Minimum number of hits before a repeat pattern is considered.
pub const MIN_REPEAT_COUNT: usize = 3;

/// Most hits a single repeat token may stand for; longer runs are listed.
pub const MAX_REPEAT_COUNT: usize = 10_000;

/// Spacing this close to the current duration is left implicit.
const STEP_EPSILON: f64 = 1e-6;

/// An arithmetic run of musical-beat positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatInfo {
    pub count: usize,
    pub step: f64,
}

/// How the positions of a run are written.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionStyle {
    Repeat(RepeatInfo),
    Explicit,
}

/// Detect evenly spaced musical-beat offsets (at least three, step > 0,
/// no more than `MAX_REPEAT_COUNT`).
pub fn detect_repeat(offsets: &[f64]) -> Option<RepeatInfo> {
    if offsets.len() < MIN_REPEAT_COUNT || offsets.len() > MAX_REPEAT_COUNT {
        return None;
    }

    let first_step = offsets[1] - offsets[0];
    if first_step <= 0.0 {
        return None;
    }

    let evenly_spaced = offsets
        .windows(2)
        .all(|pair| ((pair[1] - pair[0]) - first_step).abs() <= REPEAT_TOLERANCE);
    if !evenly_spaced {
        return None;
    }

    let count = offsets.len();
    Some(RepeatInfo {
        count,
        step: (offsets[count - 1] - offsets[0]) / (count - 1) as f64,
    })
}

/// Render a repeat token. The step is omitted when it equals the current duration.
pub fn format_repeat(start: Position, repeat: RepeatInfo, current_duration: f64) -> String {
    if (repeat.step - current_duration).abs() < STEP_EPSILON {
        format!("{}x{}", start, repeat.count)
    } else {
        format!("{}x{}@{}", start, repeat.count, format_unsigned(repeat.step))
    }
}

/// A repeat token is only used when it is strictly shorter than the explicit list.
pub fn choose_position_style(repeat: Option<(RepeatInfo, &str)>, explicit: &str) -> PositionStyle {
    match repeat {
        Some((info, text)) if text.len() < explicit.len() => PositionStyle::Repeat(info),
        _ => PositionStyle::Explicit,
    }
}

/// Group notes by pitch in order of first appearance.
fn group_by_pitch<'a>(sorted: &[&'a NoteEvent]) -> Vec<Vec<&'a NoteEvent>> {
    let mut groups: Vec<Vec<&'a NoteEvent>> = Vec::new();
    for &note in sorted {
        match groups.iter_mut().find(|g| g[0].pitch == note.pitch) {
            Some(group) => group.push(note),
            None => groups.push(vec![note]),
        }
    }
    groups
}

/// Split one pitch's hits into maximal runs of identical state.
fn state_runs<'a>(hits: &[&'a NoteEvent]) -> Vec<Vec<&'a NoteEvent>> {
    let mut runs: Vec<Vec<&'a NoteEvent>> = Vec::new();
    for &note in hits {
        match runs.last_mut() {
            Some(run) if same_state(run[0], note) => run.push(note),
            _ => runs.push(vec![note]),
        }
    }
    runs
}

/// Encode time-sorted notes in drum mode, appending tokens to `out`.
pub fn encode_drums(
    sorted: &[&NoteEvent],
    time: &TimeContext,
    mut state: PerformanceState,
    out: &mut Vec<String>,
) -> Result<PerformanceState> {
    for hits in group_by_pitch(sorted) {
        let name = midi_to_name(hits[0].pitch)?;

        for run in state_runs(&hits) {
            let (next, changes) = state.transition(run[0], time);
            state = next;
            out.extend(changes);
            out.push(name.clone());

            let positions: Vec<Position> =
                run.iter().map(|n| time.position_of(n.start_time)).collect();
            let offsets: Vec<f64> = positions.iter().map(|p| time.musical_beats_of(*p)).collect();
            let explicit = format_positions(&positions);
            let explicit_text = explicit.join(" ");

            let repeat = detect_repeat(&offsets)
                .map(|info| (info, format_repeat(positions[0], info, state.duration)));

            let candidate = repeat.as_ref().map(|(i, t)| (*i, t.as_str()));
            match choose_position_style(candidate, &explicit_text) {
                PositionStyle::Repeat(info) => {
                    debug!(
                        "{}: {} hits written as a repeat of step {}",
                        name, info.count, info.step
                    );
                    if let Some((_, text)) = repeat {
                        out.push(text);
                    }
                }
                PositionStyle::Explicit => {
                    trace!("{}: {} hits written explicitly", name, run.len());
                    out.extend(explicit);
                }
            }
        }
    }

    Ok(state)
}
