//! Note events to bar|beat notation.

use barbeat_core::{midi_to_name, NotationOptions, NoteEvent, Position, TimeContext};
use log::trace;

use crate::drums::encode_drums;
use crate::error::Result;
use crate::grouping::{format_positions, group_by_position, sort_notes};
use crate::merge::merge_groups;
use crate::state::{uniform_state, PerformanceState};

/// Serialize notes to the shortest notation that interprets back to them.
///
/// An empty note list gives an empty string. The only failure besides bad
/// options is a pitch outside the MIDI range.
pub fn serialize(notes: &[NoteEvent], options: &NotationOptions) -> Result<String> {
    let time = options.resolve()?;
    if notes.is_empty() {
        return Ok(String::new());
    }

    let sorted = sort_notes(notes);
    let mut tokens = Vec::new();
    let state = PerformanceState::default();

    if options.drum_mode {
        encode_drums(&sorted, &time, state, &mut tokens)?;
    } else {
        encode_melodic(&sorted, &time, state, &mut tokens)?;
    }

    trace!("serialized {} notes into {} tokens", notes.len(), tokens.len());
    Ok(tokens.join(" "))
}

/// Encode time-sorted notes position by position, comma-merging identical
/// groups within a bar.
fn encode_melodic(
    sorted: &[&NoteEvent],
    time: &TimeContext,
    mut state: PerformanceState,
    out: &mut Vec<String>,
) -> Result<PerformanceState> {
    let groups = group_by_position(sorted, time);

    for batch in merge_groups(&groups) {
        let lead = &groups[batch.lead()];

        if uniform_state(&lead.notes) {
            let (next, changes) = state.transition(lead.notes[0], time);
            state = next;
            out.extend(changes);
            for note in &lead.notes {
                out.push(midi_to_name(note.pitch)?);
            }
        } else {
            for note in &lead.notes {
                let (next, changes) = state.transition(note, time);
                state = next;
                out.extend(changes);
                out.push(midi_to_name(note.pitch)?);
            }
        }

        let positions: Vec<Position> = batch.groups.iter().map(|&g| groups[g].position()).collect();
        out.extend(format_positions(&positions));
    }

    Ok(state)
}
