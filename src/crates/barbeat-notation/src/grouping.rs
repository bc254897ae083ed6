//! Time grouping: notes that land on the same bar|beat position.

use barbeat_core::{format_position_beat, NoteEvent, Position, TimeContext};

/// Beats closer than this are treated as the same position.
pub const BEAT_EPSILON: f64 = 0.001;

#[derive(Debug, Clone)]
pub struct TimeGroup<'a> {
    pub bar: u32,
    pub beat: f64,
    pub notes: Vec<&'a NoteEvent>,
}

impl TimeGroup<'_> {
    pub fn position(&self) -> Position {
        Position {
            bar: self.bar,
            beat: self.beat,
        }
    }
}

/// Stable sort by start time, then pitch.
pub fn sort_notes(notes: &[NoteEvent]) -> Vec<&NoteEvent> {
    let mut sorted: Vec<&NoteEvent> = notes.iter().collect();
    sorted.sort_by(|a, b| {
        a.start_time
            .total_cmp(&b.start_time)
            .then(a.pitch.cmp(&b.pitch))
    });
    sorted
}

/// Split a sorted note list into groups sharing one position.
pub fn group_by_position<'a>(sorted: &[&'a NoteEvent], time: &TimeContext) -> Vec<TimeGroup<'a>> {
    let mut groups: Vec<TimeGroup<'a>> = Vec::new();

    for &note in sorted {
        let position = time.position_of(note.start_time);

        match groups.last_mut() {
            Some(group)
                if group.bar == position.bar
                    && (group.beat - position.beat).abs() <= BEAT_EPSILON =>
            {
                group.notes.push(note);
            }
            _ => groups.push(TimeGroup {
                bar: position.bar,
                beat: position.beat,
                notes: vec![note],
            }),
        }
    }

    groups
}

/// Render positions as `bar|beat[,beat...]`, one token per run of positions
/// in the same bar.
pub fn format_positions(positions: &[Position]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < positions.len() {
        let bar = positions[i].bar;
        let mut beats = Vec::new();
        while i < positions.len() && positions[i].bar == bar {
            beats.push(format_position_beat(positions[i].beat));
            i += 1;
        }
        tokens.push(format!("{}|{}", bar, beats.join(",")));
    }

    tokens
}
