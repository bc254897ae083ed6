//! Comma merging of identical time groups within a bar.
//!
//! Groups with the same pitch sequence and per-note state in one bar are
//! written once with a comma list of beats, e.g. `C3 1|1,3`.

use log::debug;

use crate::grouping::TimeGroup;
use crate::state::same_state;

/// Indices of the time groups written together under one position token.
/// The first index is the batch's lead group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeBatch {
    pub groups: Vec<usize>,
}

impl MergeBatch {
    pub fn lead(&self) -> usize {
        self.groups[0]
    }
}

/// Whether two groups have matching pitches and state, note by note.
pub fn groups_match(a: &TimeGroup, b: &TimeGroup) -> bool {
    a.notes.len() == b.notes.len()
        && a
            .notes
            .iter()
            .zip(b.notes.iter())
            .all(|(x, y)| x.pitch == y.pitch && same_state(x, y))
}

/// Assign every group to exactly one batch, scanning forward only within the
/// lead group's bar.
pub fn merge_groups(groups: &[TimeGroup]) -> Vec<MergeBatch> {
    let mut consumed = vec![false; groups.len()];
    let mut batches = Vec::new();

    for i in 0..groups.len() {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;
        let mut batch = MergeBatch { groups: vec![i] };

        for j in (i + 1)..groups.len() {
            if groups[j].bar != groups[i].bar {
                break;
            }
            if !consumed[j] && groups_match(&groups[i], &groups[j]) {
                consumed[j] = true;
                batch.groups.push(j);
            }
        }

        if batch.groups.len() > 1 {
            debug!(
                "merged {} groups in bar {}",
                batch.groups.len(),
                groups[i].bar
            );
        }
        batches.push(batch);
    }

    batches
}
