//! Reset engine: undo a reported result and the state derived from it.

use crate::logic::graph::{self, Touched};
use crate::models::{BracketError, Id, Opponent, SlotRef};
use crate::storage::Storage;
use std::collections::VecDeque;

/// Clear the scores and results of a match.
///
/// Downstream slots that received a participant from this match go back to
/// pending, following BYE auto-advances. Only one hop of reported state is
/// undone: if a match that received a participant already has a score or a
/// result, the reset fails with [`BracketError::MatchLocked`] and nothing is
/// written. Reset the downstream match first.
pub fn reset_match_results<S: Storage>(storage: &mut S, match_id: Id) -> Result<(), BracketError> {
    let current = graph::load_match(storage, match_id)?;
    if current.has_bye() {
        return Err(BracketError::Validation(format!(
            "Match {match_id} has a BYE and has no result to reset"
        )));
    }

    let mut cleared = current.clone();
    cleared.clear_results();

    let mut touched = Touched::new(&*storage);
    let mut queue: VecDeque<SlotRef> = [current.winner_to, current.loser_to]
        .into_iter()
        .flatten()
        .collect();
    while let Some(edge) = queue.pop_front() {
        let target = touched.get_mut(edge.match_id)?;
        if !target.opponent(edge.side).is_assigned() {
            continue;
        }
        if target.has_progress() {
            return Err(BracketError::MatchLocked(match_id));
        }
        let position = target.opponent(edge.side).position();
        *target.opponent_mut(edge.side) = Opponent::Pending { position };
        if target.opponent(edge.side.other()).is_bye() {
            if let Some(next) = target.winner_to {
                queue.push_back(next);
            }
        }
    }

    if let Some(reset_id) = current.reset_to {
        let reset = touched.get_mut(reset_id)?;
        if reset.has_progress() {
            return Err(BracketError::MatchLocked(match_id));
        }
        reset.opponent1 = Opponent::default();
        reset.opponent2 = Opponent::default();
    }

    let downstream = touched.into_matches();
    storage.update(cleared.id, &cleared)?;
    for record in &downstream {
        storage.update(record.id, record)?;
    }
    log::debug!(
        "Reset match {} ({} downstream match(es) reverted)",
        match_id,
        downstream.len()
    );
    Ok(())
}
