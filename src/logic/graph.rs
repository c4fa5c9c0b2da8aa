//! Match graph helpers shared by the updater, the reset engine and readers.

use crate::models::{BracketError, Id, Match, MatchStatus, Stage};
use crate::storage::{Record, Storage};
use std::collections::BTreeMap;

pub(crate) fn load<R: Record, S: Storage>(storage: &S, id: Id) -> Result<R, BracketError> {
    storage
        .select_by_id::<R>(id)?
        .ok_or(BracketError::NotFound { table: R::TABLE, id })
}

pub(crate) fn load_match<S: Storage>(storage: &S, id: Id) -> Result<Match, BracketError> {
    load::<Match, S>(storage, id)
}

pub(crate) fn load_stage<S: Storage>(storage: &S, id: Id) -> Result<Stage, BracketError> {
    load::<Stage, S>(storage, id)
}

/// Downstream matches touched by one operation, loaded once and written back together.
pub(crate) struct Touched<'a, S> {
    storage: &'a S,
    matches: BTreeMap<Id, Match>,
}

impl<'a, S: Storage> Touched<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self {
            storage,
            matches: BTreeMap::new(),
        }
    }

    pub fn get_mut(&mut self, id: Id) -> Result<&mut Match, BracketError> {
        if !self.matches.contains_key(&id) {
            let loaded = load_match(self.storage, id)?;
            self.matches.insert(id, loaded);
        }
        self.matches
            .get_mut(&id)
            .ok_or(BracketError::NotFound {
                table: Match::TABLE,
                id,
            })
    }

    /// Changed matches in id order.
    pub fn into_matches(self) -> Vec<Match> {
        self.matches.into_values().collect()
    }
}

/// Whether a downstream match already holds a participant this match sent it.
pub(crate) fn is_consumed<S: Storage>(storage: &S, source: &Match) -> Result<bool, BracketError> {
    for edge in [source.winner_to, source.loser_to].into_iter().flatten() {
        let target = load_match(storage, edge.match_id)?;
        if target.opponent(edge.side).is_assigned() {
            return Ok(true);
        }
    }
    if let Some(reset) = source.reset_to {
        let target = load_match(storage, reset)?;
        if target.opponent1.is_assigned() || target.opponent2.is_assigned() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Derived status of a match.
pub(crate) fn status<S: Storage>(storage: &S, m: &Match) -> Result<MatchStatus, BracketError> {
    if m.has_bye() {
        return Ok(MatchStatus::Bye);
    }
    let status = match (m.opponent1.is_assigned(), m.opponent2.is_assigned()) {
        (false, false) => MatchStatus::Empty,
        (true, false) | (false, true) => MatchStatus::Waiting,
        (true, true) if !m.is_decided() && m.has_progress() => MatchStatus::Running,
        (true, true) if !m.is_decided() => MatchStatus::Ready,
        (true, true) if is_consumed(storage, m)? => MatchStatus::Locked,
        (true, true) => MatchStatus::Completed,
    };
    Ok(status)
}
