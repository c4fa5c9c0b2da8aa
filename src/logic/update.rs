//! Result updater: validates a reported result and propagates it forward.

use crate::logic::graph::{self, Touched};
use crate::models::{
    BracketError, Id, Match, MatchResult, MatchStatus, MatchUpdate, Opponent, ParticipantId,
    ParticipantResult, Side, SlotRef,
};
use crate::storage::Storage;
use std::collections::VecDeque;

/// Report scores and/or a result for a match.
///
/// Elimination matches need exactly one winner and then send the winner (and
/// in double elimination the loser) on to the matches they feed. Round robin
/// and swiss matches accept score-only updates and draws, and never propagate.
pub fn update_match<S: Storage>(
    storage: &mut S,
    match_id: Id,
    patch: MatchUpdate,
) -> Result<(), BracketError> {
    let current = graph::load_match(storage, match_id)?;
    let stage = graph::load_stage(storage, current.stage_id)?;
    let elimination = stage.stage_type.is_elimination();

    match graph::status(storage, &current)? {
        MatchStatus::Locked => return Err(BracketError::MatchLocked(match_id)),
        MatchStatus::Bye => {
            return Err(BracketError::Validation(format!(
                "Match {match_id} has a BYE and cannot be reported"
            )))
        }
        MatchStatus::Empty | MatchStatus::Waiting => {
            return Err(BracketError::Validation(format!(
                "Match {match_id} is not ready: both opponents must be known"
            )))
        }
        MatchStatus::Ready | MatchStatus::Running | MatchStatus::Completed => {}
    }

    let mut updated = current.clone();
    apply_patch(&mut updated, &patch, elimination)?;

    let mut writes = Vec::new();
    if elimination {
        writes = propagate(storage, &updated)?;
    }
    writes.insert(0, updated);
    for record in &writes {
        storage.update(record.id, record)?;
    }
    log::debug!(
        "Updated match {} ({} downstream match(es) changed)",
        match_id,
        writes.len() - 1
    );
    Ok(())
}

/// Apply scores, then the resolved results, to a match held in memory.
fn apply_patch(m: &mut Match, patch: &MatchUpdate, elimination: bool) -> Result<(), BracketError> {
    let results = resolve_results(m, patch, elimination)?;
    // Without a reported result, new scores decide a round robin or swiss match.
    let rescored = !elimination
        && results.is_none()
        && Side::BOTH
            .iter()
            .any(|&side| patch.get(side).is_some_and(|u| u.score.is_some()));
    for side in Side::BOTH {
        let forfeit = patch.get(side).is_some_and(|u| u.forfeit);
        let Some(participant) = m.opponent_mut(side).as_participant_mut() else {
            continue;
        };
        if let Some(score) = patch.get(side).and_then(|u| u.score) {
            participant.score = Some(score);
        }
        if let Some((result1, result2)) = results {
            participant.result = Some(match side {
                Side::Opponent1 => result1,
                Side::Opponent2 => result2,
            });
            participant.forfeit = forfeit;
        } else if rescored {
            participant.result = None;
            participant.forfeit = false;
        }
    }
    Ok(())
}

/// Results for (opponent1, opponent2) after the patch, or `None` when the
/// patch reports no result and the match keeps what it had.
fn resolve_results(
    m: &Match,
    patch: &MatchUpdate,
    elimination: bool,
) -> Result<Option<(MatchResult, MatchResult)>, BracketError> {
    let forfeit1 = patch.opponent1.as_ref().is_some_and(|u| u.forfeit);
    let forfeit2 = patch.opponent2.as_ref().is_some_and(|u| u.forfeit);
    let reported1 = patch.opponent1.as_ref().and_then(|u| u.result);
    let reported2 = patch.opponent2.as_ref().and_then(|u| u.result);

    let (reported1, reported2) = match (forfeit1, forfeit2) {
        (true, true) => {
            return Err(BracketError::validation(
                "Both opponents cannot forfeit the same match",
            ))
        }
        (true, false) if reported1 != Some(MatchResult::Win) => {
            (Some(MatchResult::Loss), Some(MatchResult::Win))
        }
        (false, true) if reported2 != Some(MatchResult::Win) => {
            (Some(MatchResult::Win), Some(MatchResult::Loss))
        }
        (true, _) | (_, true) => {
            return Err(BracketError::validation(
                "An opponent who forfeits cannot win",
            ))
        }
        (false, false) => (reported1, reported2),
    };

    let resolved = match (reported1, reported2) {
        (None, None) => None,
        (Some(result), None) => Some((result, result.opposite())),
        (None, Some(result)) => Some((result.opposite(), result)),
        (Some(a), Some(b)) if a == b.opposite() => Some((a, b)),
        (Some(MatchResult::Win), Some(MatchResult::Win)) => {
            return Err(BracketError::validation("Both opponents cannot win"))
        }
        (Some(_), Some(_)) => {
            return Err(BracketError::validation(
                "The reported results contradict each other",
            ))
        }
    };

    if !elimination {
        return Ok(resolved);
    }
    match resolved {
        Some((MatchResult::Draw, _)) => Err(BracketError::validation(
            "Elimination matches cannot end in a draw",
        )),
        Some(results) => Ok(Some(results)),
        // A score correction keeps the winner already on record.
        None if m.winner_side().is_some() => Ok(None),
        None => Err(BracketError::validation(
            "Exactly one opponent must win an elimination match",
        )),
    }
}

/// Compute every downstream change caused by a decided elimination match.
///
/// Participants are pushed along forward edges with a worklist; a participant
/// landing next to a BYE keeps moving, so BYE chains resolve in one pass.
pub(crate) fn propagate<S: Storage>(storage: &S, source: &Match) -> Result<Vec<Match>, BracketError> {
    let Some(winner_side) = source.winner_side() else {
        return Ok(Vec::new());
    };
    let mut touched = Touched::new(storage);
    let mut queue: VecDeque<(SlotRef, ParticipantId)> = VecDeque::new();

    if let (Some(edge), Some(winner)) = (source.winner_to, source.opponent(winner_side).id()) {
        queue.push_back((edge, winner));
    }
    if let (Some(edge), Some(loser)) = (source.loser_to, source.opponent(winner_side.other()).id()) {
        queue.push_back((edge, loser));
    }

    while let Some((edge, participant)) = queue.pop_front() {
        let target = touched.get_mut(edge.match_id)?;
        let position = target.opponent(edge.side).position();
        *target.opponent_mut(edge.side) =
            Opponent::Assigned(ParticipantResult::new(participant, position));
        if target.opponent(edge.side.other()).is_bye() {
            if let Some(next) = target.winner_to {
                queue.push_back((next, participant));
            }
        }
    }

    if let Some(reset_id) = source.reset_to {
        let reset = touched.get_mut(reset_id)?;
        match winner_side {
            // The losers bracket champion forced a second match.
            Side::Opponent2 => {
                reset.opponent1 = participant_copy(&source.opponent1);
                reset.opponent2 = participant_copy(&source.opponent2);
            }
            Side::Opponent1 => {
                reset.opponent1 = Opponent::Bye;
                reset.opponent2 = Opponent::Bye;
            }
        }
    }

    Ok(touched.into_matches())
}

fn participant_copy(opponent: &Opponent) -> Opponent {
    match opponent.id() {
        Some(id) => Opponent::participant(id),
        None => Opponent::default(),
    }
}
