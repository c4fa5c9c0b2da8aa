//! Swiss rounds after the first: paired from the standings once the
//! previous round is decided.

use crate::logic::graph;
use crate::logic::standings::tally;
use crate::models::{BracketError, Group, Id, Match, Opponent, ParticipantId, Round, StageType};
use crate::storage::{Field, Filter, Storage};
use std::collections::HashSet;

/// Next round of one group, computed before anything is written.
struct PlannedRound {
    group_id: Id,
    number: u32,
    pairs: Vec<(ParticipantId, Option<ParticipantId>)>,
}

/// Create the next round in every group of a swiss stage. Returns the ids of
/// the created rounds, empty once every group has played its round count.
pub fn generate_next_swiss_round<S: Storage>(
    storage: &mut S,
    stage_id: Id,
) -> Result<Vec<Id>, BracketError> {
    let stage = graph::load_stage(storage, stage_id)?;
    if stage.stage_type != StageType::Swiss {
        return Err(BracketError::Validation(format!(
            "Stage {stage_id} is a {} stage, not a swiss stage",
            stage.stage_type
        )));
    }

    let mut groups: Vec<Group> = storage.select(&Filter::by(Field::StageId, stage_id))?;
    groups.sort_by_key(|g| g.number);
    let mut planned = Vec::new();
    for group in &groups {
        let rounds: Vec<Round> = storage.select(&Filter::by(Field::GroupId, group.id))?;
        let matches: Vec<Match> = storage.select(&Filter::by(Field::GroupId, group.id))?;
        let Some(latest) = rounds.iter().max_by_key(|r| r.number) else {
            continue;
        };
        if matches
            .iter()
            .any(|m| m.round_id == latest.id && !m.has_bye() && !m.is_decided())
        {
            return Err(BracketError::Validation(format!(
                "Round {} of group {} still has undecided matches",
                latest.number, group.number
            )));
        }

        let rows = tally(&matches);
        let round_count = stage
            .settings
            .round_count
            .unwrap_or_else(|| default_round_count(rows.len()));
        if latest.number >= round_count {
            continue;
        }
        let ranked: Vec<ParticipantId> = rows.iter().map(|r| r.id).collect();
        planned.push(PlannedRound {
            group_id: group.id,
            number: latest.number + 1,
            pairs: pair_by_standings(&ranked, &matches),
        });
    }

    let mut created = Vec::with_capacity(planned.len());
    for round in planned {
        let round_id = storage.insert(Round {
            id: 0,
            stage_id,
            group_id: round.group_id,
            number: round.number,
        })?;
        for (number, (a, b)) in (1..).zip(&round.pairs) {
            storage.insert(Match {
                id: 0,
                stage_id,
                group_id: round.group_id,
                round_id,
                number,
                opponent1: Opponent::participant(*a),
                opponent2: b.map_or(Opponent::Bye, Opponent::participant),
                winner_to: None,
                loser_to: None,
                reset_to: None,
            })?;
        }
        log::info!(
            "Swiss stage {}: created round {} with {} match(es)",
            stage_id,
            round.number,
            round.pairs.len()
        );
        created.push(round_id);
    }
    Ok(created)
}

/// Enough rounds to leave a single undefeated participant.
fn default_round_count(participants: usize) -> u32 {
    participants.next_power_of_two().trailing_zeros()
}

/// Pair participants by rank, each with the best ranked opponent they have not
/// met. Rematches only happen when no pairing without one exists. With an odd
/// count the lowest ranked participant without a BYE sits out.
fn pair_by_standings(
    ranked: &[ParticipantId],
    history: &[Match],
) -> Vec<(ParticipantId, Option<ParticipantId>)> {
    let mut met: HashSet<(ParticipantId, ParticipantId)> = HashSet::new();
    let mut had_bye: HashSet<ParticipantId> = HashSet::new();
    for m in history {
        match (m.opponent1.id(), m.opponent2.id()) {
            (Some(a), Some(b)) => {
                met.insert((a.min(b), a.max(b)));
            }
            (Some(id), None) | (None, Some(id)) if m.has_bye() => {
                had_bye.insert(id);
            }
            _ => {}
        }
    }

    let mut remaining = ranked.to_vec();
    let mut bye = None;
    if remaining.len() % 2 == 1 {
        let index = remaining
            .iter()
            .rposition(|id| !had_bye.contains(id))
            .unwrap_or(remaining.len() - 1);
        bye = Some(remaining.remove(index));
    }

    let mut budget = PAIRING_SEARCH_LIMIT;
    let mut pairs: Vec<(ParticipantId, Option<ParticipantId>)> =
        match pair_unmet(&remaining, &met, &mut budget) {
            Some(found) => found.into_iter().map(|(a, b)| (a, Some(b))).collect(),
            None => remaining
                .chunks(2)
                .filter_map(|pair| match pair {
                    [a, b] => Some((*a, Some(*b))),
                    _ => None,
                })
                .collect(),
        };
    if let Some(id) = bye {
        pairs.push((id, None));
    }
    pairs
}

/// Candidate pairings tried before giving up on avoiding rematches.
const PAIRING_SEARCH_LIMIT: usize = 10_000;

/// Depth-first search for a pairing without rematches, trying the best ranked
/// candidates first. Backtracking is exponential in the worst case, so each
/// tried pairing spends one unit of `budget` and the search gives up at zero.
fn pair_unmet(
    remaining: &[ParticipantId],
    met: &HashSet<(ParticipantId, ParticipantId)>,
    budget: &mut usize,
) -> Option<Vec<(ParticipantId, ParticipantId)>> {
    let Some((&first, rest)) = remaining.split_first() else {
        return Some(Vec::new());
    };
    for (index, &other) in rest.iter().enumerate() {
        if met.contains(&(first.min(other), first.max(other))) {
            continue;
        }
        if *budget == 0 {
            return None;
        }
        *budget -= 1;
        let mut left = rest.to_vec();
        left.remove(index);
        if let Some(mut tail) = pair_unmet(&left, met, budget) {
            tail.insert(0, (first, other));
            return Some(tail);
        }
    }
    None
}
