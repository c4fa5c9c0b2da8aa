//! Read-only views over stored stages.

use crate::logic::graph;
use crate::models::{
    BracketError, Group, Id, Match, MatchStatus, ParticipantId, Round, Stage, StageData, StageType,
};
use crate::storage::{Field, Filter, Storage};

/// A stage with all of its groups, rounds and matches.
pub fn stage_data<S: Storage>(storage: &S, stage_id: Id) -> Result<StageData, BracketError> {
    let stage = graph::load_stage(storage, stage_id)?;
    let filter = Filter::by(Field::StageId, stage_id);
    Ok(StageData {
        stage,
        groups: storage.select::<Group>(&filter)?,
        rounds: storage.select::<Round>(&filter)?,
        matches: storage.select::<Match>(&filter)?,
    })
}

/// Every stage of a tournament, by stage number.
pub fn tournament_data<S: Storage>(storage: &S, tournament_id: Id) -> Result<Vec<StageData>, BracketError> {
    let mut stages: Vec<Stage> = storage.select(&Filter::by(Field::TournamentId, tournament_id))?;
    stages.sort_by_key(|s| s.number);
    stages.iter().map(|s| stage_data(storage, s.id)).collect()
}

/// Participants as placed at creation, indexed by position. BYEs and
/// unfilled positions are `None`.
pub fn seeding<S: Storage>(storage: &S, stage_id: Id) -> Result<Vec<Option<ParticipantId>>, BracketError> {
    let data = stage_data(storage, stage_id)?;
    let first_rounds: Vec<Id> = match data.stage.stage_type {
        StageType::RoundRobin => data.rounds.iter().map(|r| r.id).collect(),
        StageType::Swiss => data
            .rounds
            .iter()
            .filter(|r| r.number == 1)
            .map(|r| r.id)
            .collect(),
        StageType::SingleElimination | StageType::DoubleElimination => {
            let winners = data.groups.iter().find(|g| g.number == 1).map(|g| g.id);
            data.rounds
                .iter()
                .filter(|r| r.number == 1 && Some(r.group_id) == winners)
                .map(|r| r.id)
                .collect()
        }
    };

    let mut slots = vec![None; data.stage.size() as usize];
    let placed = data
        .matches
        .iter()
        .filter(|m| first_rounds.contains(&m.round_id))
        .flat_map(|m| [&m.opponent1, &m.opponent2]);
    for opponent in placed {
        if let (Some(id), Some(position)) = (opponent.id(), opponent.position()) {
            let index = (position as usize).checked_sub(1);
            if let Some(slot) = index.and_then(|i| slots.get_mut(i)) {
                *slot = Some(id);
            }
        }
    }
    Ok(slots)
}

/// Derived status of a match.
pub fn match_status<S: Storage>(storage: &S, match_id: Id) -> Result<MatchStatus, BracketError> {
    let m = graph::load_match(storage, match_id)?;
    graph::status(storage, &m)
}
