//! Stage creation: validate the configuration, plan the graph, then write it.

use crate::logic::factory::{plan_stage, StagePlan};
use crate::logic::ordering::placement_event_count;
use crate::models::{
    BracketError, Group, Id, Match, Opponent, ParticipantId, Round, SlotRef, Stage, StageConfig,
    StageSettings, StageType,
};
use crate::storage::{Field, Filter, Storage};
use std::collections::HashSet;

/// Create a stage with all of its groups, rounds and matches. Returns the stage id.
///
/// Nothing is written unless the whole configuration is valid.
pub fn create_stage<S: Storage>(storage: &mut S, config: StageConfig) -> Result<Id, BracketError> {
    let tournament_id = config
        .tournament_id
        .ok_or_else(|| BracketError::validation("A tournament id is required"))?;
    let name = config.name.trim();
    if name.is_empty() {
        return Err(BracketError::validation("A stage name is required"));
    }

    let seeding = config.seeding.as_deref();
    let size = effective_size(seeding, &config.settings);
    ensure_valid_size(config.stage_type, size)?;
    if let Some(seeding) = seeding {
        ensure_no_duplicates(seeding)?;
        if config.stage_type == StageType::Swiss && seeding.iter().all(Option::is_none) {
            return Err(BracketError::validation(
                "A swiss stage needs at least one seeded participant",
            ));
        }
    } else if config.stage_type == StageType::Swiss {
        return Err(BracketError::validation("A swiss stage needs a seeding"));
    }
    ensure_valid_settings(config.stage_type, size, &config.settings)?;

    let number = match config.number {
        Some(number) => number,
        None => {
            let existing: Vec<Stage> =
                storage.select(&Filter::by(Field::TournamentId, tournament_id))?;
            existing.iter().map(|s| s.number).max().unwrap_or(0) + 1
        }
    };

    let slots = seed_slots(
        seeding,
        size,
        config.settings.balance_byes && config.stage_type != StageType::RoundRobin,
    );
    let mut settings = config.settings.clone();
    settings.size = Some(size);
    let plan = plan_stage(config.stage_type, &settings, size, slots);

    let stage = Stage {
        id: 0,
        tournament_id,
        name: name.to_string(),
        stage_type: config.stage_type,
        number,
        settings,
    };
    let stage_id = write_plan(storage, stage, &plan)?;
    log::info!(
        "Created {} stage {} ({} participants, {} matches)",
        config.stage_type,
        stage_id,
        size,
        plan.matches.len()
    );
    Ok(stage_id)
}

/// The larger of the seeding length and the requested size.
fn effective_size(seeding: Option<&[Option<ParticipantId>]>, settings: &StageSettings) -> u32 {
    let seeded = seeding.map_or(0, |s| s.len() as u32);
    seeded.max(settings.size.unwrap_or(0))
}

fn ensure_valid_size(stage_type: StageType, size: u32) -> Result<(), BracketError> {
    if size == 0 {
        return Err(BracketError::validation(
            "Impossible to create an empty stage: give a seeding or a size",
        ));
    }
    if size < 2 {
        return Err(BracketError::validation(
            "Impossible to create a stage with less than 2 participants",
        ));
    }
    if stage_type.is_elimination() && !size.is_power_of_two() {
        return Err(BracketError::Validation(format!(
            "The participant count must be a power of two (got {size})"
        )));
    }
    Ok(())
}

fn ensure_no_duplicates(seeding: &[Option<ParticipantId>]) -> Result<(), BracketError> {
    let mut seen = HashSet::new();
    for id in seeding.iter().flatten() {
        if !seen.insert(id) {
            return Err(BracketError::Validation(format!(
                "Participant {id} appears twice in the seeding"
            )));
        }
    }
    Ok(())
}

fn ensure_valid_settings(
    stage_type: StageType,
    size: u32,
    settings: &StageSettings,
) -> Result<(), BracketError> {
    let events = placement_event_count(stage_type, size);
    if settings.seed_ordering.len() > events {
        return Err(BracketError::Validation(format!(
            "{} seed orderings given but a {stage_type} stage of {size} has only {events} placement event(s)",
            settings.seed_ordering.len()
        )));
    }
    if stage_type.is_elimination() {
        if let Some(ordering) = settings.seed_ordering.iter().find(|o| o.is_group_ordering()) {
            return Err(BracketError::Validation(format!(
                "{ordering:?} only applies to round robin and swiss groups"
            )));
        }
    }
    match stage_type {
        StageType::RoundRobin => {
            let groups = settings.group_count.ok_or_else(|| {
                BracketError::validation("A round robin stage needs a group count")
            })?;
            ensure_group_count(groups, size)?;
        }
        StageType::Swiss => ensure_group_count(settings.group_count.unwrap_or(1), size)?,
        StageType::SingleElimination | StageType::DoubleElimination => {}
    }
    if settings.round_count == Some(0) {
        return Err(BracketError::validation("The round count must be at least 1"));
    }
    Ok(())
}

fn ensure_group_count(groups: u32, size: u32) -> Result<(), BracketError> {
    if groups == 0 || groups > size {
        return Err(BracketError::Validation(format!(
            "The group count must be between 1 and {size} (got {groups})"
        )));
    }
    Ok(())
}

/// Slots by position: seeded participants, BYEs for missing seeding entries,
/// or pending positions when no seeding is given.
fn seed_slots(seeding: Option<&[Option<ParticipantId>]>, size: u32, balance: bool) -> Vec<Opponent> {
    let Some(seeding) = seeding else {
        return (1..=size)
            .map(|position| Opponent::Pending {
                position: Some(position),
            })
            .collect();
    };
    let mut padded = seeding.to_vec();
    padded.resize(size as usize, None);
    if balance {
        padded = balance_byes(&padded);
    }
    padded
        .iter()
        .zip(1..)
        .map(|(seed, position)| match seed {
            Some(id) => Opponent::seeded(*id, position),
            None => Opponent::Bye,
        })
        .collect()
}

/// Re-lay a seeding so BYEs are spread out: with few participants each one
/// faces a BYE; otherwise the top seeds pair off and the rest face BYEs.
pub(crate) fn balance_byes(seeding: &[Option<ParticipantId>]) -> Vec<Option<ParticipantId>> {
    let size = seeding.len();
    let seeds: Vec<ParticipantId> = seeding.iter().flatten().copied().collect();
    let mut balanced: Vec<Option<ParticipantId>> = if seeds.len() < size / 2 {
        seeds.iter().flat_map(|&id| [Some(id), None]).collect()
    } else {
        let byes = size - seeds.len();
        let paired = seeds.len() - byes;
        seeds[..paired]
            .iter()
            .map(|&id| Some(id))
            .chain(seeds[paired..].iter().flat_map(|&id| [Some(id), None]))
            .collect()
    };
    balanced.resize(size, None);
    balanced
}

/// Insert the planned records, then fill in the forward edges now that every
/// match has an id.
fn write_plan<S: Storage>(storage: &mut S, stage: Stage, plan: &StagePlan) -> Result<Id, BracketError> {
    let stage_id = storage.insert(stage)?;
    let mut records: Vec<Option<Match>> = vec![None; plan.matches.len()];

    for group_plan in &plan.groups {
        let group_id = storage.insert(Group {
            id: 0,
            stage_id,
            number: group_plan.number,
        })?;
        for (round_index, indices) in group_plan.rounds.iter().enumerate() {
            let round_id = storage.insert(Round {
                id: 0,
                stage_id,
                group_id,
                number: round_index as u32 + 1,
            })?;
            for &index in indices {
                let planned = &plan.matches[index];
                let mut record = Match {
                    id: 0,
                    stage_id,
                    group_id,
                    round_id,
                    number: planned.number,
                    opponent1: planned.opponent1.clone(),
                    opponent2: planned.opponent2.clone(),
                    winner_to: None,
                    loser_to: None,
                    reset_to: None,
                };
                record.id = storage.insert(record.clone())?;
                records[index] = Some(record);
            }
        }
    }

    let id_of = |index: usize| records[index].as_ref().map(|m| m.id);
    let mut linked = Vec::new();
    for (index, planned) in plan.matches.iter().enumerate() {
        if !planned.has_edges() {
            continue;
        }
        let Some(mut record) = records[index].clone() else {
            continue;
        };
        record.winner_to = planned.winner_to.and_then(|edge| {
            id_of(edge.index).map(|match_id| SlotRef {
                match_id,
                side: edge.side,
            })
        });
        record.loser_to = planned.loser_to.and_then(|edge| {
            id_of(edge.index).map(|match_id| SlotRef {
                match_id,
                side: edge.side,
            })
        });
        record.reset_to = planned.reset_to.and_then(id_of);
        linked.push(record);
    }
    for record in &linked {
        storage.update(record.id, record)?;
    }
    Ok(stage_id)
}
