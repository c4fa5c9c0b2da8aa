//! Integration tests for round robin: group distribution, pairings, score-only
//! reports and standings.

use bracket_engine::{
    create_stage, match_status, seeding, stage_data, standings, update_match, BracketError, Id,
    MatchStatus, MatchUpdate, MemoryStorage, OpponentUpdate, RoundRobinMode, StageConfig,
    StageSettings, StageType,
};
use std::collections::HashSet;

fn seeds(n: u64) -> Vec<Option<u64>> {
    (1..=n).map(Some).collect()
}

fn create(storage: &mut MemoryStorage, seeding: Vec<Option<u64>>, settings: StageSettings) -> Id {
    let config = StageConfig::new(0, "Groups", StageType::RoundRobin)
        .with_seeding(seeding)
        .with_settings(settings);
    create_stage(storage, config).unwrap()
}

fn groups(count: u32) -> StageSettings {
    StageSettings {
        group_count: Some(count),
        ..StageSettings::default()
    }
}

#[test]
fn everyone_meets_everyone_once() {
    for (n, rounds) in [(4u64, 3usize), (5, 5), (6, 5)] {
        let mut storage = MemoryStorage::new();
        let stage_id = create(&mut storage, seeds(n), groups(1));
        let data = stage_data(&storage, stage_id).unwrap();
        assert_eq!(data.rounds.len(), rounds, "n = {n}");
        assert_eq!(data.matches.len() as u64, n * (n - 1) / 2, "n = {n}");

        let pairs: HashSet<(u64, u64)> = data
            .matches
            .iter()
            .map(|m| {
                let (a, b) = (m.opponent1.id().unwrap(), m.opponent2.id().unwrap());
                (a.min(b), a.max(b))
            })
            .collect();
        assert_eq!(pairs.len(), data.matches.len());
    }
}

#[test]
fn double_mode_plays_a_return_leg() {
    let mut storage = MemoryStorage::new();
    let settings = StageSettings {
        round_robin_mode: RoundRobinMode::Double,
        ..groups(1)
    };
    let stage_id = create(&mut storage, seeds(4), settings);
    let data = stage_data(&storage, stage_id).unwrap();
    assert_eq!(data.rounds.len(), 6);
    assert_eq!(data.matches.len(), 12);
}

#[test]
fn seeds_are_dealt_across_groups() {
    let mut storage = MemoryStorage::new();
    let stage_id = create(&mut storage, seeds(8), groups(2));
    let data = stage_data(&storage, stage_id).unwrap();
    assert_eq!(data.groups.len(), 2);
    assert_eq!(data.matches.len(), 12);

    let first_group = data.groups.iter().find(|g| g.number == 1).unwrap().id;
    let members: HashSet<u64> = data
        .matches
        .iter()
        .filter(|m| m.group_id == first_group)
        .flat_map(|m| [m.opponent1.id(), m.opponent2.id()])
        .flatten()
        .collect();
    assert_eq!(members, HashSet::from([1, 3, 5, 7]));
}

#[test]
fn group_count_is_required() {
    let mut storage = MemoryStorage::new();
    let config = StageConfig::new(0, "Groups", StageType::RoundRobin).with_seeding(seeds(4));
    assert!(matches!(
        create_stage(&mut storage, config),
        Err(BracketError::Validation(_))
    ));

    let config = StageConfig::new(0, "Groups", StageType::RoundRobin)
        .with_seeding(seeds(4))
        .with_settings(groups(5));
    assert!(matches!(
        create_stage(&mut storage, config),
        Err(BracketError::Validation(_))
    ));
    assert!(storage.is_empty());
}

#[test]
fn byes_do_not_play() {
    let mut storage = MemoryStorage::new();
    let stage_id = create(&mut storage, vec![Some(1), Some(2), None, Some(4)], groups(1));
    let data = stage_data(&storage, stage_id).unwrap();
    assert_eq!(data.matches.len(), 3);
    assert!(data.matches.iter().all(|m| !m.has_bye()));
    assert_eq!(
        seeding(&storage, stage_id).unwrap(),
        vec![Some(1), Some(2), None, Some(4)]
    );
}

#[test]
fn scores_rank_the_group() {
    let mut storage = MemoryStorage::new();
    let stage_id = create(&mut storage, seeds(3), groups(1));
    let matches = stage_data(&storage, stage_id).unwrap().matches;
    for m in &matches {
        let (a, b) = (m.opponent1.id().unwrap(), m.opponent2.id().unwrap());
        let patch = if a < b {
            MatchUpdate::scores(2, 1)
        } else {
            MatchUpdate::scores(1, 2)
        };
        update_match(&mut storage, m.id, patch).unwrap();
        assert_eq!(match_status(&storage, m.id).unwrap(), MatchStatus::Completed);
    }

    let tables = standings(&storage, stage_id).unwrap();
    assert_eq!(tables.len(), 1);
    let rows = &tables[0].rows;
    let order: Vec<u64> = rows.iter().map(|r| r.id).collect();
    assert_eq!(order, vec![1, 2, 3]);
    assert_eq!(rows[0].points, 6);
    assert_eq!(rows[0].wins, 2);
    assert_eq!(rows[1].points, 3);
    assert_eq!(rows[2].losses, 2);
    assert_eq!(rows[2].score_for, 2);
    assert_eq!(rows[2].score_against, 4);
}

#[test]
fn draws_and_corrections_are_accepted() {
    let mut storage = MemoryStorage::new();
    let stage_id = create(&mut storage, seeds(2), groups(1));
    let m = stage_data(&storage, stage_id).unwrap().matches[0].clone();

    let draw = MatchUpdate {
        opponent1: Some(OpponentUpdate::draw().with_score(1)),
        opponent2: Some(OpponentUpdate::draw().with_score(1)),
    };
    update_match(&mut storage, m.id, draw).unwrap();
    let rows = &standings(&storage, stage_id).unwrap()[0].rows;
    assert!(rows.iter().all(|r| r.draws == 1 && r.points == 1));

    // Still editable: group matches never lock.
    update_match(&mut storage, m.id, MatchUpdate::opponent2_wins()).unwrap();
    let rows = &standings(&storage, stage_id).unwrap()[0].rows;
    assert_eq!(rows[0].id, m.opponent2.id().unwrap());
    assert_eq!(rows[0].points, 3);
}

#[test]
fn score_correction_overrides_the_old_result() {
    let mut storage = MemoryStorage::new();
    let stage_id = create(&mut storage, seeds(2), groups(1));
    let m = stage_data(&storage, stage_id).unwrap().matches[0].clone();

    let patch = MatchUpdate {
        opponent1: Some(OpponentUpdate::win().with_score(2)),
        opponent2: Some(OpponentUpdate::score(1)),
    };
    update_match(&mut storage, m.id, patch).unwrap();
    update_match(&mut storage, m.id, MatchUpdate::scores(0, 3)).unwrap();

    let stored = stage_data(&storage, stage_id).unwrap().matches[0].clone();
    assert_eq!(stored.opponent1.result(), None);
    assert_eq!(stored.winner(), m.opponent2.id());
    let rows = &standings(&storage, stage_id).unwrap()[0].rows;
    assert_eq!(rows[0].id, m.opponent2.id().unwrap());
    assert_eq!((rows[0].wins, rows[0].points), (1, 3));
    assert_eq!((rows[1].losses, rows[1].points), (1, 0));
}

#[test]
fn contradicting_results_are_rejected() {
    let mut storage = MemoryStorage::new();
    let stage_id = create(&mut storage, seeds(2), groups(1));
    let m = stage_data(&storage, stage_id).unwrap().matches[0].clone();
    let patch = MatchUpdate {
        opponent1: Some(OpponentUpdate::win()),
        opponent2: Some(OpponentUpdate::draw()),
    };
    assert!(matches!(
        update_match(&mut storage, m.id, patch),
        Err(BracketError::Validation(_))
    ));
    assert_eq!(match_status(&storage, m.id).unwrap(), MatchStatus::Ready);
}

#[test]
fn elimination_stages_have_no_group_table() {
    let mut storage = MemoryStorage::new();
    let config = StageConfig::new(0, "Bracket", StageType::SingleElimination).with_seeding(seeds(4));
    let stage_id = create_stage(&mut storage, config).unwrap();
    assert!(matches!(
        standings(&storage, stage_id),
        Err(BracketError::Validation(_))
    ));
}
