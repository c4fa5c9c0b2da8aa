//! Integration tests for single elimination: creation, BYE handling, propagation
//! and final standings.

use bracket_engine::{
    create_stage, final_standings, match_status, stage_data, update_match, BracketError, Id,
    Match, MatchStatus, MatchUpdate, MemoryStorage, SeedOrdering, StageConfig, StageSettings,
    StageType,
};

fn seeds(n: u64) -> Vec<Option<u64>> {
    (1..=n).map(Some).collect()
}

fn natural() -> StageSettings {
    StageSettings {
        seed_ordering: vec![SeedOrdering::Natural],
        ..StageSettings::default()
    }
}

fn create(storage: &mut MemoryStorage, seeding: Vec<Option<u64>>, settings: StageSettings) -> Id {
    let config = StageConfig::new(0, "Bracket", StageType::SingleElimination)
        .with_seeding(seeding)
        .with_settings(settings);
    create_stage(storage, config).unwrap()
}

/// Match by group, round and match number.
fn find(storage: &MemoryStorage, stage_id: Id, group: u32, round: u32, number: u32) -> Match {
    let data = stage_data(storage, stage_id).unwrap();
    let group_id = data.groups.iter().find(|g| g.number == group).unwrap().id;
    let round_id = data
        .rounds
        .iter()
        .find(|r| r.group_id == group_id && r.number == round)
        .unwrap()
        .id;
    data.matches
        .into_iter()
        .find(|m| m.round_id == round_id && m.number == number)
        .unwrap()
}

#[test]
fn has_one_match_less_than_participants() {
    for n in [2u64, 4, 8, 16, 32] {
        let mut storage = MemoryStorage::new();
        let stage_id = create(&mut storage, seeds(n), StageSettings::default());
        let data = stage_data(&storage, stage_id).unwrap();
        assert_eq!(data.matches.len() as u64, n - 1, "n = {n}");
        assert_eq!(data.groups.len(), 1);
        assert_eq!(data.rounds.len() as u32, n.trailing_zeros());
    }
}

#[test]
fn rejects_sizes_that_are_not_powers_of_two() {
    let mut storage = MemoryStorage::new();
    let config = StageConfig::new(0, "Bracket", StageType::SingleElimination).with_settings(
        StageSettings {
            size: Some(6),
            ..StageSettings::default()
        },
    );
    let err = create_stage(&mut storage, config).unwrap_err();
    assert!(matches!(err, BracketError::Validation(_)));
    assert!(err.to_string().contains("power of two"));
    assert!(storage.is_empty());
}

#[test]
fn rejects_a_single_participant() {
    let mut storage = MemoryStorage::new();
    let config =
        StageConfig::new(0, "Bracket", StageType::SingleElimination).with_seeding(vec![Some(1)]);
    let err = create_stage(&mut storage, config).unwrap_err();
    assert!(err.to_string().contains("less than 2 participants"));
    assert!(storage.is_empty());
}

#[test]
fn rejects_duplicate_participants() {
    let mut storage = MemoryStorage::new();
    let config = StageConfig::new(0, "Bracket", StageType::SingleElimination)
        .with_seeding(vec![Some(1), Some(2), Some(1), Some(4)]);
    assert!(matches!(
        create_stage(&mut storage, config),
        Err(BracketError::Validation(_))
    ));
}

#[test]
fn lone_seed_reaches_the_final_at_creation() {
    let mut storage = MemoryStorage::new();
    let stage_id = create(&mut storage, vec![Some(1), None, None, None], natural());

    let first = find(&storage, stage_id, 1, 1, 1);
    assert_eq!(first.opponent1.id(), Some(1));
    assert!(first.opponent2.is_bye());

    let second = find(&storage, stage_id, 1, 1, 2);
    assert!(second.opponent1.is_bye());
    assert!(second.opponent2.is_bye());

    let last = find(&storage, stage_id, 1, 2, 1);
    assert_eq!(last.opponent1.id(), Some(1));
    assert!(last.opponent2.is_bye());
    assert_eq!(match_status(&storage, last.id).unwrap(), MatchStatus::Bye);
}

#[test]
fn byes_stay_in_place_without_balancing() {
    let mut storage = MemoryStorage::new();
    let settings = StageSettings {
        size: Some(4),
        ..natural()
    };
    let stage_id = create(&mut storage, vec![Some(1), Some(2)], settings);

    let first = find(&storage, stage_id, 1, 1, 1);
    assert_eq!((first.opponent1.id(), first.opponent2.id()), (Some(1), Some(2)));
    let second = find(&storage, stage_id, 1, 1, 2);
    assert!(second.opponent1.is_bye() && second.opponent2.is_bye());
}

#[test]
fn balanced_byes_spread_participants() {
    let mut storage = MemoryStorage::new();
    let settings = StageSettings {
        size: Some(4),
        balance_byes: true,
        ..natural()
    };
    let stage_id = create(&mut storage, vec![Some(1), Some(2)], settings);

    let first = find(&storage, stage_id, 1, 1, 1);
    assert_eq!(first.opponent1.id(), Some(1));
    assert!(first.opponent2.is_bye());
    let second = find(&storage, stage_id, 1, 1, 2);
    assert_eq!(second.opponent1.id(), Some(2));
    assert!(second.opponent2.is_bye());

    let last = find(&storage, stage_id, 1, 2, 1);
    assert_eq!((last.opponent1.id(), last.opponent2.id()), (Some(1), Some(2)));
    assert_eq!(match_status(&storage, last.id).unwrap(), MatchStatus::Ready);
}

#[test]
fn default_ordering_keeps_top_seeds_apart() {
    let mut storage = MemoryStorage::new();
    let stage_id = create(&mut storage, seeds(8), StageSettings::default());
    let first = find(&storage, stage_id, 1, 1, 1);
    assert_eq!(first.opponent1.position(), Some(1));
    assert_eq!(first.opponent2.position(), Some(8));
}

#[test]
fn winner_moves_on_and_locks_the_match() {
    let mut storage = MemoryStorage::new();
    let stage_id = create(&mut storage, seeds(4), natural());
    let semi = find(&storage, stage_id, 1, 1, 2);

    update_match(&mut storage, semi.id, MatchUpdate::opponent2_wins()).unwrap();

    let last = find(&storage, stage_id, 1, 2, 1);
    assert!(last.opponent1.is_pending());
    assert_eq!(last.opponent2.id(), Some(4));
    assert_eq!(last.opponent2.position(), None);
    assert_eq!(match_status(&storage, last.id).unwrap(), MatchStatus::Waiting);
    assert_eq!(match_status(&storage, semi.id).unwrap(), MatchStatus::Locked);

    assert!(matches!(
        update_match(&mut storage, semi.id, MatchUpdate::opponent1_wins()),
        Err(BracketError::MatchLocked(id)) if id == semi.id
    ));
}

#[test]
fn ranks_with_a_consolation_final() {
    let mut storage = MemoryStorage::new();
    let settings = StageSettings {
        consolation_final: true,
        ..natural()
    };
    let stage_id = create(&mut storage, seeds(4), settings);
    assert_eq!(stage_data(&storage, stage_id).unwrap().matches.len(), 4);

    let semi1 = find(&storage, stage_id, 1, 1, 1);
    let semi2 = find(&storage, stage_id, 1, 1, 2);
    update_match(&mut storage, semi1.id, MatchUpdate::opponent1_wins()).unwrap();
    update_match(&mut storage, semi2.id, MatchUpdate::opponent2_wins()).unwrap();

    let third_place = find(&storage, stage_id, 2, 1, 1);
    assert_eq!(third_place.opponent1.id(), Some(2));
    assert_eq!(third_place.opponent2.id(), Some(3));
    assert!(matches!(
        final_standings(&storage, stage_id),
        Err(BracketError::Validation(_))
    ));

    let last = find(&storage, stage_id, 1, 2, 1);
    update_match(&mut storage, last.id, MatchUpdate::opponent1_wins()).unwrap();
    update_match(&mut storage, third_place.id, MatchUpdate::opponent2_wins()).unwrap();

    let ranks: Vec<(u64, u32)> = final_standings(&storage, stage_id)
        .unwrap()
        .iter()
        .map(|s| (s.id, s.rank))
        .collect();
    assert_eq!(ranks, vec![(1, 1), (4, 2), (3, 3), (2, 4)]);
}

#[test]
fn knocked_out_in_the_same_round_share_a_rank() {
    let mut storage = MemoryStorage::new();
    let stage_id = create(&mut storage, seeds(4), natural());
    for number in [1, 2] {
        let semi = find(&storage, stage_id, 1, 1, number);
        update_match(&mut storage, semi.id, MatchUpdate::opponent1_wins()).unwrap();
    }
    let last = find(&storage, stage_id, 1, 2, 1);
    update_match(&mut storage, last.id, MatchUpdate::opponent2_wins()).unwrap();

    let standings = final_standings(&storage, stage_id).unwrap();
    assert_eq!(standings[0].id, 3);
    assert_eq!(standings[0].rank, 1);
    assert_eq!(standings[1].id, 1);
    assert_eq!(standings[1].rank, 2);
    assert!(standings[2..].iter().all(|s| s.rank == 3));
    assert_eq!(standings.len(), 4);
}
