//! Randomized play-throughs: random brackets with random BYEs, random winners,
//! checked against the graph invariants after every report.

use bracket_engine::{
    create_stage, final_standings, match_status, reset_match_results, stage_data, update_match,
    GrandFinal, Id, MatchStatus, MatchUpdate, MemoryStorage, Side, StageConfig, StageSettings,
    StageType,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn random_config(rng: &mut StdRng) -> (StageConfig, HashSet<u64>) {
    let size = *[2u64, 4, 8, 16].choose(rng).unwrap();
    let participants = rng.gen_range(2..=size);
    let mut seeding: Vec<Option<u64>> = (1..=participants)
        .map(Some)
        .chain(std::iter::repeat(None).take((size - participants) as usize))
        .collect();
    seeding.shuffle(rng);

    let stage_type = if rng.gen_bool(0.5) {
        StageType::SingleElimination
    } else {
        StageType::DoubleElimination
    };
    let settings = StageSettings {
        balance_byes: rng.gen_bool(0.3),
        grand_final: if rng.gen_bool(0.5) {
            GrandFinal::Double
        } else {
            GrandFinal::Simple
        },
        consolation_final: stage_type == StageType::SingleElimination && rng.gen_bool(0.5),
        ..StageSettings::default()
    };
    let config = StageConfig::new(0, "Random", stage_type)
        .with_seeding(seeding)
        .with_settings(settings);
    (config, (1..=participants).collect())
}

/// No participant sits in two slots of the same round.
fn assert_consistent(storage: &MemoryStorage, stage_id: Id) {
    let data = stage_data(storage, stage_id).unwrap();
    for round in &data.rounds {
        let mut seen = HashSet::new();
        for m in data.matches.iter().filter(|m| m.round_id == round.id) {
            for id in [m.opponent1.id(), m.opponent2.id()].into_iter().flatten() {
                assert!(seen.insert(id), "participant {id} twice in round {}", round.id);
            }
        }
    }
}

fn ready_matches(storage: &MemoryStorage, stage_id: Id) -> Vec<Id> {
    stage_data(storage, stage_id)
        .unwrap()
        .matches
        .iter()
        .filter(|m| match_status(storage, m.id).unwrap() == MatchStatus::Ready)
        .map(|m| m.id)
        .collect()
}

#[test]
fn random_brackets_finish_with_everyone_ranked() {
    for seed in 0..200u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (config, participants) = random_config(&mut rng);
        let mut storage = MemoryStorage::new();
        let stage_id = create_stage(&mut storage, config).unwrap();
        assert_consistent(&storage, stage_id);

        let mut reports = 0;
        loop {
            let ready = ready_matches(&storage, stage_id);
            let Some(&match_id) = ready.choose(&mut rng) else {
                break;
            };
            let side = if rng.gen_bool(0.5) {
                Side::Opponent1
            } else {
                Side::Opponent2
            };
            update_match(&mut storage, match_id, MatchUpdate::winner(side)).unwrap();
            assert_consistent(&storage, stage_id);

            // Occasionally take the result back and report it again.
            if rng.gen_bool(0.1) {
                reset_match_results(&mut storage, match_id).unwrap();
                assert_eq!(match_status(&storage, match_id).unwrap(), MatchStatus::Ready);
                update_match(&mut storage, match_id, MatchUpdate::winner(side)).unwrap();
            }
            reports += 1;
            assert!(reports < 100, "seed {seed}: bracket never finishes");
        }

        let standings = final_standings(&storage, stage_id)
            .unwrap_or_else(|err| panic!("seed {seed}: {err}"));
        let ranked: HashSet<u64> = standings.iter().map(|s| s.id).collect();
        assert_eq!(ranked, participants, "seed {seed}");
        assert_eq!(standings.len(), participants.len(), "seed {seed}");
        assert_eq!(standings.iter().filter(|s| s.rank == 1).count(), 1);
        assert!(standings.windows(2).all(|w| w[0].rank <= w[1].rank));
    }
}
