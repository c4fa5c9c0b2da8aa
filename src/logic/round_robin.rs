//! Circle-method pairing for round robin groups.

use crate::models::RoundRobinMode;

/// Rounds of pairs in which every member meets every other member.
///
/// With an odd member count one member sits out each round (no pair is
/// produced for it), so the group has as many rounds as members. Double mode
/// appends the return leg with the opponents swapped.
pub fn round_robin_rounds<T: Clone>(members: &[T], mode: RoundRobinMode) -> Vec<Vec<(T, T)>> {
    let n = members.len();
    if n < 2 {
        return Vec::new();
    }
    let slots = if n % 2 == 0 { n } else { n + 1 };
    let round_count = slots - 1;
    let pairs_per_round = slots / 2;

    let mut rounds = Vec::with_capacity(round_count);
    for round in 0..round_count {
        let mut pairs = Vec::with_capacity(pairs_per_round);
        for pair in 0..pairs_per_round {
            // The fixed seat is `slots - 1`; it only exists for even counts.
            if pair == 0 && n % 2 == 1 {
                continue;
            }
            let first = (round + round_count - pair) % round_count;
            let second = if pair == 0 {
                slots - 1
            } else {
                (round + pair) % round_count
            };
            pairs.push((members[first].clone(), members[second].clone()));
        }
        rounds.push(pairs);
    }

    if mode == RoundRobinMode::Double {
        let return_leg: Vec<Vec<(T, T)>> = rounds
            .iter()
            .map(|round| round.iter().map(|(a, b)| (b.clone(), a.clone())).collect())
            .collect();
        rounds.extend(return_leg);
    }
    rounds
}
