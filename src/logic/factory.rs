//! Stage factory: builds the whole group/round/match graph in memory.
//!
//! Planning is infallible: `create` validates the configuration first, then
//! asks for a [`StagePlan`] and writes it. Matches in a plan are indexed in
//! creation order and forward edges always point to a later index.

use crate::logic::ordering::placement_ordering;
use crate::logic::round_robin::round_robin_rounds;
use crate::models::{GrandFinal, Opponent, SeedOrdering, Side, StageSettings, StageType};

/// Forward edge inside a plan.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct PlanSlot {
    pub index: usize,
    pub side: Side,
}

#[derive(Clone, Debug)]
pub(crate) struct MatchPlan {
    pub number: u32,
    pub opponent1: Opponent,
    pub opponent2: Opponent,
    pub winner_to: Option<PlanSlot>,
    pub loser_to: Option<PlanSlot>,
    pub reset_to: Option<usize>,
}

impl MatchPlan {
    pub fn has_edges(&self) -> bool {
        self.winner_to.is_some() || self.loser_to.is_some() || self.reset_to.is_some()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct GroupPlan {
    pub number: u32,
    /// Match indices per round; round numbers follow the vector order.
    pub rounds: Vec<Vec<usize>>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct StagePlan {
    pub groups: Vec<GroupPlan>,
    pub matches: Vec<MatchPlan>,
}

#[derive(Clone, Copy, Debug)]
enum Feed {
    Winner,
    Loser,
}

#[derive(Clone, Copy, Debug)]
struct Source {
    index: usize,
    feed: Feed,
}

/// A slot about to be placed in a match, and the match feeding it (if any).
#[derive(Clone, Debug)]
struct Slot {
    opponent: Opponent,
    source: Option<Source>,
}

impl Slot {
    fn seeded(opponent: Opponent) -> Self {
        Self {
            opponent,
            source: None,
        }
    }
}

/// Build the plan for a validated stage. `slots` has exactly `size` entries.
pub(crate) fn plan_stage(
    stage_type: StageType,
    settings: &StageSettings,
    size: u32,
    slots: Vec<Opponent>,
) -> StagePlan {
    let mut builder = PlanBuilder::default();
    let ordering = |event: usize| {
        placement_ordering(stage_type, size, &settings.seed_ordering, event)
    };
    match stage_type {
        StageType::SingleElimination => {
            let seeded = ordering(0).apply(&slots);
            let (losers, _) = builder.standard_bracket(1, seeded);
            if settings.consolation_final && losers.len() >= 2 {
                let semi_losers = losers[losers.len() - 2].clone();
                let group = builder.push_group(2);
                let round = builder.push_round(group);
                builder.push_match(group, round, semi_losers[0].clone(), semi_losers[1].clone());
            }
        }
        StageType::DoubleElimination => {
            let seeded = ordering(0).apply(&slots);
            let (losers, winners_champion) = builder.standard_bracket(1, seeded);
            let losers_champion = builder.losers_bracket(2, losers, &ordering);
            builder.grand_final(3, settings.grand_final, winners_champion, losers_champion);
        }
        StageType::RoundRobin => {
            let groups = group_members(&slots, settings, ordering(0));
            for (index, members) in groups.iter().enumerate() {
                let group = builder.push_group(index as u32 + 1);
                for pairs in round_robin_rounds(members, settings.round_robin_mode) {
                    let round = builder.push_round(group);
                    for (a, b) in pairs {
                        builder.push_match(group, round, Slot::seeded(a), Slot::seeded(b));
                    }
                }
            }
        }
        StageType::Swiss => {
            let groups = group_members(&slots, settings, ordering(0));
            for (index, members) in groups.iter().enumerate() {
                let group = builder.push_group(index as u32 + 1);
                let round = builder.push_round(group);
                for (a, b) in fold_pairs(members) {
                    builder.push_match(group, round, Slot::seeded(a), Slot::seeded(b));
                }
            }
        }
    }
    builder.plan
}

/// Distribute slots over groups, dropping BYEs: they never play round robin or swiss.
fn group_members(
    slots: &[Opponent],
    settings: &StageSettings,
    ordering: SeedOrdering,
) -> Vec<Vec<Opponent>> {
    let group_count = settings.group_count.unwrap_or(1) as usize;
    ordering
        .distribute(slots, group_count)
        .into_iter()
        .map(|group| group.into_iter().filter(|slot| !slot.is_bye()).collect())
        .collect()
}

/// Swiss round 1: top half against bottom half, the odd one out against a BYE.
fn fold_pairs(members: &[Opponent]) -> Vec<(Opponent, Opponent)> {
    let mut sorted = members.to_vec();
    sorted.sort_by_key(|slot| slot.position().unwrap_or(u32::MAX));
    let odd = if sorted.len() % 2 == 1 { sorted.pop() } else { None };
    let half = sorted.len() / 2;
    let mut pairs: Vec<(Opponent, Opponent)> = sorted[..half]
        .iter()
        .cloned()
        .zip(sorted[half..].iter().cloned())
        .collect();
    if let Some(odd) = odd {
        pairs.push((odd, Opponent::Bye));
    }
    pairs
}

#[derive(Default)]
struct PlanBuilder {
    plan: StagePlan,
}

impl PlanBuilder {
    fn push_group(&mut self, number: u32) -> usize {
        self.plan.groups.push(GroupPlan {
            number,
            rounds: Vec::new(),
        });
        self.plan.groups.len() - 1
    }

    fn push_round(&mut self, group: usize) -> usize {
        let rounds = &mut self.plan.groups[group].rounds;
        rounds.push(Vec::new());
        rounds.len() - 1
    }

    fn push_match(&mut self, group: usize, round: usize, a: Slot, b: Slot) -> usize {
        let index = self.plan.matches.len();
        self.link(a.source, PlanSlot { index, side: Side::Opponent1 });
        self.link(b.source, PlanSlot { index, side: Side::Opponent2 });
        let matches_in_round = &mut self.plan.groups[group].rounds[round];
        matches_in_round.push(index);
        let number = matches_in_round.len() as u32;
        self.plan.matches.push(MatchPlan {
            number,
            opponent1: a.opponent,
            opponent2: b.opponent,
            winner_to: None,
            loser_to: None,
            reset_to: None,
        });
        index
    }

    fn link(&mut self, source: Option<Source>, to: PlanSlot) {
        let Some(source) = source else {
            return;
        };
        let from = &mut self.plan.matches[source.index];
        match source.feed {
            Feed::Winner => from.winner_to = Some(to),
            Feed::Loser => from.loser_to = Some(to),
        }
    }

    /// Who leaves a match as its winner, as far as creation time can tell.
    /// A single BYE lets the other opponent through; two BYEs produce a BYE.
    fn winner_of(&self, index: usize) -> Slot {
        let planned = &self.plan.matches[index];
        let opponent = match (&planned.opponent1, &planned.opponent2) {
            (Opponent::Bye, Opponent::Bye) => Opponent::Bye,
            (Opponent::Bye, other) | (other, Opponent::Bye) => match other.id() {
                Some(id) => Opponent::participant(id),
                None => Opponent::default(),
            },
            _ => Opponent::default(),
        };
        Slot {
            opponent,
            source: Some(Source {
                index,
                feed: Feed::Winner,
            }),
        }
    }

    /// Loser of a match, placed by rank: `position` is the match number.
    fn loser_of(&self, index: usize, position: u32) -> Slot {
        let planned = &self.plan.matches[index];
        let opponent = if planned.opponent1.is_bye() || planned.opponent2.is_bye() {
            Opponent::Bye
        } else {
            Opponent::Pending {
                position: Some(position),
            }
        };
        Slot {
            opponent,
            source: Some(Source {
                index,
                feed: Feed::Loser,
            }),
        }
    }

    /// One round per pair of slots, halving until one match is left.
    /// Returns the losers of each round and the bracket winner.
    fn standard_bracket(&mut self, number: u32, slots: Vec<Opponent>) -> (Vec<Vec<Slot>>, Slot) {
        let group = self.push_group(number);
        let mut current: Vec<Slot> = slots.into_iter().map(Slot::seeded).collect();
        let mut losers = Vec::new();
        while current.len() > 1 {
            let indices = self.pair_round(group, &current);
            losers.push(
                indices
                    .iter()
                    .enumerate()
                    .map(|(i, &index)| self.loser_of(index, i as u32 + 1))
                    .collect(),
            );
            current = indices.iter().map(|&index| self.winner_of(index)).collect();
        }
        let winner = current
            .pop()
            .unwrap_or_else(|| Slot::seeded(Opponent::default()));
        (losers, winner)
    }

    /// Pair consecutive slots into the matches of a new round.
    fn pair_round(&mut self, group: usize, slots: &[Slot]) -> Vec<usize> {
        let round = self.push_round(group);
        slots
            .chunks(2)
            .map(|pair| {
                let second = pair
                    .get(1)
                    .cloned()
                    .unwrap_or_else(|| Slot::seeded(Opponent::Bye));
                self.push_match(group, round, pair[0].clone(), second)
            })
            .collect()
    }

    /// Losers bracket: alternates a round where survivors play each other with
    /// a round where winners bracket droppers (opponent1) meet the survivors
    /// (opponent2). Returns the losers bracket champion.
    fn losers_bracket(
        &mut self,
        number: u32,
        losers: Vec<Vec<Slot>>,
        ordering: &dyn Fn(usize) -> SeedOrdering,
    ) -> Slot {
        let mut drops = losers.into_iter();
        let Some(first_drop) = drops.next() else {
            return Slot::seeded(Opponent::Bye);
        };
        let drops: Vec<Vec<Slot>> = drops.collect();
        if drops.is_empty() {
            // Two participants: the winners bracket final loser goes straight to the grand final.
            return first_drop
                .into_iter()
                .next()
                .unwrap_or_else(|| Slot::seeded(Opponent::Bye));
        }

        let group = self.push_group(number);
        let mut current = ordering(1).apply(&first_drop);
        for (i, dropping) in drops.into_iter().enumerate() {
            let survivors: Vec<Slot> = self
                .pair_round(group, &current)
                .into_iter()
                .map(|index| self.winner_of(index))
                .collect();
            let dropping = ordering(2 + i).apply(&dropping);
            let round = self.push_round(group);
            current = dropping
                .into_iter()
                .zip(survivors)
                .map(|(dropper, survivor)| {
                    let index = self.push_match(group, round, dropper, survivor);
                    self.winner_of(index)
                })
                .collect();
        }
        current
            .pop()
            .unwrap_or_else(|| Slot::seeded(Opponent::Bye))
    }

    fn grand_final(&mut self, number: u32, mode: GrandFinal, winners: Slot, losers: Slot) {
        let group = self.push_group(number);
        let round = self.push_round(group);
        let first = self.push_match(group, round, winners, losers);
        if mode == GrandFinal::Double {
            // Nothing to reset when a finalist is already known to be a BYE.
            let planned = &self.plan.matches[first];
            let reset_slot = if planned.opponent1.is_bye() || planned.opponent2.is_bye() {
                Opponent::Bye
            } else {
                Opponent::default()
            };
            let round = self.push_round(group);
            let reset = self.push_match(
                group,
                round,
                Slot::seeded(reset_slot.clone()),
                Slot::seeded(reset_slot),
            );
            self.plan.matches[first].reset_to = Some(reset);
        }
    }
}
