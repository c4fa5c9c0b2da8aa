//! Seed orderings: pure permutations used at placement events.

use crate::models::{SeedOrdering, StageType};
use std::collections::VecDeque;

impl SeedOrdering {
    /// Orderings that distribute seeds over groups rather than bracket slots.
    pub fn is_group_ordering(self) -> bool {
        matches!(
            self,
            SeedOrdering::GroupsEffortBalanced | SeedOrdering::GroupsSeedOptimized
        )
    }

    /// Permute bracket slots. Group orderings leave the slice as is.
    pub fn apply<T: Clone>(self, items: &[T]) -> Vec<T> {
        match self {
            SeedOrdering::Natural
            | SeedOrdering::GroupsEffortBalanced
            | SeedOrdering::GroupsSeedOptimized => items.to_vec(),
            SeedOrdering::Reverse => items.iter().rev().cloned().collect(),
            SeedOrdering::HalfShift => {
                let half = items.len() / 2;
                items[half..].iter().chain(&items[..half]).cloned().collect()
            }
            SeedOrdering::ReverseHalfShift => {
                let half = items.len() / 2;
                items[..half]
                    .iter()
                    .rev()
                    .chain(items[half..].iter().rev())
                    .cloned()
                    .collect()
            }
            SeedOrdering::PairFlip => items
                .chunks(2)
                .flat_map(|pair| pair.iter().rev())
                .cloned()
                .collect(),
            SeedOrdering::InnerOuter => inner_outer(items),
        }
    }

    /// Split seeds into `group_count` groups.
    ///
    /// Group orderings deal seeds out across groups; any other ordering permutes
    /// the seeds and then cuts them into contiguous groups whose sizes differ by
    /// at most one.
    pub fn distribute<T: Clone>(self, items: &[T], group_count: usize) -> Vec<Vec<T>> {
        let group_count = group_count.max(1);
        let mut groups: Vec<Vec<T>> = vec![Vec::new(); group_count];
        match self {
            SeedOrdering::GroupsEffortBalanced => {
                for (index, item) in items.iter().enumerate() {
                    groups[index % group_count].push(item.clone());
                }
            }
            SeedOrdering::GroupsSeedOptimized => {
                for (index, item) in items.iter().enumerate() {
                    let run = index / group_count;
                    let offset = index % group_count;
                    let group = if run % 2 == 0 {
                        offset
                    } else {
                        group_count - 1 - offset
                    };
                    groups[group].push(item.clone());
                }
            }
            _ => {
                let ordered = self.apply(items);
                let base = ordered.len() / group_count;
                let extra = ordered.len() % group_count;
                let mut rest = ordered.as_slice();
                for (index, group) in groups.iter_mut().enumerate() {
                    let take = base + usize::from(index < extra);
                    let (head, tail) = rest.split_at(take);
                    group.extend_from_slice(head);
                    rest = tail;
                }
            }
        }
        groups
    }
}

/// Standard bracket interleave: quarters are consumed from the outside in so
/// that 1 meets n and the top seeds end up in opposite halves.
fn inner_outer<T: Clone>(items: &[T]) -> Vec<T> {
    if items.len() <= 2 {
        return items.to_vec();
    }
    let quarter = items.len() / 4;
    let mut outer_head: VecDeque<T> = items[..quarter].iter().cloned().collect();
    let mut inner_head: VecDeque<T> = items[quarter..2 * quarter].iter().cloned().collect();
    let mut inner_tail: VecDeque<T> = items[2 * quarter..3 * quarter].iter().cloned().collect();
    let mut outer_tail: VecDeque<T> = items[3 * quarter..].iter().cloned().collect();

    let mut result = Vec::with_capacity(items.len());
    loop {
        let before = result.len();
        take_pair(&mut result, &mut outer_head, End::Front, &mut outer_tail, End::Back);
        take_pair(&mut result, &mut inner_head, End::Back, &mut inner_tail, End::Front);
        take_pair(&mut result, &mut outer_head, End::Back, &mut outer_tail, End::Front);
        take_pair(&mut result, &mut inner_head, End::Front, &mut inner_tail, End::Back);
        if result.len() == before {
            break;
        }
    }
    result.extend(outer_head);
    result.extend(inner_head);
    result.extend(inner_tail);
    result.extend(outer_tail);
    result
}

#[derive(Clone, Copy)]
enum End {
    Front,
    Back,
}

fn take_pair<T>(
    result: &mut Vec<T>,
    left: &mut VecDeque<T>,
    left_end: End,
    right: &mut VecDeque<T>,
    right_end: End,
) {
    if left.is_empty() || right.is_empty() {
        return;
    }
    let pop = |queue: &mut VecDeque<T>, end: End| match end {
        End::Front => queue.pop_front(),
        End::Back => queue.pop_back(),
    };
    if let (Some(a), Some(b)) = (pop(left, left_end), pop(right, right_end)) {
        result.push(a);
        result.push(b);
    }
}

/// Losers bracket orderings used when the stage settings do not name one,
/// indexed by placement event minus one.
fn default_losers_ordering(size: u32, event: usize) -> SeedOrdering {
    use SeedOrdering::{HalfShift, Natural, PairFlip, Reverse, ReverseHalfShift};
    let table: &[SeedOrdering] = match size {
        4 => &[Natural, Reverse],
        8 => &[Natural, Reverse, Natural],
        16 => &[Natural, ReverseHalfShift, Reverse, Natural],
        32 => &[Natural, Reverse, HalfShift, Natural, Natural],
        64 => &[Natural, Reverse, HalfShift, Reverse, Natural, Natural],
        128 => &[
            Natural, Reverse, HalfShift, PairFlip, PairFlip, PairFlip, Natural,
        ],
        _ => &[],
    };
    event
        .checked_sub(1)
        .and_then(|index| table.get(index).copied())
        .unwrap_or(Natural)
}

/// Number of placement events a stage has: winners round 1 (or the group
/// distribution), then for double elimination the losers bracket round 1 and
/// every losers round that takes winners bracket droppers.
pub fn placement_event_count(stage_type: StageType, size: u32) -> usize {
    match stage_type {
        StageType::DoubleElimination if size >= 4 => 1 + size.trailing_zeros() as usize,
        _ => 1,
    }
}

/// Ordering governing a placement event: the configured one, else the default.
pub fn placement_ordering(
    stage_type: StageType,
    size: u32,
    configured: &[SeedOrdering],
    event: usize,
) -> SeedOrdering {
    if let Some(&ordering) = configured.get(event) {
        return ordering;
    }
    match (stage_type, event) {
        (StageType::RoundRobin | StageType::Swiss, _) => SeedOrdering::GroupsEffortBalanced,
        (_, 0) => SeedOrdering::InnerOuter,
        (_, event) => default_losers_ordering(size, event),
    }
}
