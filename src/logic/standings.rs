//! Rankings: group tables for round robin and swiss, final placings for
//! finished elimination stages.

use crate::logic::get::stage_data;
use crate::models::{BracketError, Id, Match, MatchResult, ParticipantId, StageData, StageType};
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

/// One participant's line in a group table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub id: ParticipantId,
    /// Seed position, used as the last tie-breaker.
    pub position: Option<u32>,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub byes: u32,
    pub points: u32,
    pub score_for: u32,
    pub score_against: u32,
}

impl StandingsRow {
    fn new(id: ParticipantId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn score_difference(&self) -> i64 {
        i64::from(self.score_for) - i64::from(self.score_against)
    }

    fn record(&mut self, result: MatchResult, score_for: Option<u32>, score_against: Option<u32>) {
        self.played += 1;
        self.score_for += score_for.unwrap_or(0);
        self.score_against += score_against.unwrap_or(0);
        match result {
            MatchResult::Win => {
                self.wins += 1;
                self.points += POINTS_FOR_WIN;
            }
            MatchResult::Draw => {
                self.draws += 1;
                self.points += POINTS_FOR_DRAW;
            }
            MatchResult::Loss => self.losses += 1,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupStandings {
    pub group_id: Id,
    pub number: u32,
    pub rows: Vec<StandingsRow>,
}

/// Group tables of a round robin or swiss stage, best first.
pub fn standings<S: Storage>(storage: &S, stage_id: Id) -> Result<Vec<GroupStandings>, BracketError> {
    let data = stage_data(storage, stage_id)?;
    if data.stage.stage_type.is_elimination() {
        return Err(BracketError::Validation(format!(
            "Standings are only kept for round robin and swiss stages, stage {stage_id} is {}",
            data.stage.stage_type
        )));
    }
    let mut groups = data.groups.clone();
    groups.sort_by_key(|g| g.number);
    Ok(groups
        .into_iter()
        .map(|group| {
            let matches: Vec<Match> = data
                .matches
                .iter()
                .filter(|m| m.group_id == group.id)
                .cloned()
                .collect();
            GroupStandings {
                group_id: group.id,
                number: group.number,
                rows: tally(&matches),
            }
        })
        .collect())
}

/// Aggregate the matches of one group into sorted rows.
///
/// Every participant seen in a match gets a row. A match against a BYE counts
/// as a win without a score.
pub(crate) fn tally(matches: &[Match]) -> Vec<StandingsRow> {
    let mut rows: BTreeMap<ParticipantId, StandingsRow> = BTreeMap::new();
    for m in matches {
        for side in [&m.opponent1, &m.opponent2] {
            if let Some(id) = side.id() {
                let row = rows.entry(id).or_insert_with(|| StandingsRow::new(id));
                row.position = match (row.position, side.position()) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
            }
        }

        if m.has_bye() {
            if let Some(row) = m.winner().and_then(|id| rows.get_mut(&id)) {
                row.byes += 1;
                row.wins += 1;
                row.points += POINTS_FOR_WIN;
            }
            continue;
        }
        let (Some(id1), Some(id2), Some(outcome)) = (m.opponent1.id(), m.opponent2.id(), m.outcome())
        else {
            continue;
        };
        let (score1, score2) = (m.opponent1.score(), m.opponent2.score());
        if let Some(row) = rows.get_mut(&id1) {
            row.record(outcome, score1, score2);
        }
        if let Some(row) = rows.get_mut(&id2) {
            row.record(outcome.opposite(), score2, score1);
        }
    }

    let mut rows: Vec<StandingsRow> = rows.into_values().collect();
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.score_difference().cmp(&a.score_difference()))
            .then(b.score_for.cmp(&a.score_for))
            .then(a.position.unwrap_or(u32::MAX).cmp(&b.position.unwrap_or(u32::MAX)))
            .then(a.id.cmp(&b.id))
    });
    rows
}

/// Final placing in an elimination stage. Participants knocked out in the
/// same round share a rank.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub id: ParticipantId,
    pub rank: u32,
}

/// Placings of a finished elimination stage: the champion, the runner-up,
/// then everyone else by the round they were knocked out in.
pub fn final_standings<S: Storage>(storage: &S, stage_id: Id) -> Result<Vec<Standing>, BracketError> {
    let data = stage_data(storage, stage_id)?;
    if !data.stage.stage_type.is_elimination() {
        return Err(BracketError::Validation(format!(
            "Final standings are only computed for elimination stages, stage {stage_id} is {}",
            data.stage.stage_type
        )));
    }
    if let Some(open) = data.matches.iter().find(|m| !m.has_bye() && !m.is_decided()) {
        return Err(BracketError::Validation(format!(
            "Stage {stage_id} is not finished: match {} has no result",
            open.id
        )));
    }

    let mut ranking = Ranking::default();
    match data.stage.stage_type {
        StageType::DoubleElimination => {
            let mut finals = rounds_of(&data, 3);
            finals.reverse();
            // The reset match decides the title when it was played.
            let deciding = finals.iter().flatten().find(|m| m.winner().is_some());
            if let Some(deciding) = deciding {
                ranking.place_final(deciding);
            }
            // Two participants: the grand final holds everyone.
            for round in rounds_of(&data, 2).iter().rev() {
                ranking.place_losers(round);
            }
        }
        _ => {
            let mut winners = rounds_of(&data, 1);
            let last = winners.pop().unwrap_or_default();
            if let Some(deciding) = last.first() {
                ranking.place_final(deciding);
            }
            if let Some(consolation) = rounds_of(&data, 2).iter().flatten().next() {
                ranking.place_final(consolation);
            }
            for round in winners.iter().rev() {
                ranking.place_losers(round);
            }
        }
    }
    Ok(ranking.standings)
}

#[derive(Default)]
struct Ranking {
    standings: Vec<Standing>,
    placed: HashSet<ParticipantId>,
}

impl Ranking {
    fn place(&mut self, ids: &[ParticipantId]) {
        let rank = self.standings.len() as u32 + 1;
        for &id in ids {
            if self.placed.insert(id) {
                self.standings.push(Standing { id, rank });
            }
        }
    }

    /// Winner then loser of a deciding match, each on their own rank.
    fn place_final(&mut self, deciding: &Match) {
        if let Some(winner) = deciding.winner() {
            self.place(&[winner]);
        }
        if let Some(loser) = deciding.loser() {
            self.place(&[loser]);
        }
    }

    /// Everyone knocked out in the round shares the next rank.
    fn place_losers(&mut self, round: &[&Match]) {
        let losers: Vec<ParticipantId> = round
            .iter()
            .filter_map(|m| m.loser())
            .filter(|id| !self.placed.contains(id))
            .collect();
        self.place(&losers);
    }
}

/// Matches of the group with the given number, round by round.
fn rounds_of(data: &StageData, group_number: u32) -> Vec<Vec<&Match>> {
    let Some(group) = data.groups.iter().find(|g| g.number == group_number) else {
        return Vec::new();
    };
    let mut rounds: Vec<_> = data.rounds.iter().filter(|r| r.group_id == group.id).collect();
    rounds.sort_by_key(|r| r.number);
    rounds
        .into_iter()
        .map(|round| {
            let mut matches: Vec<&Match> =
                data.matches.iter().filter(|m| m.round_id == round.id).collect();
            matches.sort_by_key(|m| m.number);
            matches
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Opponent, ParticipantResult};

    fn played(id: u64, a: (u64, u32), b: (u64, u32)) -> Match {
        let side = |(pid, score): (u64, u32)| {
            Opponent::Assigned(ParticipantResult {
                score: Some(score),
                ..ParticipantResult::new(pid, Some(pid as u32))
            })
        };
        Match {
            id,
            stage_id: 0,
            group_id: 0,
            round_id: 0,
            number: id as u32,
            opponent1: side(a),
            opponent2: side(b),
            winner_to: None,
            loser_to: None,
            reset_to: None,
        }
    }

    #[test]
    fn points_then_difference() {
        let matches = vec![
            played(1, (1, 3), (2, 0)),
            played(2, (3, 1), (4, 1)),
            played(3, (1, 0), (3, 2)),
            played(4, (2, 5), (4, 0)),
        ];
        let rows = tally(&matches);
        let order: Vec<u64> = rows.iter().map(|r| r.id).collect();
        // 1: 3 pts (+1), 2: 3 pts (+2), 3: 4 pts, 4: 1 pt
        assert_eq!(order, vec![3, 2, 1, 4]);
        assert_eq!(rows[0].draws, 1);
        assert_eq!(rows[0].points, 4);
        assert_eq!(rows[3].losses, 1);
    }

    #[test]
    fn bye_counts_as_a_win() {
        let mut m = played(1, (7, 0), (8, 0));
        m.opponent2 = Opponent::Bye;
        m.opponent1 = Opponent::participant(7);
        let rows = tally(&[m]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].byes, 1);
        assert_eq!(rows[0].points, POINTS_FOR_WIN);
        assert_eq!(rows[0].played, 0);
    }
}
