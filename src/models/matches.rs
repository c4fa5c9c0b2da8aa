//! Match records, their opponents, and the patches used to report results.

use crate::models::stage::{Id, ParticipantId};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Which opponent slot of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Opponent1,
    Opponent2,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Opponent1, Side::Opponent2];

    pub fn other(self) -> Side {
        match self {
            Side::Opponent1 => Side::Opponent2,
            Side::Opponent2 => Side::Opponent1,
        }
    }
}

/// Outcome of a match for one opponent.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
}

impl MatchResult {
    /// The result the other opponent gets.
    pub fn opposite(self) -> MatchResult {
        match self {
            MatchResult::Win => MatchResult::Loss,
            MatchResult::Loss => MatchResult::Win,
            MatchResult::Draw => MatchResult::Draw,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A known participant sitting in a match slot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ParticipantResult {
    pub id: ParticipantId,
    /// Rank-dependent slot, only set at placement events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub forfeit: bool,
}

impl ParticipantResult {
    pub fn new(id: ParticipantId, position: Option<u32>) -> Self {
        Self {
            id,
            position,
            score: None,
            result: None,
            forfeit: false,
        }
    }
}

/// Occupant of a match slot.
///
/// Stored as `null` for a BYE, an absent field (or `{"id": null, "position": p}`)
/// for a pending slot, and an object with an `id` for an assigned participant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Opponent {
    /// No participant will ever occupy this slot.
    Bye,
    /// Occupant not known yet; `position` is set when a placement event fills it.
    Pending { position: Option<u32> },
    Assigned(ParticipantResult),
}

impl Default for Opponent {
    fn default() -> Self {
        Opponent::Pending { position: None }
    }
}

impl Opponent {
    /// A participant placed by rank.
    pub fn seeded(id: ParticipantId, position: u32) -> Self {
        Opponent::Assigned(ParticipantResult::new(id, Some(position)))
    }

    /// A participant that reached this slot by winning (or losing) elsewhere.
    pub fn participant(id: ParticipantId) -> Self {
        Opponent::Assigned(ParticipantResult::new(id, None))
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, Opponent::Bye)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Opponent::Pending { .. })
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Opponent::Assigned(_))
    }

    /// Pending slot without position: serialized as an absent field.
    pub fn is_unplaced(&self) -> bool {
        matches!(self, Opponent::Pending { position: None })
    }

    pub fn id(&self) -> Option<ParticipantId> {
        match self {
            Opponent::Assigned(p) => Some(p.id),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<u32> {
        match self {
            Opponent::Bye => None,
            Opponent::Pending { position } => *position,
            Opponent::Assigned(p) => p.position,
        }
    }

    pub fn score(&self) -> Option<u32> {
        match self {
            Opponent::Assigned(p) => p.score,
            _ => None,
        }
    }

    pub fn result(&self) -> Option<MatchResult> {
        match self {
            Opponent::Assigned(p) => p.result,
            _ => None,
        }
    }

    pub fn as_participant_mut(&mut self) -> Option<&mut ParticipantResult> {
        match self {
            Opponent::Assigned(p) => Some(p),
            _ => None,
        }
    }
}

impl Serialize for Opponent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Opponent::Bye => serializer.serialize_none(),
            Opponent::Pending { position } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("id", &Option::<ParticipantId>::None)?;
                if let Some(position) = position {
                    map.serialize_entry("position", position)?;
                }
                map.end()
            }
            Opponent::Assigned(participant) => participant.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
struct RawOpponent {
    #[serde(default)]
    id: Option<ParticipantId>,
    #[serde(default)]
    position: Option<u32>,
    #[serde(default)]
    score: Option<u32>,
    #[serde(default)]
    result: Option<MatchResult>,
    #[serde(default)]
    forfeit: bool,
}

impl<'de> Deserialize<'de> for Opponent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawOpponent>::deserialize(deserializer)?;
        Ok(match raw {
            None => Opponent::Bye,
            Some(RawOpponent { id: None, position, .. }) => Opponent::Pending { position },
            Some(RawOpponent {
                id: Some(id),
                position,
                score,
                result,
                forfeit,
            }) => Opponent::Assigned(ParticipantResult {
                id,
                position,
                score,
                result,
                forfeit,
            }),
        })
    }
}

/// Forward edge: the slot of another match fed by this one.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct SlotRef {
    pub match_id: Id,
    pub side: Side,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Id,
    pub stage_id: Id,
    pub group_id: Id,
    pub round_id: Id,
    pub number: u32,
    #[serde(default, skip_serializing_if = "Opponent::is_unplaced")]
    pub opponent1: Opponent,
    #[serde(default, skip_serializing_if = "Opponent::is_unplaced")]
    pub opponent2: Opponent,
    /// Where the winner goes (elimination stages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_to: Option<SlotRef>,
    /// Where the loser goes (double elimination, consolation final).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loser_to: Option<SlotRef>,
    /// Double grand final: the match played if opponent2 wins this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_to: Option<Id>,
}

impl Match {
    pub fn opponent(&self, side: Side) -> &Opponent {
        match side {
            Side::Opponent1 => &self.opponent1,
            Side::Opponent2 => &self.opponent2,
        }
    }

    pub fn opponent_mut(&mut self, side: Side) -> &mut Opponent {
        match side {
            Side::Opponent1 => &mut self.opponent1,
            Side::Opponent2 => &mut self.opponent2,
        }
    }

    pub fn has_bye(&self) -> bool {
        self.opponent1.is_bye() || self.opponent2.is_bye()
    }

    /// Some score or result has been reported.
    pub fn has_progress(&self) -> bool {
        Side::BOTH.iter().any(|&side| {
            let opponent = self.opponent(side);
            opponent.score().is_some() || opponent.result().is_some()
        })
    }

    /// A result is present, or both scores are (round robin and swiss compare scores).
    pub fn is_decided(&self) -> bool {
        self.opponent1.result().is_some()
            || self.opponent2.result().is_some()
            || (self.opponent1.score().is_some() && self.opponent2.score().is_some())
    }

    /// Result from opponent1's point of view, derived from scores when no result is set.
    pub fn outcome(&self) -> Option<MatchResult> {
        if let Some(result) = self.opponent1.result() {
            return Some(result);
        }
        if let Some(result) = self.opponent2.result() {
            return Some(result.opposite());
        }
        let (a, b) = (self.opponent1.score()?, self.opponent2.score()?);
        Some(match a.cmp(&b) {
            std::cmp::Ordering::Greater => MatchResult::Win,
            std::cmp::Ordering::Less => MatchResult::Loss,
            std::cmp::Ordering::Equal => MatchResult::Draw,
        })
    }

    /// Side that won, if the match is decided without a draw.
    pub fn winner_side(&self) -> Option<Side> {
        match self.outcome()? {
            MatchResult::Win => Some(Side::Opponent1),
            MatchResult::Loss => Some(Side::Opponent2),
            MatchResult::Draw => None,
        }
    }

    /// Winner of a decided match, or the participant facing a BYE.
    pub fn winner(&self) -> Option<ParticipantId> {
        match (&self.opponent1, &self.opponent2) {
            (Opponent::Bye, other) | (other, Opponent::Bye) => other.id(),
            _ => self.winner_side().and_then(|side| self.opponent(side).id()),
        }
    }

    /// Loser of a decided match. BYE matches have none.
    pub fn loser(&self) -> Option<ParticipantId> {
        if self.has_bye() {
            return None;
        }
        self.winner_side()
            .and_then(|side| self.opponent(side.other()).id())
    }

    /// Drop scores, results and forfeits from both opponents.
    pub fn clear_results(&mut self) {
        for side in Side::BOTH {
            if let Some(participant) = self.opponent_mut(side).as_participant_mut() {
                participant.score = None;
                participant.result = None;
                participant.forfeit = false;
            }
        }
    }
}

/// Derived state of a match; never stored.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// An opponent is a BYE: nothing to play.
    Bye,
    /// Both opponents pending.
    Empty,
    /// One opponent known, the other pending.
    Waiting,
    /// Both opponents known, nothing reported.
    Ready,
    /// Some score reported, not decided yet.
    Running,
    /// Decided, not consumed downstream: still editable.
    Completed,
    /// Decided and consumed by a downstream match.
    Locked,
}

/// What is reported for one opponent.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct OpponentUpdate {
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub result: Option<MatchResult>,
    #[serde(default)]
    pub forfeit: bool,
}

impl OpponentUpdate {
    pub fn win() -> Self {
        Self {
            result: Some(MatchResult::Win),
            ..Self::default()
        }
    }

    pub fn loss() -> Self {
        Self {
            result: Some(MatchResult::Loss),
            ..Self::default()
        }
    }

    pub fn draw() -> Self {
        Self {
            result: Some(MatchResult::Draw),
            ..Self::default()
        }
    }

    pub fn score(score: u32) -> Self {
        Self {
            score: Some(score),
            ..Self::default()
        }
    }

    pub fn forfeit() -> Self {
        Self {
            forfeit: true,
            ..Self::default()
        }
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Patch applied by `update_match`. Absent sides are left untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchUpdate {
    #[serde(default)]
    pub opponent1: Option<OpponentUpdate>,
    #[serde(default)]
    pub opponent2: Option<OpponentUpdate>,
}

impl MatchUpdate {
    /// Opponent1 wins, opponent2 loses.
    pub fn opponent1_wins() -> Self {
        Self {
            opponent1: Some(OpponentUpdate::win()),
            opponent2: None,
        }
    }

    /// Opponent2 wins, opponent1 loses.
    pub fn opponent2_wins() -> Self {
        Self {
            opponent1: None,
            opponent2: Some(OpponentUpdate::win()),
        }
    }

    /// Report a win for the given side.
    pub fn winner(side: Side) -> Self {
        match side {
            Side::Opponent1 => Self::opponent1_wins(),
            Side::Opponent2 => Self::opponent2_wins(),
        }
    }

    pub fn scores(score1: u32, score2: u32) -> Self {
        Self {
            opponent1: Some(OpponentUpdate::score(score1)),
            opponent2: Some(OpponentUpdate::score(score2)),
        }
    }

    pub fn get(&self, side: Side) -> Option<&OpponentUpdate> {
        match side {
            Side::Opponent1 => self.opponent1.as_ref(),
            Side::Opponent2 => self.opponent2.as_ref(),
        }
    }
}
