//! Data structures stored by the engine: stages, groups, rounds, matches.

mod error;
mod matches;
mod snapshot;
mod stage;

pub use error::BracketError;
pub use matches::{
    Match, MatchResult, MatchStatus, MatchUpdate, Opponent, OpponentUpdate, ParticipantResult,
    Side, SlotRef,
};
pub use snapshot::{Snapshot, StageData};
pub use stage::{
    GrandFinal, Group, Id, ParticipantId, Round, RoundRobinMode, SeedOrdering, Stage, StageConfig,
    StageSettings, StageType,
};
