//! Bracket progression engine: builds tournament stages as match graphs and
//! moves participants through them as results are reported.

pub mod logic;
pub mod models;
pub mod storage;

pub use logic::{
    create_stage, delete_stage, export, final_standings, generate_next_swiss_round, import,
    match_status, reset_match_results, seeding, stage_data, standings, tournament_data,
    update_match, GroupStandings, Standing, StandingsRow,
};
pub use models::{
    BracketError, GrandFinal, Group, Id, Match, MatchResult, MatchStatus, MatchUpdate, Opponent,
    OpponentUpdate, ParticipantId, ParticipantResult, RoundRobinMode, Round, SeedOrdering, Side,
    SlotRef, Snapshot, Stage, StageConfig, StageData, StageSettings, StageType,
};
pub use storage::{Field, Filter, MemoryStorage, Record, Storage, StorageError, Table};
