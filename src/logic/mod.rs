//! Bracket logic: stage creation, result updates, resets, swiss rounds and readers.

mod create;
mod factory;
mod get;
mod graph;
mod ordering;
mod reset;
mod round_robin;
mod snapshot;
mod standings;
mod swiss;
mod update;

pub use create::create_stage;
pub use get::{match_status, seeding, stage_data, tournament_data};
pub use ordering::{placement_event_count, placement_ordering};
pub use reset::reset_match_results;
pub use round_robin::round_robin_rounds;
pub use snapshot::{delete_stage, export, import};
pub use standings::{final_standings, standings, GroupStandings, Standing, StandingsRow};
pub use swiss::generate_next_swiss_round;
pub use update::update_match;
