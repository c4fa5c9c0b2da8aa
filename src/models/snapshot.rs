//! Aggregated views over stored records: one stage, or the whole storage.

use crate::models::matches::Match;
use crate::models::stage::{Group, Round, Stage};
use serde::{Deserialize, Serialize};

/// A stage with all of its groups, rounds and matches.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StageData {
    pub stage: Stage,
    pub groups: Vec<Group>,
    pub rounds: Vec<Round>,
    pub matches: Vec<Match>,
}

/// Every record held by storage, table by table. Produced by `export`, consumed by `import`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub stage: Vec<Stage>,
    pub group: Vec<Group>,
    pub round: Vec<Round>,
    #[serde(rename = "match")]
    pub matches: Vec<Match>,
}
