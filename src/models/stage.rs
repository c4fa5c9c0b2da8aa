//! Stage, Group and Round records, plus the configuration used to create a stage.

use serde::{Deserialize, Serialize};

/// Identifier assigned by storage to every record.
pub type Id = u64;

/// Identifier of a participant, as given in the seeding.
pub type ParticipantId = u64;

/// Bracket format of a stage.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    RoundRobin,
    SingleElimination,
    DoubleElimination,
    Swiss,
}

impl StageType {
    /// Elimination formats propagate winners (and losers) to later matches.
    pub fn is_elimination(self) -> bool {
        matches!(self, StageType::SingleElimination | StageType::DoubleElimination)
    }
}

impl std::fmt::Display for StageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StageType::RoundRobin => "round robin",
            StageType::SingleElimination => "single elimination",
            StageType::DoubleElimination => "double elimination",
            StageType::Swiss => "swiss",
        };
        f.write_str(name)
    }
}

/// Permutation rule placing ranked slots into a bracket at a placement event.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedOrdering {
    Natural,
    Reverse,
    HalfShift,
    ReverseHalfShift,
    PairFlip,
    InnerOuter,
    #[serde(rename = "groups.effort_balanced")]
    GroupsEffortBalanced,
    #[serde(rename = "groups.seed_optimized")]
    GroupsSeedOptimized,
}

/// How the double elimination grand final is played.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrandFinal {
    /// One match between the two bracket champions.
    #[default]
    Simple,
    /// A second match is played if the losers bracket champion wins the first.
    Double,
}

/// Whether each pair in a round robin group meets once or twice.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundRobinMode {
    #[default]
    Simple,
    Double,
}

/// Stage settings. Field names follow the camelCase form hosts send.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageSettings {
    /// Number of slots. Stored stages always carry the effective size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Orderings consumed one per placement event; missing entries use defaults.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub seed_ordering: Vec<SeedOrdering>,
    pub balance_byes: bool,
    pub grand_final: GrandFinal,
    /// Round robin groups or swiss divisions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_count: Option<u32>,
    pub round_robin_mode: RoundRobinMode,
    /// Single elimination only: play a third place match between semi-final losers.
    pub consolation_final: bool,
    /// Swiss only: number of rounds (defaults to ceil(log2(participants))).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_count: Option<u32>,
}

/// Input of `create_stage`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub tournament_id: Option<Id>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub stage_type: StageType,
    /// Position of the stage in its tournament; defaults to the next free number.
    #[serde(default)]
    pub number: Option<u32>,
    /// Participants by seed; `None` entries are BYEs.
    #[serde(default)]
    pub seeding: Option<Vec<Option<ParticipantId>>>,
    #[serde(default)]
    pub settings: StageSettings,
}

impl StageConfig {
    /// Config for a stage of the given type with no seeding or settings yet.
    pub fn new(tournament_id: Id, name: impl Into<String>, stage_type: StageType) -> Self {
        Self {
            tournament_id: Some(tournament_id),
            name: name.into(),
            stage_type,
            number: None,
            seeding: None,
            settings: StageSettings::default(),
        }
    }

    pub fn with_seeding(mut self, seeding: Vec<Option<ParticipantId>>) -> Self {
        self.seeding = Some(seeding);
        self
    }

    pub fn with_settings(mut self, settings: StageSettings) -> Self {
        self.settings = settings;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: Id,
    pub tournament_id: Id,
    pub name: String,
    #[serde(rename = "type")]
    pub stage_type: StageType,
    pub number: u32,
    pub settings: StageSettings,
}

impl Stage {
    /// Effective participant count recorded at creation.
    pub fn size(&self) -> u32 {
        self.settings.size.unwrap_or(0)
    }
}

/// Bracket half, round robin group or swiss division.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Id,
    pub stage_id: Id,
    pub number: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: Id,
    pub stage_id: Id,
    pub group_id: Id,
    pub number: u32,
}
