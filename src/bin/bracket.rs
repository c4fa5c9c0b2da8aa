//! Command line host around the in-memory adapter.
//!
//! ```text
//! bracket create <config.json> [seeding.csv]   create a stage, print the snapshot
//! bracket standings <snapshot.json> <stage-id> print the standings of a stage
//! ```
//!
//! The seeding file holds one participant id per line; `bye` or `-` marks a BYE.
//! Set RUST_LOG to change the log level (default: info).

use bracket_engine::{
    create_stage, export, final_standings, import, standings, MemoryStorage, ParticipantId,
    Snapshot, StageConfig,
};
use std::error::Error;
use std::path::Path;

type CliResult<T> = Result<T, Box<dyn Error>>;

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = match args.first().map(String::as_str) {
        Some("create") => create(&args[1..]),
        Some("standings") => print_standings(&args[1..]),
        _ => Err(usage()),
    };
    if let Err(err) = outcome {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn usage() -> Box<dyn Error> {
    "usage: bracket create <config.json> [seeding.csv] | bracket standings <snapshot.json> <stage-id>"
        .into()
}

fn create(args: &[String]) -> CliResult<()> {
    let config_path = args.first().ok_or_else(usage)?;
    let mut config: StageConfig = serde_json::from_str(&std::fs::read_to_string(config_path)?)?;
    if let Some(seeding_path) = args.get(1) {
        config.seeding = Some(read_seeding(Path::new(seeding_path))?);
    }

    let mut storage = MemoryStorage::new();
    let stage_id = create_stage(&mut storage, config)?;
    log::info!("Stage {stage_id} created");
    println!("{}", serde_json::to_string_pretty(&export(&storage)?)?);
    Ok(())
}

fn print_standings(args: &[String]) -> CliResult<()> {
    let (Some(snapshot_path), Some(stage_id)) = (args.first(), args.get(1)) else {
        return Err(usage());
    };
    let snapshot: Snapshot = serde_json::from_str(&std::fs::read_to_string(snapshot_path)?)?;
    let stage_id = stage_id.parse()?;
    let is_elimination = snapshot
        .stage
        .iter()
        .find(|s| s.id == stage_id)
        .is_some_and(|s| s.stage_type.is_elimination());

    let mut storage = MemoryStorage::new();
    import(&mut storage, snapshot)?;
    let output = if is_elimination {
        serde_json::to_string_pretty(&final_standings(&storage, stage_id)?)?
    } else {
        serde_json::to_string_pretty(&standings(&storage, stage_id)?)?
    };
    println!("{output}");
    Ok(())
}

/// One seed per record, first column only.
fn read_seeding(path: &Path) -> CliResult<Vec<Option<ParticipantId>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut seeding = Vec::new();
    for record in reader.records() {
        let record = record?;
        let entry = record.get(0).unwrap_or("");
        seeding.push(match entry.to_ascii_lowercase().as_str() {
            "" | "-" | "bye" => None,
            id => Some(id.parse()?),
        });
    }
    log::debug!("Read {} seeding entries from {}", seeding.len(), path.display());
    Ok(seeding)
}
