//! Whole-storage export and import, and stage deletion.

use crate::logic::graph;
use crate::models::{BracketError, Group, Id, Match, Round, Snapshot, Stage};
use crate::storage::{Field, Filter, Storage};

/// Every stage, group, round and match as held by storage.
pub fn export<S: Storage>(storage: &S) -> Result<Snapshot, BracketError> {
    let all = Filter::all();
    Ok(Snapshot {
        stage: storage.select(&all)?,
        group: storage.select(&all)?,
        round: storage.select(&all)?,
        matches: storage.select(&all)?,
    })
}

/// Replace the content of storage with a snapshot. Ids are kept as given.
pub fn import<S: Storage>(storage: &mut S, snapshot: Snapshot) -> Result<(), BracketError> {
    let all = Filter::all();
    storage.delete::<Match>(&all)?;
    storage.delete::<Round>(&all)?;
    storage.delete::<Group>(&all)?;
    storage.delete::<Stage>(&all)?;

    log::info!(
        "Importing {} stage(s) and {} match(es)",
        snapshot.stage.len(),
        snapshot.matches.len()
    );
    storage.insert_all(snapshot.stage)?;
    storage.insert_all(snapshot.group)?;
    storage.insert_all(snapshot.round)?;
    storage.insert_all(snapshot.matches)?;
    Ok(())
}

/// Remove a stage with its groups, rounds and matches.
pub fn delete_stage<S: Storage>(storage: &mut S, stage_id: Id) -> Result<(), BracketError> {
    graph::load_stage(storage, stage_id)?;
    let children = Filter::by(Field::StageId, stage_id);
    storage.delete::<Match>(&children)?;
    storage.delete::<Round>(&children)?;
    storage.delete::<Group>(&children)?;
    storage.delete::<Stage>(&Filter::by(Field::Id, stage_id))?;
    log::info!("Deleted stage {stage_id}");
    Ok(())
}
