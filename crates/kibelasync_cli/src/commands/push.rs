//! Push command implementation.

use crate::markdown::MarkdownStore;
use kibelasync_engine::{CallContext, GraphqlTransport, PushOutcome, SyncConfig, SyncEngine};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Runs the push command.
///
/// Each file is pushed and rewritten with the refreshed front matter. A file
/// without an id creates a new note and is renamed to `<number>.md` next to
/// where it was.
pub fn run<T: GraphqlTransport>(
    config: SyncConfig,
    transport: T,
    ctx: &CallContext,
    files: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = SyncEngine::new(config, transport, MarkdownStore::new("."));

    for file in files {
        let dir = file.parent().unwrap_or_else(|| Path::new("."));
        let store = MarkdownStore::new(dir);

        let mut doc = store.load(file)?;
        let outcome = engine.push_local(ctx, &mut doc)?;

        match (outcome, doc.id.as_ref()) {
            (PushOutcome::Created, Some(id)) => {
                let target = store.path_for(id)?;
                store.save(&target, &doc)?;
                if target != *file {
                    fs::remove_file(file)?;
                }
                info!(from = %file.display(), to = %target.display(), "created");
            }
            (PushOutcome::Unchanged, _) => {
                store.save(file, &doc)?;
                info!(file = %file.display(), "not modified");
            }
            _ => {
                store.save(file, &doc)?;
                info!(file = %file.display(), "pushed");
            }
        }
    }
    Ok(())
}
