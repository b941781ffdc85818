//! Pull command implementation.

use crate::markdown::{parse_target, MarkdownStore};
use kibelasync_engine::{CallContext, GraphqlTransport, SyncEngine, SyncConfig};
use kibelasync_protocol::Identifier;
use std::path::Path;
use tracing::info;

/// What to pull.
#[derive(Debug)]
pub struct PullArgs<'a> {
    /// Target directory.
    pub dir: &'a Path,
    /// Folder path to restrict to, empty for all.
    pub folder: Option<&'a str>,
    /// Newest documents only; zero for all.
    pub limit: usize,
    /// Skip update-time comparison.
    pub full: bool,
    /// Explicit note numbers or `<number>.md` files.
    pub targets: &'a [String],
}

/// Runs the pull command.
pub fn run<T: GraphqlTransport>(
    config: SyncConfig,
    transport: T,
    ctx: &CallContext,
    args: PullArgs<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !args.targets.is_empty() {
        return pull_targets(config, transport, ctx, args.dir, args.targets);
    }

    let engine = SyncEngine::new(config, transport, MarkdownStore::new(args.dir));
    let report = if args.full {
        engine.pull_full(ctx, args.folder, args.limit)?
    } else {
        engine.pull(ctx, args.folder, args.limit)?
    };
    info!(
        fetched = report.fetched,
        skipped = report.skipped,
        dir = %args.dir.display(),
        "pull finished"
    );
    Ok(())
}

// A `<number>.md` argument is written back to that file, wherever it lives.
fn pull_targets<T: GraphqlTransport>(
    config: SyncConfig,
    transport: T,
    ctx: &CallContext,
    dir: &Path,
    targets: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = targets
        .iter()
        .map(|arg| parse_target(arg))
        .collect::<Result<Vec<_>, _>>()?;

    let store = MarkdownStore::new(dir);
    let engine = SyncEngine::new(config, transport, &store);
    for (number, path) in parsed {
        let id = Identifier::note(number);
        match path {
            None => {
                engine.pull_note(ctx, &id)?;
            }
            Some(path) => {
                let doc = engine.remote().get_note(ctx, &id)?;
                store.save(&path, &kibelasync_engine::to_local(&doc))?;
                info!(id = %id, path = %path.display(), "fetched");
            }
        }
    }
    Ok(())
}
