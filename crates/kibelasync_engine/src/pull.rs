//! Remote to local.

use crate::context::CallContext;
use crate::engine::SyncEngine;
use crate::error::{ResultExt, SyncResult};
use crate::local::{to_local, LocalStore};
use crate::transport::GraphqlTransport;
use kibelasync_protocol::{Document, Identifier, Timestamp};
use tracing::{debug, info};

/// What to do with one pull target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullDecision {
    /// Local copy is current.
    Skip,
    /// Fetch the full document and overwrite the local copy.
    Fetch,
}

impl PullDecision {
    /// Fetches only when there is no local copy or the remote one is
    /// strictly newer.
    pub fn decide(local: Option<Timestamp>, remote: Timestamp) -> Self {
        match local {
            Some(local) if remote <= local => PullDecision::Skip,
            _ => PullDecision::Fetch,
        }
    }
}

/// Counts from a pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullReport {
    /// Documents fetched and written.
    pub fetched: usize,
    /// Documents left alone because the local copy was current.
    pub skipped: usize,
}

impl PullReport {
    fn record(&mut self, decision: PullDecision) {
        match decision {
            PullDecision::Skip => self.skipped += 1,
            PullDecision::Fetch => self.fetched += 1,
        }
    }
}

impl<T: GraphqlTransport, L: LocalStore> SyncEngine<T, L> {
    /// Pulls every document in `folder` (all documents when `None`), newest
    /// `limit` only when `limit > 0`.
    ///
    /// Documents whose local copy is at least as new as the remote are
    /// skipped. The first failure aborts the pull.
    pub fn pull(
        &self,
        ctx: &CallContext,
        folder: Option<&str>,
        limit: usize,
    ) -> SyncResult<PullReport> {
        let folder_id = self.resolve_folder(ctx, folder)?;
        let stubs = self
            .remote
            .list_notes(ctx, folder_id.as_ref(), limit)
            .context("pull")?;
        info!(candidates = stubs.len(), "listed notes");

        let mut report = PullReport::default();
        for stub in &stubs {
            ctx.check()?;
            let local = self.local_updated_at(&stub.id)?;
            let decision = PullDecision::decide(local, stub.updated_at);
            match decision {
                PullDecision::Skip => info!(id = %stub.id, "skip {} (not modified)", stub.id),
                PullDecision::Fetch => {
                    let doc = self
                        .remote
                        .get_note(ctx, &stub.id)
                        .with_context(|| format!("pull {}", stub.id))?;
                    self.store(&doc)?;
                }
            }
            report.record(decision);
        }
        Ok(report)
    }

    /// Pulls the given documents.
    ///
    /// There is no listing to learn the remote update time from, so each
    /// document is fetched and only written when it is newer than the
    /// local copy.
    pub fn pull_ids(&self, ctx: &CallContext, ids: &[Identifier]) -> SyncResult<PullReport> {
        let mut report = PullReport::default();
        for id in ids {
            ctx.check()?;
            let local = self.local_updated_at(id)?;
            let doc = self
                .remote
                .get_note(ctx, id)
                .with_context(|| format!("pull {id}"))?;
            let decision = PullDecision::decide(local, doc.updated_at);
            match decision {
                PullDecision::Skip => info!(id = %id, "skip {id} (not modified)"),
                PullDecision::Fetch => self.store(&doc)?,
            }
            report.record(decision);
        }
        Ok(report)
    }

    /// Fetches and writes one document regardless of the local copy.
    pub fn pull_note(&self, ctx: &CallContext, id: &Identifier) -> SyncResult<Document> {
        let doc = self
            .remote
            .get_note(ctx, id)
            .with_context(|| format!("pull {id}"))?;
        self.store(&doc)?;
        Ok(doc)
    }

    /// Fetches and writes every document in scope using the full listing,
    /// without comparing update times.
    pub fn pull_full(
        &self,
        ctx: &CallContext,
        folder: Option<&str>,
        limit: usize,
    ) -> SyncResult<PullReport> {
        let folder_id = self.resolve_folder(ctx, folder)?;
        let fetched = self
            .remote
            .for_each_full_note(ctx, folder_id.as_ref(), limit, |docs| {
                for doc in &docs {
                    ctx.check()?;
                    self.store(doc)?;
                }
                Ok(())
            })
            .context("pull full")?;
        Ok(PullReport {
            fetched,
            skipped: 0,
        })
    }

    fn resolve_folder(
        &self,
        ctx: &CallContext,
        folder: Option<&str>,
    ) -> SyncResult<Option<Identifier>> {
        match folder.filter(|path| !path.is_empty()) {
            Some(path) => {
                let id = self.remote.folder_id(ctx, path).context("pull")?;
                debug!(path, id = %id, "resolved folder");
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    fn local_updated_at(&self, id: &Identifier) -> SyncResult<Option<Timestamp>> {
        self.local
            .updated_at(id)
            .with_context(|| format!("read local copy of {id}"))
    }

    fn store(&self, doc: &Document) -> SyncResult<()> {
        info!(id = %doc.id, url = %doc.url(&self.config.team), "fetched");
        self.local
            .write(&to_local(doc))
            .with_context(|| format!("write local copy of {}", doc.id))
    }
}
