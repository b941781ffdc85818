//! Local to remote.

use crate::context::CallContext;
use crate::engine::SyncEngine;
use crate::error::{ResultExt, SyncError, SyncResult};
use crate::local::{LocalDocument, LocalStore};
use crate::remote::RemoteClient;
use crate::transport::GraphqlTransport;
use kibelasync_protocol::{CanonicalForm, Document, DocumentDraft, GroupRef, Identifier};
use std::collections::HashMap;
use tracing::{debug, info};

/// Result of a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Canonical forms matched; nothing was sent.
    Unchanged,
    /// One update mutation was issued.
    Updated,
    /// The document did not exist remotely and was created.
    Created,
}

/// Group name to identifier map for one push.
///
/// Seeded from the remote counterpart's memberships. A name it does not know
/// triggers a single bulk group listing, which then answers every later
/// miss in the same pass.
#[derive(Debug, Default)]
pub struct GroupResolver {
    known: HashMap<String, Identifier>,
    bulk: Option<HashMap<String, Identifier>>,
}

impl GroupResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver knowing every resolved group in `groups`.
    pub fn seeded(groups: &[GroupRef]) -> Self {
        let known = groups
            .iter()
            .filter_map(|g| g.id.clone().map(|id| (g.name.clone(), id)))
            .collect();
        Self { known, bulk: None }
    }

    /// Returns true once the bulk listing has been fetched.
    pub fn has_listed(&self) -> bool {
        self.bulk.is_some()
    }

    /// Resolves one group name.
    pub fn resolve<T: GraphqlTransport>(
        &mut self,
        ctx: &CallContext,
        remote: &RemoteClient<T>,
        name: &str,
    ) -> SyncResult<Identifier> {
        if let Some(id) = self.known.get(name) {
            return Ok(id.clone());
        }
        if self.bulk.is_none() {
            debug!(name, "group not in memberships, listing groups");
            self.bulk = Some(remote.groups(ctx)?);
        }
        self.bulk
            .as_ref()
            .and_then(|bulk| bulk.get(name))
            .cloned()
            .ok_or_else(|| SyncError::UnknownGroup {
                name: name.to_string(),
            })
    }

    /// Fills in the identifier of every unresolved group.
    pub fn resolve_all<T: GraphqlTransport>(
        &mut self,
        ctx: &CallContext,
        remote: &RemoteClient<T>,
        groups: &mut [GroupRef],
    ) -> SyncResult<()> {
        for group in groups.iter_mut().filter(|g| g.id.is_none()) {
            group.id = Some(self.resolve(ctx, remote, &group.name)?);
        }
        Ok(())
    }
}

impl<T: GraphqlTransport, L: LocalStore> SyncEngine<T, L> {
    /// Pushes an existing document.
    ///
    /// On success the local document carries the remote update time, and
    /// after an update also the returned author. On failure it is left as
    /// it was.
    pub fn push(&self, ctx: &CallContext, doc: &mut Document) -> SyncResult<PushOutcome> {
        let id = doc.id.clone();
        self.push_inner(ctx, doc)
            .with_context(|| format!("push {id}"))
    }

    fn push_inner(&self, ctx: &CallContext, doc: &mut Document) -> SyncResult<PushOutcome> {
        ctx.check()?;
        let remote = self.remote.get_note(ctx, &doc.id)?;

        let mut target = doc.clone();
        GroupResolver::seeded(&remote.groups).resolve_all(ctx, &self.remote, &mut target.groups)?;

        let base = CanonicalForm::of(&remote)?;
        let new = CanonicalForm::of(&target)?;

        if base == new {
            info!(id = %doc.id, "unchanged {}", doc.url(&self.config.team));
            doc.groups = target.groups;
            doc.updated_at = remote.updated_at;
            return Ok(PushOutcome::Unchanged);
        }

        let updated = self.remote.update_note(ctx, &doc.id, &base, &new)?;
        doc.groups = target.groups;
        doc.author = updated.author;
        doc.updated_at = updated.updated_at;
        info!(id = %doc.id, "updated {}", doc.url(&self.config.team));
        Ok(PushOutcome::Updated)
    }

    /// Creates a new remote document from a draft.
    pub fn create(&self, ctx: &CallContext, draft: &DocumentDraft) -> SyncResult<Document> {
        self.create_inner(ctx, draft)
            .with_context(|| format!("create {:?}", draft.title))
    }

    fn create_inner(&self, ctx: &CallContext, draft: &DocumentDraft) -> SyncResult<Document> {
        ctx.check()?;
        let mut draft = draft.clone();
        GroupResolver::new().resolve_all(ctx, &self.remote, &mut draft.groups)?;

        let input = CanonicalForm::of_draft(&draft)?;
        let created = self.remote.create_note(ctx, &input)?;

        let mut doc = Document::new(created.id);
        doc.title = draft.title;
        doc.content = draft.content;
        doc.coediting = draft.coediting;
        doc.folders = draft.folders;
        doc.groups = draft.groups;
        doc.author = created.author;
        doc.updated_at = created.updated_at;
        info!(id = %doc.id, "created {}", doc.url(&self.config.team));
        Ok(doc)
    }

    /// Pushes a locally stored document, creating it when it has no
    /// identifier yet.
    ///
    /// `local` is refreshed from the result only on success.
    pub fn push_local(
        &self,
        ctx: &CallContext,
        local: &mut LocalDocument,
    ) -> SyncResult<PushOutcome> {
        let content = local.content.clone();
        let (doc, outcome) = match local.id {
            Some(_) => {
                let mut doc = local.clone().into_document()?;
                let outcome = self.push(ctx, &mut doc)?;
                (doc, outcome)
            }
            None => {
                let doc = self.create(ctx, &local.clone().into_draft())?;
                (doc, PushOutcome::Created)
            }
        };
        *local = LocalDocument::from(&doc);
        local.content = content;
        Ok(outcome)
    }
}
