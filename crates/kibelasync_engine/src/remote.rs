//! Typed calls against the remote document API.

use crate::context::CallContext;
use crate::error::{ResultExt, SyncError, SyncResult};
use crate::fetcher::PaginatedFetcher;
use crate::transport::GraphqlTransport;
use kibelasync_protocol::budget::{ListingShape, PagePlan};
use kibelasync_protocol::query::{self, ListingScope, CONNECTION_LIMIT};
use kibelasync_protocol::response::{
    CreateNoteData, CreatedNote, FolderData, GroupsData, NoteData, NoteNodes, NotesCount,
    NoteStub, RemoteNote, UpdateNoteData, UpdatedNote,
};
use kibelasync_protocol::{CanonicalForm, Document, Identifier, Payload};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::debug;

/// Decodes a response `data` object into its expected shape.
pub(crate) fn decode<R: DeserializeOwned>(operation: &str, data: &[u8]) -> SyncResult<R> {
    serde_json::from_slice(data).map_err(|e| SyncError::unmarshal(operation, e))
}

/// Client for the remote store, one method per query shape.
pub struct RemoteClient<T: GraphqlTransport> {
    transport: T,
}

impl<T: GraphqlTransport> RemoteClient<T> {
    /// Creates a client over the given transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call<R: DeserializeOwned>(&self, ctx: &CallContext, payload: &Payload) -> SyncResult<R> {
        let data = self.transport.execute(ctx, payload)?;
        decode(payload.operation_name(), &data)
    }

    /// Number of notes in a folder, or in total.
    pub fn notes_count(&self, ctx: &CallContext, folder: Option<&Identifier>) -> SyncResult<usize> {
        let res: NotesCount = self
            .call(ctx, &query::notes_count(folder))
            .context("failed to count notes")?;
        Ok(res.notes.total_count)
    }

    /// Lists `{id, updatedAt}` for every note in scope, capped by `limit`
    /// (zero for no cap).
    ///
    /// Totals within the flat bundle limit take one request; larger ones are
    /// paginated under the query cost ceiling.
    pub fn list_notes(
        &self,
        ctx: &CallContext,
        folder: Option<&Identifier>,
        limit: usize,
    ) -> SyncResult<Vec<NoteStub>> {
        let count = self
            .notes_count(ctx, folder)
            .context("failed to list notes")?;
        let plan = PagePlan::for_listing(count, limit);
        let scope = ListingScope {
            folder: folder.cloned(),
            newest_first: limit > 0,
        };
        debug!(count, limit, shape = ?plan.shape(), pages = plan.pages().len(), "planned listing");

        match plan.shape() {
            ListingShape::Flat => match plan.pages().first() {
                Some(&first) => {
                    let res: NoteNodes<NoteStub> = self
                        .call(ctx, &query::list_notes(first, &scope))
                        .context("failed to list notes")?;
                    Ok(res.notes.nodes)
                }
                None => Ok(Vec::new()),
            },
            _ => PaginatedFetcher::new(&self.transport, ctx)
                .fetch(&plan, |take, after| query::list_notes_page(take, after, &scope))
                .context("failed to list notes"),
        }
    }

    /// Streams full documents in pages, calling `sink` once per page.
    ///
    /// Returns the number of documents received.
    pub fn for_each_full_note<S>(
        &self,
        ctx: &CallContext,
        folder: Option<&Identifier>,
        limit: usize,
        mut sink: S,
    ) -> SyncResult<usize>
    where
        S: FnMut(Vec<Document>) -> SyncResult<()>,
    {
        let count = self
            .notes_count(ctx, folder)
            .context("failed to list full notes")?;
        let plan = PagePlan::new(count, limit, ListingShape::FullPaginated);
        let scope = ListingScope {
            folder: folder.cloned(),
            newest_first: limit > 0,
        };

        PaginatedFetcher::new(&self.transport, ctx)
            .for_each_page::<RemoteNote, _, _>(
                &plan,
                |take, after| query::list_full_notes_page(take, after, &scope),
                |notes| {
                    let docs = notes
                        .into_iter()
                        .map(|note| match note.id.clone() {
                            Some(id) => Ok(note.into_document(id)),
                            None => Err(SyncError::unmarshal(
                                "ListFullNotesPage",
                                "listed note has no id",
                            )),
                        })
                        .collect::<SyncResult<Vec<_>>>()?;
                    sink(docs)
                },
            )
            .context("failed to list full notes")
    }

    /// Fetches the full projection of one note.
    pub fn get_note(&self, ctx: &CallContext, id: &Identifier) -> SyncResult<Document> {
        let res: NoteData = self
            .call(ctx, &query::get_note(id))
            .with_context(|| format!("failed to get note {id}"))?;
        let note = res
            .note
            .ok_or_else(|| SyncError::NoteNotFound { id: id.clone() })?;
        Ok(note.into_document(id.clone()))
    }

    /// Every group visible to the token, by name.
    ///
    /// Pages of [`CONNECTION_LIMIT`] are requested until a short one comes
    /// back, so teams with more groups than one connection holds are still
    /// listed in full.
    pub fn groups(&self, ctx: &CallContext) -> SyncResult<HashMap<String, Identifier>> {
        let mut groups = HashMap::new();
        let mut cursor = String::new();
        for page in 1.. {
            ctx.check()?;
            let res: GroupsData = self
                .call(ctx, &query::list_groups_page(&cursor))
                .with_context(|| format!("failed to list groups (page {page})"))?;
            let edges = res.groups.edges;
            let received = edges.len();
            if let Some(last) = edges.last() {
                cursor = last.cursor.clone();
            }
            groups.extend(edges.into_iter().map(|e| (e.node.name, e.node.id)));
            if received < CONNECTION_LIMIT || cursor.is_empty() {
                break;
            }
        }
        debug!(groups = groups.len(), "listed groups");
        Ok(groups)
    }

    /// Resolves a folder path to its identifier.
    pub fn folder_id(&self, ctx: &CallContext, path: &str) -> SyncResult<Identifier> {
        let res: FolderData = self
            .call(ctx, &query::folder_from_path(path))
            .with_context(|| format!("failed to look up folder {path:?}"))?;
        res.folder_from_path
            .map(|f| f.id)
            .ok_or_else(|| SyncError::UnknownFolder {
                path: path.to_string(),
            })
    }

    /// Updates a note from `base` to `new`.
    ///
    /// A null note in the response means the server did no update and is
    /// reported as [`SyncError::UpdateRejected`].
    pub fn update_note(
        &self,
        ctx: &CallContext,
        id: &Identifier,
        base: &CanonicalForm,
        new: &CanonicalForm,
    ) -> SyncResult<UpdatedNote> {
        let res: UpdateNoteData = self
            .call(ctx, &query::update_note(id, base, new))
            .with_context(|| format!("failed to update note {id}"))?;
        res.update_note
            .and_then(|payload| payload.note)
            .ok_or_else(|| SyncError::UpdateRejected { id: id.clone() })
    }

    /// Creates a note.
    pub fn create_note(&self, ctx: &CallContext, input: &CanonicalForm) -> SyncResult<CreatedNote> {
        let res: CreateNoteData = self
            .call(ctx, &query::create_note(input))
            .context("failed to create note")?;
        res.create_note
            .and_then(|payload| payload.note)
            .ok_or_else(|| SyncError::remote("CreateNote", "null note returned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn client() -> RemoteClient<MockTransport> {
        RemoteClient::new(MockTransport::new())
    }

    #[test]
    fn notes_count() {
        let remote = client();
        remote
            .transport()
            .push_response(r#"{"notes": {"totalCount": 353}}"#);
        let count = remote.notes_count(&CallContext::new(), None).unwrap();
        assert_eq!(count, 353);
    }

    #[test]
    fn small_listing_is_flat() {
        let remote = client();
        remote
            .transport()
            .push_response(r#"{"notes": {"totalCount": 2}}"#);
        remote.transport().push_response(
            r#"{"notes": {"nodes": [
                {"id": "QmxvZy8x", "updatedAt": "2024-01-01T00:00:00Z"},
                {"id": "QmxvZy8y", "updatedAt": "2024-01-02T00:00:00Z"}
            ]}}"#,
        );

        let stubs = remote.list_notes(&CallContext::new(), None, 0).unwrap();
        assert_eq!(stubs.len(), 2);
        assert_eq!(
            remote.transport().operations(),
            vec!["NotesCount", "ListNotes"]
        );
        assert_eq!(remote.transport().requests()[1].variables["first"], 2);
    }

    #[test]
    fn limit_caps_request_and_orders_newest_first() {
        let remote = client();
        remote
            .transport()
            .push_response(r#"{"notes": {"totalCount": 353}}"#);
        remote.transport().push_response(r#"{"notes": {"nodes": []}}"#);

        remote.list_notes(&CallContext::new(), None, 10).unwrap();
        let request = &remote.transport().requests()[1];
        assert_eq!(request.variables["first"], 10);
        assert_eq!(request.variables["orderBy"]["direction"], "DESC");
    }

    #[test]
    fn empty_scope_skips_listing() {
        let remote = client();
        remote
            .transport()
            .push_response(r#"{"notes": {"totalCount": 0}}"#);
        let stubs = remote.list_notes(&CallContext::new(), None, 0).unwrap();
        assert!(stubs.is_empty());
        assert_eq!(remote.transport().operations(), vec!["NotesCount"]);
    }

    #[test]
    fn count_failure_is_wrapped() {
        let remote = client();
        remote.transport().push_error("error!");
        let err = remote.list_notes(&CallContext::new(), None, 0).unwrap_err();
        assert!(err.to_string().starts_with("failed to list notes: failed to count notes"));
    }

    fn group_page(range: std::ops::Range<usize>) -> String {
        let edges: Vec<_> = range
            .map(|n| {
                serde_json::json!({
                    "node": { "id": format!("R3JvdXAv{n}"), "name": format!("group-{n}") },
                    "cursor": format!("c{n}"),
                })
            })
            .collect();
        serde_json::json!({ "groups": { "edges": edges } }).to_string()
    }

    #[test]
    fn groups_by_name() {
        let remote = client();
        remote.transport().push_response(
            r#"{"groups": {"edges": [
                {"node": {"id": "R3JvdXAvMQ", "name": "Home"}, "cursor": "a"},
                {"node": {"id": "R3JvdXAvMg", "name": "Test"}, "cursor": "b"}
            ]}}"#,
        );
        let groups = remote.groups(&CallContext::new()).unwrap();
        assert_eq!(groups["Home"], Identifier::from_wire("R3JvdXAvMQ"));
        assert_eq!(groups["Test"], Identifier::from_wire("R3JvdXAvMg"));
        assert_eq!(remote.transport().operations(), vec!["ListGroups"]);
        assert!(remote.transport().requests()[0].variables["after"].is_null());
    }

    #[test]
    fn groups_beyond_one_connection_are_paged() {
        let remote = client();
        remote.transport().push_response(group_page(0..CONNECTION_LIMIT));
        remote
            .transport()
            .push_response(group_page(CONNECTION_LIMIT..CONNECTION_LIMIT + 5));

        let groups = remote.groups(&CallContext::new()).unwrap();
        assert_eq!(groups.len(), CONNECTION_LIMIT + 5);
        assert_eq!(
            groups["group-104"],
            Identifier::from_wire("R3JvdXAv104")
        );

        let requests = remote.transport().requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].variables["after"].is_null());
        assert_eq!(
            requests[1].variables["after"],
            format!("c{}", CONNECTION_LIMIT - 1)
        );
    }

    #[test]
    fn full_last_group_page_ends_on_empty_page() {
        let remote = client();
        remote.transport().push_response(group_page(0..CONNECTION_LIMIT));
        remote.transport().push_response(r#"{"groups": {"edges": []}}"#);

        let groups = remote.groups(&CallContext::new()).unwrap();
        assert_eq!(groups.len(), CONNECTION_LIMIT);
        assert_eq!(remote.transport().count("ListGroups"), 2);
    }

    #[test]
    fn missing_note_and_folder() {
        let remote = client();
        remote.transport().push_response(r#"{"note": null}"#);
        remote
            .transport()
            .push_response(r#"{"folderFromPath": null}"#);

        let ctx = CallContext::new();
        let err = remote.get_note(&ctx, &Identifier::note(5)).unwrap_err();
        assert!(matches!(err, SyncError::NoteNotFound { .. }));

        let err = remote.folder_id(&ctx, "a/b").unwrap_err();
        assert!(matches!(err, SyncError::UnknownFolder { path } if path == "a/b"));
    }

    #[test]
    fn null_update_is_rejected() {
        let remote = client();
        remote
            .transport()
            .push_response(r#"{"updateNote": {"note": null}}"#);

        let form = CanonicalForm::of(&Document::new(Identifier::note(1))).unwrap();
        let err = remote
            .update_note(&CallContext::new(), &Identifier::note(1), &form, &form)
            .unwrap_err();
        assert!(matches!(err, SyncError::UpdateRejected { .. }));
    }
}
