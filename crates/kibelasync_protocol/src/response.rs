//! Typed response shapes, one per query.
//!
//! Every required field must be present: decoding a body that lacks one
//! fails instead of producing a half-filled value.

use crate::document::{Author, Document, FolderRef, GroupRef, Timestamp};
use crate::id::Identifier;
use serde::Deserialize;
use serde_json::value::RawValue;

/// The outer GraphQL envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Operation result, absent when the request failed outright.
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
    /// Errors reported by the server.
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    /// Human readable message.
    pub message: String,
}

/// A connection exposing `nodes`.
#[derive(Debug, Clone, Deserialize)]
pub struct Nodes<T> {
    /// The nodes, in server order.
    pub nodes: Vec<T>,
}

/// A connection exposing `edges`.
#[derive(Debug, Clone, Deserialize)]
pub struct Edges<T> {
    /// The edges, in server order.
    pub edges: Vec<Edge<T>>,
}

/// One edge of a paginated connection.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    /// The item.
    pub node: T,
    /// Continuation token positioned after this item.
    pub cursor: String,
}

/// `notes { totalCount }`.
#[derive(Debug, Deserialize)]
pub struct NotesCount {
    /// Count wrapper.
    pub notes: TotalCount,
}

/// `totalCount` field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    /// Number of notes in scope.
    pub total_count: usize,
}

/// `notes { nodes { ... } }`.
#[derive(Debug, Deserialize)]
pub struct NoteNodes<T> {
    /// The listing.
    pub notes: Nodes<T>,
}

/// `notes { edges { ... } }`.
#[derive(Debug, Deserialize)]
pub struct NoteEdges<T> {
    /// The listing page.
    pub notes: Edges<T>,
}

/// Partial projection returned by the id listings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteStub {
    /// Note identifier.
    pub id: Identifier,
    /// Last update time.
    pub updated_at: Timestamp,
}

/// A group as the remote returns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteGroup {
    /// Wire identifier.
    pub id: Identifier,
    /// Group name.
    pub name: String,
}

/// A folder as the remote returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFolder {
    /// Slash separated path.
    pub full_name: String,
    /// Owning group.
    pub group: RemoteGroup,
}

/// Full projection of a note.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNote {
    /// Present in listings, omitted by single-note queries.
    pub id: Option<Identifier>,
    /// Title.
    pub title: String,
    /// Markdown body.
    pub content: String,
    /// Co-editing flag.
    pub coediting: bool,
    /// Folder placements.
    pub folders: Nodes<RemoteFolder>,
    /// Group memberships.
    pub groups: Vec<RemoteGroup>,
    /// Author.
    pub author: Author,
    /// Last update time.
    pub updated_at: Timestamp,
    /// Publish time, null for drafts.
    pub published_at: Option<Timestamp>,
    /// Summary.
    pub summary: String,
}

impl RemoteNote {
    /// Converts into a [`Document`] addressed by `id`.
    pub fn into_document(self, id: Identifier) -> Document {
        Document {
            id,
            title: self.title,
            content: self.content,
            coediting: self.coediting,
            folders: self
                .folders
                .nodes
                .into_iter()
                .map(|f| FolderRef {
                    group_id: f.group.id,
                    folder_name: f.full_name,
                })
                .collect(),
            groups: self
                .groups
                .into_iter()
                .map(|g| GroupRef::resolved(g.name, g.id))
                .collect(),
            author: self.author,
            updated_at: self.updated_at,
            published_at: self.published_at,
            summary: self.summary,
        }
    }
}

/// `note(id:)`.
#[derive(Debug, Deserialize)]
pub struct NoteData {
    /// The note, null when it does not exist.
    pub note: Option<RemoteNote>,
}

/// One page of `groups { edges { node { id name } cursor } }`.
#[derive(Debug, Deserialize)]
pub struct GroupsData {
    /// Groups visible to the token, in server order.
    pub groups: Edges<RemoteGroup>,
}

/// `folderFromPath(path:)`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderData {
    /// The folder, null when the path is unknown.
    pub folder_from_path: Option<IdOnly>,
}

/// An object selected only for its identifier.
#[derive(Debug, Deserialize)]
pub struct IdOnly {
    /// Wire identifier.
    pub id: Identifier,
}

/// `updateNote { note { ... } }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteData {
    /// Mutation payload.
    pub update_note: Option<UpdatedNotePayload>,
}

/// Payload of the update mutation.
#[derive(Debug, Deserialize)]
pub struct UpdatedNotePayload {
    /// Null when the server performed no update.
    pub note: Option<UpdatedNote>,
}

/// Fields returned by a successful update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedNote {
    /// Account now credited with the note.
    pub author: Author,
    /// New update time.
    pub updated_at: Timestamp,
}

/// `createNote { note { ... } }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteData {
    /// Mutation payload.
    pub create_note: Option<CreatedNotePayload>,
}

/// Payload of the create mutation.
#[derive(Debug, Deserialize)]
pub struct CreatedNotePayload {
    /// Null when nothing was created.
    pub note: Option<CreatedNote>,
}

/// Fields returned by a successful create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNote {
    /// Identifier assigned by the remote.
    pub id: Identifier,
    /// Creation time.
    pub updated_at: Timestamp,
    /// Author account.
    pub author: Author,
}
