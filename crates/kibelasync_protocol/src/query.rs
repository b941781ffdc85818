//! GraphQL request payloads.
//!
//! Each function builds the payload for exactly one query shape; the
//! matching response shape lives in [`crate::response`].

use crate::canonical::CanonicalForm;
use crate::id::Identifier;
use serde::Serialize;
use serde_json::{json, Value};

/// Most groups or folders fetched by one nested connection.
pub const CONNECTION_LIMIT: usize = 100;

macro_rules! full_note_fields {
    () => {
        "title content coediting \
         folders(first: 100) { nodes { fullName group { id name } } } \
         groups { id name } \
         author { account } \
         updatedAt publishedAt summary"
    };
}

const NOTES_COUNT: &str = "query NotesCount($folderId: ID) {
  notes(first: 0, folderId: $folderId) { totalCount }
}";

const LIST_NOTES: &str = "query ListNotes($first: Int!, $folderId: ID, $orderBy: NoteOrder) {
  notes(first: $first, folderId: $folderId, orderBy: $orderBy) {
    nodes { id updatedAt }
  }
}";

const LIST_NOTES_PAGE: &str =
    "query ListNotesPage($first: Int!, $after: String, $folderId: ID, $orderBy: NoteOrder) {
  notes(first: $first, after: $after, folderId: $folderId, orderBy: $orderBy) {
    edges { node { id updatedAt } cursor }
  }
}";

const LIST_FULL_NOTES_PAGE: &str = concat!(
    "query ListFullNotesPage($first: Int!, $after: String, $folderId: ID, $orderBy: NoteOrder) {
  notes(first: $first, after: $after, folderId: $folderId, orderBy: $orderBy) {
    edges { node { id ",
    full_note_fields!(),
    " } cursor }
  }
}"
);

const GET_NOTE: &str = concat!(
    "query GetNote($id: ID!) {\n  note(id: $id) { ",
    full_note_fields!(),
    " }\n}"
);

const LIST_GROUPS: &str = "query ListGroups($first: Int!, $after: String) {
  groups(first: $first, after: $after) { edges { node { id name } cursor } }
}";

const FOLDER_FROM_PATH: &str = "query FolderFromPath($path: String!) {
  folderFromPath(path: $path) { id }
}";

const UPDATE_NOTE: &str =
    "mutation UpdateNote($id: ID!, $baseNote: NoteInput!, $newNote: NoteInput!) {
  updateNote(input: { id: $id, baseNote: $baseNote, newNote: $newNote, draft: false }) {
    note { author { account } updatedAt }
  }
}";

const CREATE_NOTE: &str = "mutation CreateNote($input: CreateNoteInput!) {
  createNote(input: $input) {
    note { id updatedAt author { account } }
  }
}";

/// A GraphQL request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    /// Operation document.
    pub query: String,
    /// Operation variables.
    pub variables: Value,
}

impl Payload {
    fn new(query: &str, variables: Value) -> Self {
        Self {
            query: query.to_string(),
            variables,
        }
    }

    /// Name of the operation, for logging.
    pub fn operation_name(&self) -> &str {
        self.query
            .split(|c: char| c == '(' || c == '{')
            .next()
            .and_then(|head| head.split_whitespace().nth(1))
            .unwrap_or("anonymous")
    }

    /// Serializes the request body.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Where a listing starts and how it is scoped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingScope {
    /// Folder to list, `None` for every note.
    pub folder: Option<Identifier>,
    /// Order newest first so a limited listing keeps the latest notes.
    pub newest_first: bool,
}

impl ListingScope {
    fn order_by(&self) -> Value {
        if self.newest_first {
            json!({ "field": "CONTENT_UPDATED_AT", "direction": "DESC" })
        } else {
            Value::Null
        }
    }
}

/// Count-only query.
pub fn notes_count(folder: Option<&Identifier>) -> Payload {
    Payload::new(NOTES_COUNT, json!({ "folderId": folder }))
}

/// Flat `{id, updatedAt}` listing.
pub fn list_notes(first: usize, scope: &ListingScope) -> Payload {
    Payload::new(
        LIST_NOTES,
        json!({
            "first": first,
            "folderId": scope.folder,
            "orderBy": scope.order_by(),
        }),
    )
}

/// One page of `{id, updatedAt}` edges. An empty cursor starts at the beginning.
pub fn list_notes_page(first: usize, after: &str, scope: &ListingScope) -> Payload {
    Payload::new(LIST_NOTES_PAGE, page_variables(first, after, scope))
}

/// One page of full documents.
pub fn list_full_notes_page(first: usize, after: &str, scope: &ListingScope) -> Payload {
    Payload::new(LIST_FULL_NOTES_PAGE, page_variables(first, after, scope))
}

fn page_variables(first: usize, after: &str, scope: &ListingScope) -> Value {
    let after = if after.is_empty() {
        Value::Null
    } else {
        Value::String(after.to_string())
    };
    json!({
        "first": first,
        "after": after,
        "folderId": scope.folder,
        "orderBy": scope.order_by(),
    })
}

/// Full projection of a single note.
pub fn get_note(id: &Identifier) -> Payload {
    Payload::new(GET_NOTE, json!({ "id": id }))
}

/// First page of the bulk group listing.
pub fn list_groups() -> Payload {
    list_groups_page("")
}

/// One page of [`CONNECTION_LIMIT`] groups. An empty cursor starts at the
/// beginning.
pub fn list_groups_page(after: &str) -> Payload {
    let after = if after.is_empty() {
        Value::Null
    } else {
        Value::String(after.to_string())
    };
    Payload::new(
        LIST_GROUPS,
        json!({ "first": CONNECTION_LIMIT, "after": after }),
    )
}

/// Folder lookup by path.
pub fn folder_from_path(path: &str) -> Payload {
    Payload::new(FOLDER_FROM_PATH, json!({ "path": path }))
}

/// Update mutation carrying the pre-image and post-image.
pub fn update_note(id: &Identifier, base: &CanonicalForm, new: &CanonicalForm) -> Payload {
    Payload::new(
        UPDATE_NOTE,
        json!({ "id": id, "baseNote": base, "newNote": new }),
    )
}

/// Creation mutation.
pub fn create_note(input: &CanonicalForm) -> Payload {
    Payload::new(
        CREATE_NOTE,
        json!({
            "input": {
                "title": input.title,
                "content": input.content,
                "groupIds": input.group_ids,
                "folders": input.folders,
                "coediting": input.coediting,
                "draft": false,
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names() {
        assert_eq!(notes_count(None).operation_name(), "NotesCount");
        assert_eq!(get_note(&Identifier::note(1)).operation_name(), "GetNote");
        assert_eq!(list_groups().operation_name(), "ListGroups");
        let scope = ListingScope::default();
        assert_eq!(list_notes_page(10, "", &scope).operation_name(), "ListNotesPage");
    }

    #[test]
    fn empty_cursor_is_null() {
        let scope = ListingScope::default();
        let payload = list_notes_page(3200, "", &scope);
        assert!(payload.variables["after"].is_null());
        assert_eq!(payload.variables["first"], 3200);

        let payload = list_notes_page(3200, "Y3Vyc29y", &scope);
        assert_eq!(payload.variables["after"], "Y3Vyc29y");
    }

    #[test]
    fn scope_variables() {
        let scope = ListingScope {
            folder: Some(Identifier::from_wire("Rm9sZGVyLzE")),
            newest_first: true,
        };
        let payload = list_notes(10, &scope);
        assert_eq!(payload.variables["folderId"], "Rm9sZGVyLzE");
        assert_eq!(payload.variables["orderBy"]["direction"], "DESC");

        let payload = list_notes(10, &ListingScope::default());
        assert!(payload.variables["folderId"].is_null());
        assert!(payload.variables["orderBy"].is_null());
    }

    #[test]
    fn group_pages_carry_cursor() {
        let first = list_groups();
        assert_eq!(first.variables["first"], CONNECTION_LIMIT);
        assert!(first.variables["after"].is_null());
        assert!(first.query.contains("cursor"));

        let next = list_groups_page("Z3JvdXBz");
        assert_eq!(next.operation_name(), "ListGroups");
        assert_eq!(next.variables["after"], "Z3JvdXBz");
    }

    #[test]
    fn full_fields_are_selected() {
        let payload = get_note(&Identifier::note(1));
        for field in ["content", "coediting", "groups { id name }", "updatedAt", "summary"] {
            assert!(payload.query.contains(field), "missing {field}");
        }
    }

    #[test]
    fn body_shape() {
        let body = notes_count(None).to_json().unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert!(value["query"].as_str().unwrap().contains("totalCount"));
        assert!(value["variables"].is_object());
    }
}
