//! Local side of the sync.
//!
//! The engine only needs two things from local storage: the update time of a
//! stored copy, and a way to overwrite it. File layout and rendering belong
//! to the [`LocalStore`] implementation.

use crate::error::{SyncError, SyncResult};
use kibelasync_protocol::{
    normalize_content, Author, Document, DocumentDraft, FolderRef, GroupRef, Identifier,
    Timestamp,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A document as persisted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDocument {
    /// Remote identifier; `None` for a document never pushed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Identifier>,
    /// Title.
    pub title: String,
    /// Markdown body.
    #[serde(skip)]
    pub content: String,
    /// Remote update time of the last synchronized state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    /// Co-editing flag.
    #[serde(default)]
    pub coediting: bool,
    /// Folder placements.
    #[serde(default)]
    pub folders: Vec<FolderRef>,
    /// Group names.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Author account, empty for co-edited documents.
    #[serde(default)]
    pub author: String,
}

impl LocalDocument {
    /// Converts back into a [`Document`] for pushing.
    ///
    /// Groups come back by name only and must be resolved before the
    /// document can be canonicalized.
    pub fn into_document(self) -> SyncResult<Document> {
        let id = self
            .id
            .ok_or_else(|| SyncError::Local(format!("document {:?} has no id", self.title)))?;
        let mut doc = Document::new(id);
        doc.title = self.title;
        doc.content = self.content;
        doc.coediting = self.coediting;
        doc.folders = self.folders;
        doc.groups = self.groups.into_iter().map(GroupRef::named).collect();
        doc.author = Author {
            account: self.author,
        };
        if let Some(updated_at) = self.updated_at {
            doc.updated_at = updated_at;
        }
        Ok(doc)
    }

    /// Converts a never-pushed document into a creation draft.
    pub fn into_draft(self) -> DocumentDraft {
        DocumentDraft {
            title: self.title,
            content: self.content,
            coediting: self.coediting,
            folders: self.folders,
            groups: self.groups.into_iter().map(GroupRef::named).collect(),
        }
    }
}

impl From<&Document> for LocalDocument {
    fn from(doc: &Document) -> Self {
        Self {
            id: Some(doc.id.clone()),
            title: doc.title.clone(),
            content: normalize_content(&doc.content),
            updated_at: Some(doc.updated_at),
            coediting: doc.coediting,
            folders: doc.folders.clone(),
            groups: doc.groups.iter().map(|g| g.name.clone()).collect(),
            author: if doc.coediting {
                String::new()
            } else {
                doc.author.account.clone()
            },
        }
    }
}

/// Converts a fetched document into its local representation.
///
/// Content is stored trimmed with exactly one trailing newline.
pub fn to_local(doc: &Document) -> LocalDocument {
    LocalDocument::from(doc)
}

/// Storage for local copies.
pub trait LocalStore: Send + Sync {
    /// Update time of the stored copy, `None` when there is none.
    fn updated_at(&self, id: &Identifier) -> SyncResult<Option<Timestamp>>;

    /// Creates or overwrites the stored copy.
    fn write(&self, doc: &LocalDocument) -> SyncResult<()>;
}

impl<L: LocalStore + ?Sized> LocalStore for &L {
    fn updated_at(&self, id: &Identifier) -> SyncResult<Option<Timestamp>> {
        (**self).updated_at(id)
    }

    fn write(&self, doc: &LocalDocument) -> SyncResult<()> {
        (**self).write(doc)
    }
}

/// An in-memory local store for testing.
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    documents: RwLock<HashMap<Identifier, LocalDocument>>,
    writes: AtomicUsize,
}

impl MemoryLocalStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document without counting it as a write.
    pub fn insert(&self, doc: LocalDocument) {
        if let Some(id) = doc.id.clone() {
            self.documents.write().insert(id, doc);
        }
    }

    /// Returns the stored copy.
    pub fn get(&self, id: &Identifier) -> Option<LocalDocument> {
        self.documents.read().get(id).cloned()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Number of [`LocalStore::write`] calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl LocalStore for MemoryLocalStore {
    fn updated_at(&self, id: &Identifier) -> SyncResult<Option<Timestamp>> {
        Ok(self
            .documents
            .read()
            .get(id)
            .and_then(|doc| doc.updated_at))
    }

    fn write(&self, doc: &LocalDocument) -> SyncResult<()> {
        let id = doc
            .id
            .clone()
            .ok_or_else(|| SyncError::Local("cannot store a document without id".into()))?;
        self.documents.write().insert(id, doc.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
