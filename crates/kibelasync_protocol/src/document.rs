//! Document model shared by the remote and local sides.

use crate::id::Identifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Update and publish times, always UTC.
pub type Timestamp = DateTime<Utc>;

/// A group reference on a document.
///
/// Local documents only know group names; the identifier is filled in by the
/// push engine before diffing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    /// User-facing group name.
    pub name: String,
    /// Wire identifier, once resolved.
    pub id: Option<Identifier>,
}

impl GroupRef {
    /// Creates a reference known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    /// Creates a fully resolved reference.
    pub fn resolved(name: impl Into<String>, id: Identifier) -> Self {
        Self {
            name: name.into(),
            id: Some(id),
        }
    }
}

/// A folder placement, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRef {
    /// Group owning the folder.
    pub group_id: Identifier,
    /// Slash separated folder path.
    pub folder_name: String,
}

/// The account a document is attributed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Account name.
    pub account: String,
}

/// A document as the sync engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Stable remote identifier.
    pub id: Identifier,
    /// Title.
    pub title: String,
    /// Markdown body.
    pub content: String,
    /// Whether the document is co-edited rather than owned by its author.
    pub coediting: bool,
    /// Folder placements, in order.
    pub folders: Vec<FolderRef>,
    /// Group memberships.
    pub groups: Vec<GroupRef>,
    /// Author account.
    pub author: Author,
    /// Last update time. The Unix epoch stands for "never".
    pub updated_at: Timestamp,
    /// Publish time, absent for drafts.
    pub published_at: Option<Timestamp>,
    /// Remote-generated summary.
    pub summary: String,
}

impl Document {
    /// Creates an empty document with the given identifier.
    pub fn new(id: Identifier) -> Self {
        Self {
            id,
            title: String::new(),
            content: String::new(),
            coediting: false,
            folders: Vec::new(),
            groups: Vec::new(),
            author: Author::default(),
            updated_at: Timestamp::default(),
            published_at: None,
            summary: String::new(),
        }
    }

    /// Web URL of the document on the given team.
    ///
    /// Co-edited documents live under `/notes`, owned ones under the author.
    pub fn url(&self, team: &str) -> String {
        let base = if self.coediting {
            "notes".to_string()
        } else {
            format!("@{}", self.author.account)
        };
        match self.id.number() {
            Ok(number) => format!("https://{team}.kibe.la/{base}/{number}"),
            Err(_) => format!("https://{team}.kibe.la/{base}/{}", self.id),
        }
    }
}

/// A document that has not been created remotely yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDraft {
    /// Title.
    pub title: String,
    /// Markdown body.
    pub content: String,
    /// Whether the document is co-edited.
    pub coediting: bool,
    /// Folder placements.
    pub folders: Vec<FolderRef>,
    /// Group memberships.
    pub groups: Vec<GroupRef>,
}
