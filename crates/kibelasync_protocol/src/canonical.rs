//! Comparison-normal form of a document.
//!
//! Two documents with equal canonical forms are the same as far as the
//! remote store is concerned, so pushing one over the other is a no-op.
//! The same projection doubles as the mutation input.

use crate::document::{Document, DocumentDraft, FolderRef, GroupRef};
use crate::error::{ProtocolError, ProtocolResult};
use serde::Serialize;

/// Normalized projection used for diffing and as `NoteInput`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalForm {
    /// Title, verbatim.
    pub title: String,
    /// Trimmed content with exactly one trailing newline.
    pub content: String,
    /// Group identifiers, sorted ascending.
    pub group_ids: Vec<String>,
    /// Folder placements, in document order.
    pub folders: Vec<FolderRef>,
    /// Co-editing flag.
    pub coediting: bool,
}

impl CanonicalForm {
    /// Canonicalizes a document whose groups are all resolved.
    pub fn of(document: &Document) -> ProtocolResult<Self> {
        Self::build(
            &document.title,
            &document.content,
            &document.groups,
            &document.folders,
            document.coediting,
        )
    }

    /// Canonicalizes a draft whose groups are all resolved.
    pub fn of_draft(draft: &DocumentDraft) -> ProtocolResult<Self> {
        Self::build(
            &draft.title,
            &draft.content,
            &draft.groups,
            &draft.folders,
            draft.coediting,
        )
    }

    fn build(
        title: &str,
        content: &str,
        groups: &[GroupRef],
        folders: &[FolderRef],
        coediting: bool,
    ) -> ProtocolResult<Self> {
        let mut group_ids = groups
            .iter()
            .map(|g| {
                g.id.as_ref()
                    .map(|id| id.as_str().to_string())
                    .ok_or_else(|| ProtocolError::UnresolvedGroup {
                        name: g.name.clone(),
                    })
            })
            .collect::<ProtocolResult<Vec<_>>>()?;
        group_ids.sort();

        Ok(Self {
            title: title.to_string(),
            content: normalize_content(content),
            group_ids,
            folders: folders.to_vec(),
            coediting,
        })
    }
}

/// Trims surrounding whitespace and appends a single newline.
pub fn normalize_content(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 1);
    out.push_str(content.trim());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{IdTag, Identifier};

    fn group(name: &str, n: u64) -> GroupRef {
        GroupRef::resolved(name, Identifier::encode(&IdTag::Group, n))
    }

    fn doc() -> Document {
        let mut doc = Document::new(Identifier::note(1));
        doc.title = "Weekly".into();
        doc.content = "hello\n".into();
        doc.groups = vec![group("Home", 1), group("Dev", 2)];
        doc
    }

    #[test]
    fn content_is_normalized() {
        assert_eq!(normalize_content("  body\n\n\n"), "body\n");
        assert_eq!(normalize_content("body"), "body\n");
        assert_eq!(normalize_content(""), "\n");
    }

    #[test]
    fn group_order_is_irrelevant() {
        let a = doc();
        let mut b = doc();
        b.groups.reverse();
        b.content = "\n hello  \n".into();
        assert_eq!(CanonicalForm::of(&a).unwrap(), CanonicalForm::of(&b).unwrap());
    }

    #[test]
    fn group_ids_sorted() {
        let form = CanonicalForm::of(&doc()).unwrap();
        let mut sorted = form.group_ids.clone();
        sorted.sort();
        assert_eq!(form.group_ids, sorted);
    }

    #[test]
    fn detects_changes() {
        let base = CanonicalForm::of(&doc()).unwrap();

        let mut changed = doc();
        changed.coediting = true;
        assert_ne!(base, CanonicalForm::of(&changed).unwrap());

        let mut changed = doc();
        changed.title = "Monthly".into();
        assert_ne!(base, CanonicalForm::of(&changed).unwrap());

        let mut changed = doc();
        changed.groups.pop();
        assert_ne!(base, CanonicalForm::of(&changed).unwrap());

        // fields outside the projection do not count
        let mut same = doc();
        same.summary = "changed".into();
        same.author.account = "someone".into();
        assert_eq!(base, CanonicalForm::of(&same).unwrap());
    }

    #[test]
    fn unresolved_group_is_error() {
        let mut d = doc();
        d.groups.push(GroupRef::named("Ops"));
        let err = CanonicalForm::of(&d).unwrap_err();
        assert!(matches!(err, ProtocolError::UnresolvedGroup { name } if name == "Ops"));
    }

    #[test]
    fn serializes_as_note_input() {
        let json = serde_json::to_value(CanonicalForm::of(&doc()).unwrap()).unwrap();
        assert_eq!(json["title"], "Weekly");
        assert_eq!(json["content"], "hello\n");
        assert!(json["groupIds"].is_array());
        assert_eq!(json["coediting"], false);
    }
}
