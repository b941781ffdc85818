//! Markdown files with TOML front matter.
//!
//! ```text
//! +++
//! id = "QmxvZy8zNjY"
//! title = "API test public"
//! author = "songmu"
//! groups = ["Home"]
//! updated_at = "2019-06-23T17:22:38.496Z"
//! +++
//! content!
//! ```

use kibelasync_engine::{LocalDocument, LocalStore, SyncError, SyncResult};
use kibelasync_protocol::{FolderRef, Identifier, Timestamp};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DELIMITER: &str = "+++";

/// Errors reading or writing markdown files.
#[derive(Error, Debug)]
pub enum MarkdownError {
    /// File system error.
    #[error("{path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// The file does not start with a `+++` block.
    #[error("missing front matter")]
    MissingFrontMatter,

    /// Front matter is not valid TOML for a document.
    #[error("invalid front matter: {0}")]
    Parse(#[from] toml::de::Error),

    /// Front matter could not be rendered.
    #[error("cannot render front matter: {0}")]
    Render(#[from] toml::ser::Error),

    /// Argument is neither a number nor `<number>.md`.
    #[error("invalid filename (must be a number or [0-9]+.md): {0}")]
    InvalidFileName(String),
}

impl From<MarkdownError> for SyncError {
    fn from(err: MarkdownError) -> Self {
        SyncError::Local(err.to_string())
    }
}

// Array-of-table fields must follow plain keys in TOML, so `folders` is last.
#[derive(Debug, Serialize, Deserialize)]
struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Identifier>,
    title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    author: String,
    #[serde(default, skip_serializing_if = "is_false")]
    coediting: bool,
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    folders: Vec<FolderRef>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Parses a markdown file body.
pub fn parse(text: &str) -> Result<LocalDocument, MarkdownError> {
    let rest = text
        .strip_prefix(DELIMITER)
        .and_then(|rest| rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")))
        .ok_or(MarkdownError::MissingFrontMatter)?;

    let (header, content) = split_closing(rest).ok_or(MarkdownError::MissingFrontMatter)?;
    let meta: FrontMatter = toml::from_str(header)?;

    Ok(LocalDocument {
        id: meta.id,
        title: meta.title,
        content: content.to_string(),
        updated_at: meta.updated_at,
        coediting: meta.coediting,
        folders: meta.folders,
        groups: meta.groups,
        author: meta.author,
    })
}

fn split_closing(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Renders a document as a markdown file.
pub fn render(doc: &LocalDocument) -> Result<String, MarkdownError> {
    let meta = FrontMatter {
        id: doc.id.clone(),
        title: doc.title.clone(),
        author: doc.author.clone(),
        coediting: doc.coediting,
        groups: doc.groups.clone(),
        updated_at: doc.updated_at,
        folders: doc.folders.clone(),
    };
    let header = toml::to_string(&meta)?;
    Ok(format!("{DELIMITER}\n{header}{DELIMITER}\n{}", doc.content))
}

/// Parses a `pull` argument: a bare number or a `<number>.md` path.
///
/// Returns the note number and, for paths, the path itself.
pub fn parse_target(arg: &str) -> Result<(u64, Option<PathBuf>), MarkdownError> {
    if let Ok(number) = arg.parse::<u64>() {
        return Ok((number, None));
    }
    let path = Path::new(arg);
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(arg)
        .to_string();
    match name.split_once('.') {
        Some((stem, "md")) => stem
            .parse::<u64>()
            .map(|number| (number, Some(path.to_path_buf())))
            .map_err(|_| MarkdownError::InvalidFileName(name.clone())),
        _ => Err(MarkdownError::InvalidFileName(name)),
    }
}

/// A directory of `<number>.md` files.
#[derive(Debug, Clone)]
pub struct MarkdownStore {
    dir: PathBuf,
}

impl MarkdownStore {
    /// Creates a store rooted at `dir`. The directory is created on first
    /// write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `id`.
    pub fn path_for(&self, id: &Identifier) -> SyncResult<PathBuf> {
        let number = id.number()?;
        Ok(self.dir.join(format!("{number}.md")))
    }

    /// Reads one file.
    pub fn load(&self, path: &Path) -> Result<LocalDocument, MarkdownError> {
        let text = fs::read_to_string(path).map_err(|source| MarkdownError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&text)
    }

    /// Writes one file, replacing any existing content.
    pub fn save(&self, path: &Path, doc: &LocalDocument) -> Result<(), MarkdownError> {
        let io_err = |source: io::Error| MarkdownError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, render(doc)?).map_err(io_err)
    }
}

impl LocalStore for MarkdownStore {
    fn updated_at(&self, id: &Identifier) -> SyncResult<Option<Timestamp>> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(self.load(&path)?.updated_at)
    }

    fn write(&self, doc: &LocalDocument) -> SyncResult<()> {
        let id = doc
            .id
            .as_ref()
            .ok_or_else(|| SyncError::Local(format!("document {:?} has no id", doc.title)))?;
        let path = self.path_for(id)?;
        self.save(&path, doc)?;
        Ok(())
    }
}
