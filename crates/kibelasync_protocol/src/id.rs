//! Opaque identifier codec.
//!
//! Remote identifiers are the base64 encoding of `<Tag>/<number>`, for
//! example `QmxvZy8zNjY` for `Blog/366`. Encoding omits padding; decoding
//! accepts values with or without it.

use crate::error::{ProtocolError, ProtocolResult};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const CODEC: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The type discriminator embedded in an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdTag {
    /// A note (the remote calls these blog entries).
    Blog,
    /// A group.
    Group,
    /// A folder.
    Folder,
    /// A user.
    User,
    /// A comment.
    Comment,
    /// Any other tag the remote hands out.
    Other(String),
}

impl IdTag {
    /// Returns the wire spelling of the tag.
    pub fn as_str(&self) -> &str {
        match self {
            IdTag::Blog => "Blog",
            IdTag::Group => "Group",
            IdTag::Folder => "Folder",
            IdTag::User => "User",
            IdTag::Comment => "Comment",
            IdTag::Other(tag) => tag,
        }
    }
}

impl fmt::Display for IdTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdTag {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ProtocolError::malformed(s, "empty tag"));
        }
        if s.contains('/') {
            return Err(ProtocolError::malformed(s, "tag contains '/'"));
        }
        Ok(match s {
            "Blog" => IdTag::Blog,
            "Group" => IdTag::Group,
            "Folder" => IdTag::Folder,
            "User" => IdTag::User,
            "Comment" => IdTag::Comment,
            other => IdTag::Other(other.to_string()),
        })
    }
}

/// Opaque wire identifier assigned by the remote store.
///
/// Identifiers are never mutated: they are either received from the remote
/// or built with [`Identifier::encode`].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wraps a wire value without validating it.
    pub fn from_wire(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Encodes a tag and sequence number.
    #[must_use]
    pub fn encode(tag: &IdTag, number: u64) -> Self {
        Self(CODEC.encode(format!("{tag}/{number}")))
    }

    /// Encodes a note number with the [`IdTag::Blog`] tag.
    #[must_use]
    pub fn note(number: u64) -> Self {
        Self::encode(&IdTag::Blog, number)
    }

    /// Decodes the tag and sequence number.
    pub fn decode(&self) -> ProtocolResult<(IdTag, u64)> {
        let bytes = CODEC
            .decode(self.0.as_bytes())
            .map_err(|_| ProtocolError::malformed(&self.0, "invalid base64"))?;
        let plain = String::from_utf8(bytes)
            .map_err(|_| ProtocolError::malformed(&self.0, "not utf-8"))?;
        let (tag, number) = plain
            .rsplit_once('/')
            .ok_or_else(|| ProtocolError::malformed(&self.0, "missing '/' separator"))?;
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProtocolError::malformed(&self.0, "non-numeric sequence"));
        }
        let number = number
            .parse::<u64>()
            .map_err(|_| ProtocolError::malformed(&self.0, "sequence out of range"))?;
        let tag = tag
            .parse::<IdTag>()
            .map_err(|_| ProtocolError::malformed(&self.0, "invalid tag"))?;
        Ok((tag, number))
    }

    /// Decodes only the sequence number.
    pub fn number(&self) -> ProtocolResult<u64> {
        self.decode().map(|(_, number)| number)
    }

    /// Returns the wire value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            Ok((tag, number)) => write!(f, "Identifier({}, {tag}/{number})", self.0),
            Err(_) => write!(f, "Identifier({})", self.0),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_wire_values() {
        assert_eq!(Identifier::note(366).as_str(), "QmxvZy8zNjY");
        assert_eq!(Identifier::encode(&IdTag::Group, 1).as_str(), "R3JvdXAvMQ");

        let (tag, number) = Identifier::from_wire("QmxvZy8zNjY").decode().unwrap();
        assert_eq!(tag, IdTag::Blog);
        assert_eq!(number, 366);
    }

    #[test]
    fn decode_accepts_padding() {
        let id = Identifier::from_wire("QmxvZy8zNjY=");
        assert_eq!(id.number().unwrap(), 366);
    }

    #[test]
    fn encode_is_deterministic() {
        assert_eq!(Identifier::note(42), Identifier::note(42));
        assert_ne!(Identifier::note(42), Identifier::note(43));
        assert_ne!(
            Identifier::encode(&IdTag::Blog, 1),
            Identifier::encode(&IdTag::Group, 1)
        );
    }

    #[test]
    fn malformed_values() {
        // "Blog" with no separator
        assert!(Identifier::from_wire("QmxvZw").decode().is_err());
        // "Blog/abc"
        let id = Identifier::from_wire(CODEC.encode("Blog/abc"));
        assert!(matches!(
            id.decode(),
            Err(ProtocolError::MalformedIdentifier { .. })
        ));
        // "Blog/-1"
        assert!(Identifier::from_wire(CODEC.encode("Blog/-1")).decode().is_err());
        // "Blog/+1" parses as u64 but is not a digit run
        assert!(Identifier::from_wire(CODEC.encode("Blog/+1")).decode().is_err());
        // "/12"
        assert!(Identifier::from_wire(CODEC.encode("/12")).decode().is_err());
        // "Blog/"
        assert!(Identifier::from_wire(CODEC.encode("Blog/")).decode().is_err());
        assert!(Identifier::from_wire("!!not base64!!").decode().is_err());
        assert!(Identifier::from_wire("").decode().is_err());
    }

    #[test]
    fn unknown_tags_are_kept() {
        let tag = IdTag::Other("Attachment".into());
        let id = Identifier::encode(&tag, 9);
        assert_eq!(id.decode().unwrap(), (tag, 9));
    }

    #[test]
    fn serde_is_transparent() {
        let id = Identifier::note(1);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_str()));
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    fn tag_strategy() -> impl Strategy<Value = IdTag> {
        prop_oneof![
            Just(IdTag::Blog),
            Just(IdTag::Group),
            Just(IdTag::Folder),
            Just(IdTag::User),
            Just(IdTag::Comment),
            "[A-Z][A-Za-z0-9]{0,15}".prop_map(|s| s.parse::<IdTag>().unwrap()),
        ]
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(tag in tag_strategy(), number in any::<u64>()) {
            let id = Identifier::encode(&tag, number);
            prop_assert_eq!(id.decode().unwrap(), (tag, number));
        }
    }
}
