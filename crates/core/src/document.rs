//! Documents - front matter metadata paired with a markdown body.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::quality::ParseEnumError;

/// Front matter metadata. Keys are arbitrary; see [`RECOGNIZED_FIELDS`].
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Front matter fields the analyzer knows how to score.
pub const RECOGNIZED_FIELDS: [&str; 8] = [
    "title",
    "source_url",
    "extraction_timestamp",
    "extracted_by",
    "hierarchy_levels",
    "language",
    "extraction_confidence",
    "last_updated",
];

/// A parsed document.
///
/// `metadata` is an empty map (never absent) when the source had no front
/// matter or the front matter could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Front matter key/value pairs
    pub metadata: Metadata,

    /// Body text following the front matter
    pub body: String,
}

impl Document {
    /// Create a document from already split parts.
    pub fn new(metadata: Metadata, body: impl Into<String>) -> Self {
        Self {
            metadata,
            body: body.into(),
        }
    }

    /// Whether the metadata declares `key`.
    pub fn has_field(&self, key: &str) -> bool {
        self.metadata.contains_key(key)
    }

    /// Metadata value for `key`.
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }
}

/// Heading depth, from `#` (L1) down to `####` (L4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    L1,
    L2,
    L3,
    L4,
}

impl HeadingLevel {
    /// All levels, shallowest first.
    pub const ALL: [HeadingLevel; 4] = [Self::L1, Self::L2, Self::L3, Self::L4];

    /// Number of `#` markers for this level.
    pub fn depth(self) -> usize {
        match self {
            Self::L1 => 1,
            Self::L2 => 2,
            Self::L3 => 3,
            Self::L4 => 4,
        }
    }

    /// The next shallower level, if any.
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::L1 => None,
            Self::L2 => Some(Self::L1),
            Self::L3 => Some(Self::L2),
            Self::L4 => Some(Self::L3),
        }
    }

    /// Tag used in front matter (`L1`..`L4`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
            Self::L4 => "L4",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeadingLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "L1" => Ok(Self::L1),
            "L2" => Ok(Self::L2),
            "L3" => Ok(Self::L3),
            "L4" => Ok(Self::L4),
            other => Err(ParseEnumError::new("heading level", other)),
        }
    }
}

/// Heading texts grouped by level, in document order.
///
/// Levels without any heading are absent rather than mapped to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingIndex {
    levels: BTreeMap<HeadingLevel, Vec<String>>,
}

impl HeadingIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heading.
    pub fn push(&mut self, level: HeadingLevel, text: impl Into<String>) {
        self.levels.entry(level).or_default().push(text.into());
    }

    /// Headings at `level`, if any exist.
    pub fn get(&self, level: HeadingLevel) -> Option<&[String]> {
        self.levels.get(&level).map(|v| v.as_slice())
    }

    /// Whether any heading exists at `level`.
    pub fn contains(&self, level: HeadingLevel) -> bool {
        self.levels.contains_key(&level)
    }

    /// Number of headings at `level`.
    pub fn count(&self, level: HeadingLevel) -> usize {
        self.levels.get(&level).map_or(0, Vec::len)
    }

    /// Levels that have at least one heading, shallowest first.
    pub fn levels(&self) -> impl Iterator<Item = HeadingLevel> + '_ {
        self.levels.keys().copied()
    }

    /// Whether the document has no headings at all.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_parse() {
        assert_eq!("L2".parse::<HeadingLevel>().unwrap(), HeadingLevel::L2);
        assert_eq!(" L4 ".parse::<HeadingLevel>().unwrap(), HeadingLevel::L4);
        assert!("L5".parse::<HeadingLevel>().is_err());
        assert!("l1".parse::<HeadingLevel>().is_err());
    }

    #[test]
    fn test_heading_level_parent_chain() {
        assert_eq!(HeadingLevel::L1.parent(), None);
        assert_eq!(HeadingLevel::L4.parent(), Some(HeadingLevel::L3));
        assert_eq!(HeadingLevel::L3.depth(), 3);
    }

    #[test]
    fn test_heading_index_absent_levels() {
        let mut index = HeadingIndex::new();
        assert!(index.is_empty());

        index.push(HeadingLevel::L2, "Setup");
        index.push(HeadingLevel::L2, "Usage");

        assert!(!index.contains(HeadingLevel::L1));
        assert!(index.get(HeadingLevel::L1).is_none());
        assert_eq!(index.count(HeadingLevel::L2), 2);
        assert_eq!(index.get(HeadingLevel::L2).unwrap()[1], "Usage");
        assert_eq!(index.levels().collect::<Vec<_>>(), vec![HeadingLevel::L2]);
    }

    #[test]
    fn test_document_fields() {
        let mut metadata = Metadata::new();
        metadata.insert("title".to_string(), serde_json::json!("Guide"));
        let doc = Document::new(metadata, "# Guide");

        assert!(doc.has_field("title"));
        assert!(!doc.has_field("language"));
        assert_eq!(doc.field("title"), Some(&serde_json::json!("Guide")));
        assert!(Document::default().metadata.is_empty());
    }
}
