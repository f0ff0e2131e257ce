//! Front matter splitting.
//!
//! A document may start with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Getting Started
//! ---
//! # Getting Started
//! ```
//!
//! Anything that does not parse as a YAML mapping is treated as having no
//! front matter at all; the whole text becomes the body.

use ctxaudit_core::{Document, Metadata};
use tracing::warn;

const DELIMITER: &str = "---";

/// Where the front matter block sits in a document.
#[derive(Debug, PartialEq)]
enum Region<'a> {
    /// The document does not open with a delimiter line
    Absent,
    /// An opening delimiter without a closing one
    Unclosed,
    /// A complete block
    Block { yaml: &'a str, body: &'a str },
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(|c| c == '\r' || c == '\n') == DELIMITER
}

fn locate(content: &str) -> Region<'_> {
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Region::Absent;
    };
    if !is_delimiter(first) {
        return Region::Absent;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if is_delimiter(line) {
            return Region::Block {
                yaml: &content[start..offset],
                body: &content[offset + line.len()..],
            };
        }
        offset += line.len();
    }
    Region::Unclosed
}

/// Split raw document text into metadata and body.
///
/// Never fails: malformed front matter is logged and yields empty metadata
/// with the full original text as body.
pub fn split_front_matter(content: &str) -> Document {
    let text = content.strip_prefix('\u{feff}').unwrap_or(content);

    match locate(text) {
        Region::Absent => Document::new(Metadata::new(), content),
        Region::Unclosed => {
            warn!("Front matter opened but never closed; treating document as plain body");
            Document::new(Metadata::new(), content)
        }
        Region::Block { yaml, body } => {
            if yaml.trim().is_empty() {
                return Document::new(Metadata::new(), body.trim());
            }
            match serde_yaml::from_str::<Metadata>(yaml) {
                Ok(metadata) => Document::new(metadata, body.trim()),
                Err(e) => {
                    warn!("Failed to parse YAML front matter: {}", e);
                    Document::new(Metadata::new(), content)
                }
            }
        }
    }
}
