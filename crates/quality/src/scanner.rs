//! Structural scanning of markdown bodies.
//!
//! Everything the scorers need to know about a body is collected once into a
//! [`StructureScan`]; the scorers never look at raw lines themselves.

use ctxaudit_core::{HeadingIndex, HeadingLevel};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*([-*+])[ \t]+").expect("list marker pattern"));

static INTERNAL_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(#([^)]+)\)").expect("internal link pattern"));

static SLUG_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("slug strip pattern"));

static SLUG_COLLAPSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("slug collapse pattern"));

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?。！？]+").expect("sentence end pattern"));

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// 1-based line of the opening fence
    pub line: usize,
    /// Info string language, if one was given
    pub language: Option<String>,
}

/// A `[text](#anchor)` link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalLink {
    pub text: String,
    pub anchor: String,
}

/// Everything the scorers read from a body.
#[derive(Debug, Clone, Default)]
pub struct StructureScan {
    pub headings: HeadingIndex,
    /// Heading lines (e.g. `## Setup`) with no content before the next heading
    pub empty_sections: Vec<String>,
    /// Anchor slugs derived from L1-L4 headings
    pub heading_ids: HashSet<String>,
    /// Distinct unordered-list markers
    pub list_markers: BTreeSet<char>,
    /// Distinct code fence delimiters
    pub fence_styles: BTreeSet<String>,
    pub code_blocks: Vec<CodeBlock>,
    pub internal_links: Vec<InternalLink>,
    pub word_count: usize,
    pub avg_sentence_length: f64,
}

impl StructureScan {
    /// Scan a body.
    pub fn scan(body: &str) -> Self {
        let headings = extract_headings(body);
        let heading_ids = heading_ids(body);

        Self {
            headings,
            empty_sections: find_empty_sections(body),
            heading_ids,
            list_markers: list_markers(body),
            fence_styles: fence_styles(body),
            code_blocks: code_blocks(body),
            internal_links: internal_links(body),
            word_count: word_count(body),
            avg_sentence_length: average_sentence_length(body),
        }
    }

    /// Internal links whose anchor matches no derived heading ID.
    pub fn broken_links(&self) -> impl Iterator<Item = &InternalLink> {
        self.internal_links
            .iter()
            .filter(move |l| !self.heading_ids.contains(&l.anchor))
    }

    /// Code blocks opened without a language tag.
    pub fn untagged_code_blocks(&self) -> usize {
        self.code_blocks.iter().filter(|b| b.language.is_none()).count()
    }
}

/// Parse an ATX heading line of any depth into `(depth, text)`.
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let line = line.trim_end_matches('\r');
    let depth = line.chars().take_while(|c| *c == '#').count();
    if depth == 0 {
        return None;
    }
    let rest = &line[depth..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    Some((depth, text))
}

fn level_for_depth(depth: usize) -> Option<HeadingLevel> {
    HeadingLevel::ALL.into_iter().find(|l| l.depth() == depth)
}

/// Headings at depths 1-4, grouped by level.
pub fn extract_headings(body: &str) -> HeadingIndex {
    let mut index = HeadingIndex::new();
    for line in body.lines() {
        if let Some((depth, text)) = parse_heading(line) {
            if let Some(level) = level_for_depth(depth) {
                index.push(level, text);
            }
        }
    }
    index
}

/// Headings whose next non-blank line is another heading or the end of the body.
pub fn find_empty_sections(body: &str) -> Vec<String> {
    let lines: Vec<&str> = body.lines().collect();
    let mut empty = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if parse_heading(line).is_none() {
            continue;
        }
        let next = lines[i + 1..].iter().find(|l| !l.trim().is_empty());
        match next {
            Some(next) if parse_heading(next).is_none() => {}
            _ => empty.push(line.trim().to_string()),
        }
    }

    empty
}

/// Anchor slug for a heading: lowercase, strip everything but word
/// characters, whitespace and hyphens, then collapse runs of hyphens and
/// whitespace into a single hyphen.
pub fn heading_id(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = SLUG_STRIP.replace_all(&lower, "");
    SLUG_COLLAPSE.replace_all(&stripped, "-").into_owned()
}

/// Slugs for every L1-L4 heading. Distinct headings sharing a slug are all
/// valid targets.
pub fn heading_ids(body: &str) -> HashSet<String> {
    body.lines()
        .filter_map(parse_heading)
        .filter(|(depth, _)| level_for_depth(*depth).is_some())
        .map(|(_, text)| heading_id(text))
        .collect()
}

/// Distinct unordered-list markers used at line start.
pub fn list_markers(body: &str) -> BTreeSet<char> {
    LIST_MARKER
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().chars().next())
        .collect()
}

/// Distinct code fence delimiters, recognized the same way as in
/// [`code_blocks`].
pub fn fence_styles(body: &str) -> BTreeSet<String> {
    body.lines()
        .filter_map(fence_marker)
        .map(|(marker, _)| marker.to_string())
        .collect()
}

fn fence_marker(line: &str) -> Option<(&'static str, &str)> {
    let trimmed = line.trim_start();
    for marker in ["```", "~~~"] {
        if trimmed.starts_with(marker) {
            let fence_char = marker.chars().next().unwrap_or('`');
            return Some((marker, trimmed.trim_start_matches(fence_char)));
        }
    }
    None
}

/// Fenced code blocks, pairing each opener with the next matching closer.
pub fn code_blocks(body: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<&'static str> = None;

    for (i, line) in body.lines().enumerate() {
        let Some((marker, info)) = fence_marker(line) else {
            continue;
        };
        match open {
            None => {
                let language = info
                    .split_whitespace()
                    .next()
                    .map(|lang| lang.to_string());
                blocks.push(CodeBlock { line: i + 1, language });
                open = Some(marker);
            }
            Some(current) if current == marker && info.trim().is_empty() => {
                open = None;
            }
            Some(_) => {}
        }
    }

    blocks
}

/// Links pointing at an anchor in the same document.
pub fn internal_links(body: &str) -> Vec<InternalLink> {
    INTERNAL_LINK
        .captures_iter(body)
        .map(|c| InternalLink {
            text: c[1].to_string(),
            anchor: c[2].to_string(),
        })
        .collect()
}

/// Whitespace-separated word count.
pub fn word_count(body: &str) -> usize {
    body.split_whitespace().count()
}

/// Mean words per sentence; 0 when there are no sentences.
pub fn average_sentence_length(body: &str) -> f64 {
    let sentences: Vec<&str> = SENTENCE_END
        .split(body)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.is_empty() {
        return 0.0;
    }

    let words: usize = sentences.iter().map(|s| word_count(s)).sum();
    words as f64 / sentences.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "# Main Title\n\nIntro text.\n\n## Section 1\n\nContent.\n\n## Section 2\n\n### Subsection 2.1\n\nMore.\n\n##### Deep\n\ntext\n";

    #[test]
    fn test_extract_headings_by_level() {
        let headings = extract_headings(BODY);
        assert_eq!(headings.get(HeadingLevel::L1).unwrap(), ["Main Title"]);
        assert_eq!(headings.get(HeadingLevel::L2).unwrap(), ["Section 1", "Section 2"]);
        assert_eq!(headings.count(HeadingLevel::L3), 1);
        assert!(!headings.contains(HeadingLevel::L4));
    }

    #[test]
    fn test_heading_requires_whitespace_and_text() {
        let headings = extract_headings("#hashtag\n#\n##   Spaced   \n");
        assert!(!headings.contains(HeadingLevel::L1));
        assert_eq!(headings.get(HeadingLevel::L2).unwrap(), ["Spaced"]);
    }

    #[test]
    fn test_empty_sections() {
        let empty = find_empty_sections(BODY);
        assert_eq!(empty, vec!["## Section 2".to_string()]);
    }

    #[test]
    fn test_trailing_heading_is_empty() {
        let empty = find_empty_sections("# Title\n\nBody.\n\n## Later\n\n");
        assert_eq!(empty, vec!["## Later".to_string()]);
    }

    #[test]
    fn test_heading_id_slug() {
        assert_eq!(heading_id("Getting Started!"), "getting-started");
        assert_eq!(heading_id("API - Reference  (v2)"), "api-reference-v2");
        assert_eq!(heading_id("Étape Un"), "étape-un");
    }

    #[test]
    fn test_heading_ids_allow_collisions() {
        let ids = heading_ids("# Setup\n\n## Setup!\n\n##### Ignored\n");
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("setup"));
    }

    #[test]
    fn test_list_markers() {
        let markers = list_markers("- one\n  * nested\n+ three\n---\n**bold**\n");
        assert_eq!(markers.into_iter().collect::<Vec<_>>(), vec!['*', '+', '-']);
    }

    #[test]
    fn test_fence_styles() {
        let styles = fence_styles("```rust\nfn main() {}\n```\n~~~\nplain\n~~~\n");
        assert_eq!(styles.len(), 2);
        assert!(styles.contains("~~~"));
    }

    #[test]
    fn test_indented_fences_count_for_both_checks() {
        let body = "- step\n\n    ~~~\n    ls\n    ~~~\n\n```rust\nfn main() {}\n```\n";
        let styles = fence_styles(body);
        assert_eq!(styles.into_iter().collect::<Vec<_>>(), vec!["```", "~~~"]);

        let blocks = code_blocks(body);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, None);
    }

    #[test]
    fn test_code_blocks_pair_openers_and_closers() {
        let body = "```python\nprint(1)\n```\n\n```\nno lang\n```\n\n~~~ bash\nls\n~~~\n";
        let blocks = code_blocks(body);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].language.as_deref(), Some("python"));
        assert_eq!(blocks[1].language, None);
        assert_eq!(blocks[1].line, 5);
        assert_eq!(blocks[2].language.as_deref(), Some("bash"));
    }

    #[test]
    fn test_internal_links_and_broken() {
        let body = "# Install Guide\n\nSee [install](#install-guide) and [missing](#nowhere). [ext](https://x.io)\n";
        let scan = StructureScan::scan(body);
        assert_eq!(scan.internal_links.len(), 2);
        let broken: Vec<_> = scan.broken_links().map(|l| l.anchor.as_str()).collect();
        assert_eq!(broken, vec!["nowhere"]);
    }

    #[test]
    fn test_sentence_length() {
        assert_eq!(average_sentence_length(""), 0.0);
        assert_eq!(average_sentence_length("One two three. Four five!"), 2.5);
        assert_eq!(average_sentence_length("これは文です。次の文"), 1.0);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  alpha beta\n\tgamma  "), 3);
        assert_eq!(StructureScan::scan(BODY).word_count, 19);
    }
}
