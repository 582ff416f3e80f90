//! Chapter Extractor
//!
//! Discovers XHTML content entries in the archive mapping, assigns a stable
//! reading order and extracts a per-chapter title.
//!
//! Ordering is lexicographic by archive path, a deliberate simplification
//! over spine-order parsing: it is deterministic for a given archive and
//! tolerates package documents too broken to declare a spine at all.

use std::sync::LazyLock;

use indexmap::IndexMap;
use log::warn;
use regex::Regex;

use crate::{
    types::Chapter,
    utils::{DecodeBytes, NormalizeWhitespace},
};

static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title>([^<]+)</title>").unwrap());
static H1_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<h1[^>]*>([^<]+)</h1>").unwrap());

const CHAPTER_EXTENSIONS: [&str; 3] = [".html", ".xhtml", ".htm"];

/// Extracts the ordered chapter sequence from the archive mapping
///
/// Every entry whose path ends in `.html`, `.xhtml` or `.htm` is a chapter
/// candidate. Candidates are ordered lexicographically by path, and each
/// successfully decoded chapter receives a zero-based `order` equal to its
/// position in the resulting sequence.
///
/// A candidate whose content cannot be decoded as text is skipped with a
/// warning rather than aborting the load, so `order` values stay dense over
/// the chapters that survive. A book with zero discoverable chapters is
/// valid and yields an empty sequence.
pub fn extract_chapters(entries: &IndexMap<String, Vec<u8>>) -> Vec<Chapter> {
    let mut candidates: Vec<&String> = entries
        .keys()
        .filter(|path| is_chapter_path(path))
        .collect();
    candidates.sort();

    let mut chapters = Vec::with_capacity(candidates.len());
    for path in candidates {
        let content = match entries[path].decode() {
            Ok(content) => content,
            Err(err) => {
                warn!("Skipping undecodable chapter entry {}: {}", path, err);
                continue;
            }
        };

        let order = chapters.len();
        let title = extract_title(&content).unwrap_or_else(|| format!("Chapter {}", order + 1));

        chapters.push(Chapter {
            title,
            content,
            order,
        });
    }

    chapters
}

/// Whether an archive path names a chapter content document
pub(crate) fn is_chapter_path(path: &str) -> bool {
    CHAPTER_EXTENSIONS
        .iter()
        .any(|extension| path.ends_with(extension))
}

/// Extracts a chapter title from raw markup
///
/// Searches for a `<title>` element first, then a first `<h1>`. Returns
/// `None` when neither yields a non-empty title, in which case the caller
/// falls back to a positional name.
fn extract_title(content: &str) -> Option<String> {
    TITLE_TAG
        .captures(content)
        .or_else(|| H1_TAG.captures(content))
        .and_then(|captures| captures.get(1))
        .map(|title| title.as_str().normalize_whitespace())
        .filter(|title| !title.is_empty())
}
