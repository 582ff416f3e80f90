//! Chapter Hierarchy Builder
//!
//! Groups the flat, ordered chapter list into a parent/child navigation
//! tree using numbering and indentation heuristics. This is a UI affordance
//! for a navigation drawer, not a canonical table of contents: the
//! archive's actual navigation document (NCX or nav.xhtml) is never
//! consulted, so grouping quality depends entirely on how chapter titles
//! happen to be written. Testers should expect best-effort results.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Chapter, ExpandableChapter};

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)").unwrap());

const CHILD_MARKERS: [&str; 4] = ["\u{2192}", "\u{2022}", "-", "*"];

/// Groups chapters into expandable navigation nodes
///
/// Child runs are consumed greedily left to right: each chapter claims the
/// contiguous run of immediately following chapters that classify as its
/// children, and grouping restarts at the first non-matching chapter. A
/// parent whose child run contains `current_index` is marked pre-expanded.
///
/// ## Parameters
/// - `chapters`: The book's flat chapter sequence, in reading order
/// - `current_index`: The order of the currently displayed chapter
pub fn group_chapters(chapters: &[Chapter], current_index: usize) -> Vec<ExpandableChapter> {
    let mut grouped = Vec::new();
    let mut index = 0;

    while index < chapters.len() {
        let current = &chapters[index];

        let mut children = Vec::new();
        let mut next = index + 1;
        while next < chapters.len() && is_child_title(&current.title, &chapters[next].title) {
            children.push(chapters[next].clone());
            next += 1;
        }

        let is_expanded = children.iter().any(|child| child.order == current_index);

        grouped.push(ExpandableChapter {
            chapter: current.clone(),
            children,
            is_expanded,
        });

        index = next;
    }

    grouped
}

/// Classifies whether `child` reads as a direct child of `parent`
///
/// Any of three patterns qualifies:
/// 1. both titles carry a leading dotted-numeric prefix and the child's
///    prefix extends the parent's by exactly one segment ("1" -> "1.2";
///    "1.1.1" is not a child of "1"),
/// 2. the child title has leading whitespace the parent title lacks,
/// 3. the trimmed child title starts with a list marker.
fn is_child_title(parent: &str, child: &str) -> bool {
    if let (Some(parent_number), Some(child_number)) = (leading_number(parent), leading_number(child))
    {
        let extension = child_number
            .strip_prefix(parent_number)
            .and_then(|rest| rest.strip_prefix('.'));
        if let Some(segment) = extension {
            if !segment.is_empty() && !segment.contains('.') {
                return true;
            }
        }
    }

    if child.trim_start().len() < child.len() && parent.trim_start().len() == parent.len() {
        return true;
    }

    let child_trimmed = child.trim();
    CHILD_MARKERS
        .iter()
        .any(|marker| child_trimmed.starts_with(marker))
}

/// Extracts the leading dotted-numeric prefix of a title, if any
/// (e.g. "1.2" from "1.2 Methods")
fn leading_number(title: &str) -> Option<&str> {
    LEADING_NUMBER
        .captures(title.trim())
        .map(|captures| captures.get(1).unwrap().as_str())
}

#[cfg(test)]
mod tests {
    use crate::{
        hierarchy::{group_chapters, is_child_title},
        types::Chapter,
    };

    fn chapters_from(titles: &[&str]) -> Vec<Chapter> {
        titles
            .iter()
            .enumerate()
            .map(|(order, title)| Chapter {
                title: title.to_string(),
                content: String::new(),
                order,
            })
            .collect()
    }

    /// Dotted numbering one level deeper classifies as a child
    #[test]
    fn test_numbered_children_grouped() {
        let chapters = chapters_from(&["1 Intro", "1.1 Basics", "1.2 More", "2 Next"]);

        let grouped = group_chapters(&chapters, 0);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].chapter.title, "1 Intro");
        assert_eq!(grouped[0].children.len(), 2);
        assert_eq!(grouped[1].chapter.title, "2 Next");
        assert!(grouped[1].children.is_empty());
    }

    /// Deeper nesting is excluded: "1.1.1" is not a grandchild under "1"
    #[test]
    fn test_no_deeper_nesting() {
        let chapters = chapters_from(&["1 Intro", "1.1 Basics", "1.1.1 Details"]);

        let grouped = group_chapters(&chapters, 0);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].children.len(), 1);
        assert_eq!(grouped[0].children[0].title, "1.1 Basics");
        assert_eq!(grouped[1].chapter.title, "1.1.1 Details");
    }

    /// "12.1" is not a child of "1" despite the shared leading digit
    #[test]
    fn test_prefix_must_match_whole_segment() {
        assert!(is_child_title("1 Intro", "1.2 More"));
        assert!(!is_child_title("1 Intro", "12.1 Unrelated"));
        assert!(!is_child_title("1 Intro", "2.1 Other"));
    }

    /// Indented titles classify as children of unindented predecessors
    #[test]
    fn test_indentation_heuristic() {
        let chapters = chapters_from(&["Main", "  Sub one", "  Sub two", "Other"]);

        let grouped = group_chapters(&chapters, 0);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].children.len(), 2);
    }

    /// Marker prefixes classify as children
    #[test]
    fn test_marker_heuristic() {
        for marker in ["\u{2192} Sub", "\u{2022} Sub", "- Sub", "* Sub"] {
            assert!(is_child_title("Main", marker), "marker {:?}", marker);
        }
        assert!(!is_child_title("Main", "Plain"));
    }

    /// A parent is pre-expanded when the selected chapter is among its
    /// children, and only then
    #[test]
    fn test_pre_expansion() {
        let chapters = chapters_from(&["1 Intro", "1.1 Basics", "2 Next", "2.1 Sub"]);

        let grouped = group_chapters(&chapters, 1);
        assert!(grouped[0].is_expanded);
        assert!(!grouped[1].is_expanded);

        let grouped = group_chapters(&chapters, 2);
        assert!(!grouped[0].is_expanded);
        assert!(!grouped[1].is_expanded);
    }

    /// Unrelated titles produce a flat list
    #[test]
    fn test_flat_titles_stay_flat() {
        let chapters = chapters_from(&["Foreword", "The Journey", "Epilogue"]);

        let grouped = group_chapters(&chapters, 0);
        assert_eq!(grouped.len(), 3);
        assert!(grouped.iter().all(|node| !node.has_children()));
    }

    /// An empty chapter list yields an empty grouping
    #[test]
    fn test_empty_input() {
        assert!(group_chapters(&[], 0).is_empty());
    }
}
