//! Data model for the normalized book
//!
//! All types here are produced by pure transformations over the immutable
//! [Book](crate::epub::Book) and are never mutated in place. Derived values
//! such as [ChapterContent] are recomputed on each query; callers that want
//! caching should layer it on top of this crate.

/// A single content document of the publication
///
/// Chapters keep the original XHTML fragment untouched; the display and
/// speech transforms are always derived from this raw content on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// The chapter title
    ///
    /// Derived from the document's `<title>` element, falling back to the
    /// first `<h1>`, falling back to `"Chapter N"` (1-based for display).
    pub title: String,

    /// The raw XHTML content of the chapter, unmodified
    pub content: String,

    /// Zero-based position of the chapter in the book's reading order
    ///
    /// Always equals the chapter's index in the owning book's chapter
    /// sequence. Order values are dense over successfully decoded chapters;
    /// entries that could not be decoded leave no gap.
    pub order: usize,
}

/// Render-ready content derived from a chapter
///
/// Produced on demand by [Book::chapter_content](crate::epub::Book::chapter_content);
/// never cached by this crate.
#[derive(Debug, Clone)]
pub struct ChapterContent {
    /// Sanitized markup fragment ready for structured display
    ///
    /// Structural tags (`<p>`, `<h1>`, `<ul>`, ...) are retained; document
    /// plumbing (XML declaration, doctype, head, styles, scripts) is not.
    pub text: String,

    /// Embedded images referenced by the chapter, in document order
    pub images: Vec<ImageReference>,
}

/// An embedded image resolved from an `<img>` reference in a chapter
#[derive(Debug, Clone)]
pub struct ImageReference {
    /// Raw bytes of the referenced image, in a recognized raster format
    pub data: Vec<u8>,

    /// The `alt` text of the `<img>` tag, when present
    pub alt: Option<String>,

    /// Character offset within the chapter's cleaned text marking the
    /// insertion point
    ///
    /// Guaranteed to lie within `[0, cleaned text length)`; references that
    /// would fall outside the cleaned text are dropped during resolution.
    pub offset: usize,
}

/// Basic metadata of a publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    /// The publication title, `"Unknown"` when unavailable
    pub title: String,

    /// The publication author, `"Unknown"` when unavailable
    pub author: String,

    /// A description of the publication
    ///
    /// Currently always empty; reserved for `dc:description` support.
    pub description: String,
}

/// A navigation node grouping a chapter with its heuristically detected
/// children
///
/// This is a view artifact for a navigation drawer: the grouping is a
/// best-effort pattern match over chapter titles, not the archive's actual
/// navigation document. It is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandableChapter {
    /// The parent chapter of this node
    pub chapter: Chapter,

    /// The contiguous run of chapters grouped under this node
    pub children: Vec<Chapter>,

    /// Whether the node should start expanded
    ///
    /// Seeded by whether the currently displayed chapter lies among the
    /// children.
    pub is_expanded: bool,
}

impl ExpandableChapter {
    /// Whether this node owns any child chapters
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
