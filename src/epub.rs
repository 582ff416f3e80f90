//! Normalized book model and top-level queries
//!
//! The [Book] structure is the core of the loading pipeline. Loading an
//! archive fully materializes the book: metadata, the ordered chapter
//! sequence, the embedded image mapping and the detected cover. Deriving
//! renderable content for a chapter happens lazily per access and is never
//! cached here; callers that want caching should layer it on top.

use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use indexmap::IndexMap;

use crate::{
    chapters, container,
    error::EpubError,
    images, metadata, sanitize,
    types::{BookMetadata, Chapter, ChapterContent},
};

/// A loaded EPUB publication, normalized into an immutable document model
///
/// A `Book` is constructed atomically by [Book::from_reader]: either the
/// whole load succeeds and every field is populated, or the load fails and
/// no partial state is observable. Once constructed the book is immutable,
/// so independent chapters may be derived concurrently without locking.
///
/// # Potential Issues
/// - The entire archive is materialized in memory at load time. This is a
///   known scalability ceiling for very large publications and part of the
///   contract; switching to streaming would change caller-visible behavior.
/// - Chapter ordering is lexicographic by archive path rather than
///   spine-declared reading order. This is deterministic and tolerant of
///   broken package documents, but can disagree with the author's intended
///   order for unusually named archives.
pub struct Book {
    /// The publication title, `"Unknown"` when unavailable
    pub title: String,

    /// The publication author, `"Unknown"` when unavailable
    pub author: String,

    /// The ordered chapter sequence
    ///
    /// Each chapter's `order` field equals its index in this sequence.
    pub chapters: Vec<Chapter>,

    /// Embedded raster images, keyed by archive path, in archive order
    pub images: IndexMap<String, Vec<u8>>,

    /// The detected cover image, best-effort
    ///
    /// Produced by a heuristic cascade; `None` is a valid outcome and
    /// callers must never treat the cover as authoritative.
    pub cover_image: Option<Vec<u8>>,
}

impl Book {
    /// Loads an EPUB publication from a reader
    ///
    /// This is the single blocking entry point of the pipeline: it reads
    /// the whole container, resolves metadata, extracts and orders the
    /// chapters, collects embedded images and runs cover detection.
    ///
    /// Repeated loads of the same byte stream produce books with identical
    /// chapter ordering, titles and content.
    ///
    /// ## Parameters
    /// - `reader`: The data source believed to be a ZIP archive
    ///
    /// ## Return
    /// - `Ok(Book)`: The normalized publication
    /// - `Err(EpubError)`: The container itself was unreadable. Semantic
    ///   problems inside a readable container (missing metadata, broken
    ///   chapters, unresolvable images) never fail the load; they degrade
    ///   to defaults or omissions.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, EpubError> {
        let entries = container::read_archive(reader)?;

        let metadata = metadata::resolve_metadata(&entries);
        let chapters = chapters::extract_chapters(&entries);
        let images = images::extract_images(&entries);
        let cover_image = images::detect_cover(&entries);

        Ok(Self {
            title: metadata.title,
            author: metadata.author,
            chapters,
            images,
            cover_image,
        })
    }

    /// The number of chapters in the book
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// The book's basic metadata
    pub fn metadata(&self) -> BookMetadata {
        BookMetadata {
            title: self.title.clone(),
            author: self.author.clone(),
            description: String::new(),
        }
    }

    /// Derives render-ready content for the chapter at `index`
    ///
    /// Returns the display-cleaned markup together with the chapter's
    /// resolved image references. The derivation is a pure function of the
    /// chapter's raw content and is recomputed on every call.
    ///
    /// An out-of-range index returns empty content rather than failing;
    /// callers must not rely on an error for bounds checking.
    pub fn chapter_content(&self, index: usize) -> ChapterContent {
        let Some(chapter) = self.chapters.get(index) else {
            return ChapterContent {
                text: String::new(),
                images: Vec::new(),
            };
        };

        let text = sanitize::clean_for_display(&chapter.content);
        let images =
            images::resolve_chapter_images(&chapter.content, text.chars().count(), &self.images);

        ChapterContent { text, images }
    }
}

impl Book {
    /// Loads an EPUB publication from a file path
    ///
    /// Convenience constructor over [Book::from_reader].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EpubError> {
        let file = File::open(path).map_err(EpubError::from)?;
        Self::from_reader(BufReader::new(file))
    }
}
