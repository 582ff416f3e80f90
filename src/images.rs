//! Image Resolver
//!
//! Extracts embedded raster images from the archive mapping, resolves
//! `<img>` references inside chapter markup against archive paths, and
//! determines the single best cover image.
//!
//! Reference resolution and cover detection are layered heuristics: EPUB
//! producers disagree wildly about how image paths are written, so every
//! strategy is best-effort and a miss is never an error. Callers must treat
//! the cover in particular as "some image, not necessarily meaningful".

use std::sync::LazyLock;

use indexmap::IndexMap;
use log::{debug, warn};
use regex::Regex;

use crate::{
    metadata::find_package_document,
    types::ImageReference,
    utils::{DecodeBytes, XmlReader},
};

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img[^>]+src="([^"]+)"[^>]*>"#).unwrap());
static ALT_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)alt="([^"]*)""#).unwrap());

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Cover filename keywords, in priority order
const COVER_KEYWORDS: [&str; 5] = ["cover", "Cover", "COVER", "front", "Front"];

/// Whether an archive path names a raster image candidate
pub(crate) fn is_image_path(path: &str) -> bool {
    IMAGE_EXTENSIONS
        .iter()
        .any(|extension| path.ends_with(extension))
}

/// Extracts every embedded image from the archive mapping, keyed by its
/// archive path
///
/// Archive entry order is preserved; the cover fallback relies on it.
pub fn extract_images(entries: &IndexMap<String, Vec<u8>>) -> IndexMap<String, Vec<u8>> {
    entries
        .iter()
        .filter(|(path, _)| is_image_path(path))
        .map(|(path, data)| (path.clone(), data.clone()))
        .collect()
}

/// Resolves an `<img>` source against the image mapping via a fallback chain
///
/// Strategies are tried in order, first success wins:
/// 1. exact path match,
/// 2. suffix match after stripping `/`, `../` and `./` prefixes,
/// 3. suffix match by trailing filename only.
///
/// A source that no strategy resolves yields `None`; the caller drops the
/// reference.
pub fn find_image_by_path<'a>(
    src: &str,
    images: &'a IndexMap<String, Vec<u8>>,
) -> Option<&'a [u8]> {
    if let Some(data) = images.get(src) {
        return Some(data);
    }

    let stripped = src.strip_prefix('/').unwrap_or(src);
    let stripped = stripped.strip_prefix("../").unwrap_or(stripped);
    let stripped = stripped.strip_prefix("./").unwrap_or(stripped);
    if let Some((_, data)) = images.iter().find(|(path, _)| path.ends_with(stripped)) {
        return Some(data);
    }

    let filename = src.rsplit('/').next().unwrap_or(src);
    if let Some((_, data)) = images.iter().find(|(path, _)| path.ends_with(filename)) {
        return Some(data);
    }

    None
}

/// Scans a chapter's raw markup for `<img>` references and resolves them
///
/// For each `<img src="...">` match the source is resolved through
/// [find_image_by_path]; the resolved bytes must sniff as a recognized
/// raster format or the reference is dropped, mirroring a renderer that
/// fails to decode the bitmap. A reference whose offset would fall outside
/// `[0, cleaned_len)` is dropped as well, keeping every surviving offset a
/// valid insertion point in the chapter's cleaned text.
///
/// ## Parameters
/// - `raw`: The chapter's raw markup (not the cleaned text)
/// - `cleaned_len`: Character count of the chapter's display-cleaned text
/// - `images`: The book's archive-path-to-bytes image mapping
pub fn resolve_chapter_images(
    raw: &str,
    cleaned_len: usize,
    images: &IndexMap<String, Vec<u8>>,
) -> Vec<ImageReference> {
    let mut references = Vec::new();

    for captures in IMG_TAG.captures_iter(raw) {
        let whole = captures.get(0).unwrap();
        let src = captures.get(1).unwrap().as_str();

        let Some(data) = find_image_by_path(src, images) else {
            warn!("Dropping unresolvable image reference: {}", src);
            continue;
        };

        if image::guess_format(data).is_err() {
            warn!("Dropping image with unrecognized format: {}", src);
            continue;
        }

        let offset = raw[..whole.start()].chars().count();
        if offset >= cleaned_len {
            debug!("Dropping image reference outside cleaned text: {}", src);
            continue;
        }

        let alt = ALT_ATTR
            .captures(whole.as_str())
            .and_then(|alt_captures| alt_captures.get(1))
            .map(|alt_match| alt_match.as_str().to_string());

        references.push(ImageReference {
            data: data.to_vec(),
            alt,
            offset,
        });
    }

    references
}

/// Determines the best cover image via a three-strategy cascade
///
/// Evaluated in order, first success wins:
/// 1. filename heuristic: any image whose path contains a cover keyword,
///    checked in the priority order `cover`, `Cover`, `COVER`, `front`,
///    `Front`;
/// 2. package-document-driven: `<meta name="cover" content="ID"/>` resolved
///    through the manifest, relative to the package document's directory,
///    then by suffix match;
/// 3. fallback: the first image entry in archive order.
///
/// No cover is a valid outcome, not an error.
pub fn detect_cover(entries: &IndexMap<String, Vec<u8>>) -> Option<Vec<u8>> {
    for keyword in COVER_KEYWORDS {
        let hit = entries
            .iter()
            .find(|(path, _)| path.contains(keyword) && is_image_path(path));
        if let Some((path, data)) = hit {
            debug!("Cover detected by filename heuristic: {}", path);
            return Some(data.clone());
        }
    }

    if let Some(data) = cover_from_package_document(entries) {
        return Some(data);
    }

    let first_image = entries
        .iter()
        .find(|(path, _)| is_image_path(path))
        .map(|(_, data)| data.clone());
    if first_image.is_none() {
        debug!("No cover image detected");
    }

    first_image
}

/// Strategy 2 of the cover cascade: follow the package document's cover
/// metadata into the manifest
///
/// Any decode or parse failure simply falls through to the next strategy.
fn cover_from_package_document(entries: &IndexMap<String, Vec<u8>>) -> Option<Vec<u8>> {
    let (opf_path, opf_data) = find_package_document(entries)?;
    let content = opf_data.decode().ok()?;
    let package = XmlReader::parse(&content).ok()?;

    let cover_id = package
        .find_elements_by_name("meta")
        .find(|meta| meta.attr("name") == Some("cover"))
        .and_then(|meta| meta.attr("content"))?;
    let href = package
        .find_elements_by_name("manifest")
        .next()?
        .find_children_by_name("item")
        .find(|item| item.attr("id") == Some(cover_id))
        .and_then(|item| item.attr("href"))?;

    // The manifest href is relative to the package document's directory
    let base = opf_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    let image_path = if base.is_empty() {
        href.to_string()
    } else {
        format!("{}/{}", base, href)
    };

    if let Some(data) = entries.get(&image_path) {
        debug!("Cover detected via manifest: {}", image_path);
        return Some(data.clone());
    }

    entries
        .iter()
        .find(|(path, _)| path.ends_with(href))
        .map(|(_, data)| data.clone())
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use crate::{
        images::{detect_cover, extract_images, find_image_by_path, resolve_chapter_images},
        test_support::sample_opf,
    };

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR";
    const JPEG: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF";

    fn entries_from(pairs: &[(&str, &[u8])]) -> IndexMap<String, Vec<u8>> {
        pairs
            .iter()
            .map(|(path, data)| (path.to_string(), data.to_vec()))
            .collect()
    }

    /// Only raster-extension entries are image candidates
    #[test]
    fn test_extract_images_filter() {
        let entries = entries_from(&[
            ("OEBPS/img/a.png", PNG),
            ("OEBPS/img/b.jpeg", JPEG),
            ("OEBPS/ch1.xhtml", b"<p>text</p>"),
            ("OEBPS/style.css", b"p {}"),
        ]);

        let images = extract_images(&entries);
        assert_eq!(images.len(), 2);
        assert!(images.contains_key("OEBPS/img/a.png"));
        assert!(images.contains_key("OEBPS/img/b.jpeg"));
    }

    /// The resolution chain: exact, prefix-stripped, filename-only
    #[test]
    fn test_find_image_fallback_chain() {
        let images = entries_from(&[("OEBPS/images/pic.png", PNG)]);

        assert!(find_image_by_path("OEBPS/images/pic.png", &images).is_some());
        assert!(find_image_by_path("../images/pic.png", &images).is_some());
        assert!(find_image_by_path("./images/pic.png", &images).is_some());
        assert!(find_image_by_path("/images/pic.png", &images).is_some());
        assert!(find_image_by_path("weird/prefix/pic.png", &images).is_some());
        assert!(find_image_by_path("missing.png", &images).is_none());
    }

    /// Resolved references carry their bytes, alt text and offset
    #[test]
    fn test_resolve_chapter_images() {
        let images = entries_from(&[("img/pic.png", PNG)]);
        let raw = r#"<p>before</p><img src="img/pic.png" alt="a picture"/><p>after</p>"#;

        let references = resolve_chapter_images(raw, 1000, &images);
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].data, PNG);
        assert_eq!(references[0].alt.as_deref(), Some("a picture"));
        assert_eq!(references[0].offset, 13);
    }

    /// Unresolvable sources are dropped, not errors
    #[test]
    fn test_resolve_drops_unresolvable() {
        let images = entries_from(&[("img/pic.png", PNG)]);
        let raw = r#"<img src="nowhere.png"/>"#;

        assert!(resolve_chapter_images(raw, 1000, &images).is_empty());
    }

    /// Bytes that do not sniff as a raster format are dropped
    #[test]
    fn test_resolve_drops_undecodable_bytes() {
        let images = entries_from(&[("img/fake.png", b"not an image at all")]);
        let raw = r#"<img src="img/fake.png"/>"#;

        assert!(resolve_chapter_images(raw, 1000, &images).is_empty());
    }

    /// References whose offset falls outside the cleaned text are dropped
    #[test]
    fn test_resolve_drops_out_of_bounds_offset() {
        let images = entries_from(&[("img/pic.png", PNG)]);
        let raw = r#"<p>some long preamble here</p><img src="img/pic.png"/>"#;

        assert!(resolve_chapter_images(raw, 5, &images).is_empty());
        assert_eq!(resolve_chapter_images(raw, 1000, &images).len(), 1);
    }

    /// Strategy 1: the filename heuristic wins over everything else
    #[test]
    fn test_cover_filename_heuristic() {
        let entries = entries_from(&[
            ("OEBPS/content.opf", sample_opf().as_bytes()),
            ("OEBPS/images/first.png", PNG),
            ("OEBPS/images/cover.jpg", JPEG),
        ]);

        assert_eq!(detect_cover(&entries).as_deref(), Some(JPEG));
    }

    /// Lowercase "cover" outranks "Front" in the keyword priority list
    #[test]
    fn test_cover_keyword_priority() {
        let entries = entries_from(&[
            ("images/Front.png", PNG),
            ("images/my-cover.jpg", JPEG),
        ]);

        assert_eq!(detect_cover(&entries).as_deref(), Some(JPEG));
    }

    /// Strategy 2: the package document's cover metadata resolves through
    /// the manifest, relative to the package document's directory
    #[test]
    fn test_cover_from_package_document() {
        let entries = entries_from(&[
            ("OEBPS/content.opf", sample_opf().as_bytes()),
            ("OEBPS/images/artwork.jpg", JPEG),
            ("OEBPS/images/other.png", PNG),
        ]);

        assert_eq!(detect_cover(&entries).as_deref(), Some(JPEG));
    }

    /// Strategy 3: without any hint, the first image in archive order wins
    #[test]
    fn test_cover_first_image_fallback() {
        let entries = entries_from(&[
            ("ch1.xhtml", b"<p>text</p>"),
            ("images/zebra.png", PNG),
            ("images/aardvark.jpg", JPEG),
        ]);

        // Archive order, not path order
        assert_eq!(detect_cover(&entries).as_deref(), Some(PNG));
    }

    /// No images at all is a valid "no cover" outcome
    #[test]
    fn test_cover_absent() {
        let entries = entries_from(&[("ch1.xhtml", b"<p>text</p>")]);
        assert!(detect_cover(&entries).is_none());
    }
}
