//! Metadata Resolver
//!
//! Locates and parses the package document (OPF) to extract the publication
//! title and author. Lookup is a permissive suffix/substring match on entry
//! paths rather than strict container.xml resolution, accepting the layouts
//! real-world EPUB producers emit.
//!
//! Metadata extraction never fails the overall load: on any parse failure
//! or absence the resolver falls back to `("Unknown", "Unknown")`.

use indexmap::IndexMap;
use log::warn;

use crate::{
    error::EpubError,
    types::BookMetadata,
    utils::{DecodeBytes, NormalizeWhitespace, XmlElement, XmlReader},
};

pub(crate) const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

const UNKNOWN: &str = "Unknown";

/// Finds the package document entry in the archive mapping
///
/// Accepts any entry whose path ends in `.opf` or contains `content.opf`.
/// The cover detection cascade shares this lookup.
pub(crate) fn find_package_document(
    entries: &IndexMap<String, Vec<u8>>,
) -> Option<(&String, &Vec<u8>)> {
    entries
        .iter()
        .find(|(path, _)| path.ends_with(".opf") || path.contains("content.opf"))
}

/// Resolves the publication metadata from the archive mapping
///
/// Reads the first `dc:title` and first `dc:creator` of the package
/// document. Absence of the document, of either element, or any decode or
/// parse failure degrades to `"Unknown"` values with a warning.
pub fn resolve_metadata(entries: &IndexMap<String, Vec<u8>>) -> BookMetadata {
    let Some((path, data)) = find_package_document(entries) else {
        warn!("No package document found; using default metadata");
        return default_metadata();
    };

    match parse_package_metadata(data) {
        Ok(metadata) => metadata,
        Err(err) => {
            warn!("Failed to parse package document {}: {}", path, err);
            default_metadata()
        }
    }
}

fn parse_package_metadata(data: &[u8]) -> Result<BookMetadata, EpubError> {
    let content = data.decode()?;
    let package = XmlReader::parse(&content)?;

    let title = first_dc_text(&package, "title").unwrap_or_else(|| UNKNOWN.to_string());
    let author = first_dc_text(&package, "creator").unwrap_or_else(|| UNKNOWN.to_string());

    Ok(BookMetadata {
        title,
        author,
        description: String::new(),
    })
}

/// Text content of the first Dublin Core element with the given local name
///
/// Recognizes the element either by its resolved namespace or by a literal
/// `dc` prefix, since broken package documents frequently use the prefix
/// without declaring it.
fn first_dc_text(package: &XmlElement, name: &str) -> Option<String> {
    package
        .find_elements_by_name(name)
        .find(|element| {
            element.namespace.as_deref() == Some(DC_NAMESPACE)
                || element.prefix.as_deref() == Some("dc")
        })
        .map(|element| element.text().normalize_whitespace())
        .filter(|text| !text.is_empty())
}

fn default_metadata() -> BookMetadata {
    BookMetadata {
        title: UNKNOWN.to_string(),
        author: UNKNOWN.to_string(),
        description: String::new(),
    }
}
