//! Container Reader
//!
//! Streams a ZIP archive into a mapping from entry path to raw content
//! bytes. This layer has no EPUB awareness: it simply materializes every
//! non-directory entry in memory, which is a documented constraint of the
//! pipeline (large archives are loaded whole; there is no streaming).

use std::io::{Read, Seek};

use indexmap::IndexMap;
use zip::ZipArchive;

use crate::error::EpubError;

/// Reads every non-directory entry of a ZIP archive into memory
///
/// The resulting mapping is keyed by the archive-relative entry path
/// (forward-slash separated) and preserves archive entry order, which later
/// stages rely on for deterministic "first image" fallbacks. Duplicate paths
/// are resolved by "last entry wins", matching standard ZIP semantics.
///
/// ## Parameters
/// - `reader`: The data source believed to be a ZIP archive
///
/// ## Return
/// - `Ok(IndexMap<String, Vec<u8>>)`: Entry path to raw content bytes
/// - `Err(EpubError)`: The stream is not a readable ZIP archive, or an
///   entry could not be inflated. A malformed container fails the whole
///   load; there is no partial recovery at this layer.
pub fn read_archive<R: Read + Seek>(reader: R) -> Result<IndexMap<String, Vec<u8>>, EpubError> {
    let mut archive = ZipArchive::new(reader).map_err(EpubError::from)?;
    let mut entries = IndexMap::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)
            .map_err(|err| EpubError::CorruptArchive {
                source: zip::result::ZipError::Io(err),
            })?;

        // IndexMap keeps the first occurrence's position while replacing
        // the value, so duplicate paths resolve to the last entry's bytes
        entries.insert(file.name().to_string(), data);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::{container::read_archive, error::EpubError, test_support::build_archive};

    /// Every non-directory entry appears in the mapping, in archive order
    #[test]
    fn test_read_archive_maps_entries() {
        let archive = build_archive(&[
            ("mimetype", b"application/epub+zip"),
            ("OEBPS/ch1.xhtml", b"<p>one</p>"),
            ("OEBPS/images/pic.png", b"\x89PNG"),
        ]);

        let entries = read_archive(Cursor::new(archive)).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries["OEBPS/ch1.xhtml"], b"<p>one</p>");

        let keys: Vec<&String> = entries.keys().collect();
        assert_eq!(keys, ["mimetype", "OEBPS/ch1.xhtml", "OEBPS/images/pic.png"]);
    }

    /// Directory entries are not part of the mapping
    #[test]
    fn test_read_archive_skips_directories() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.add_directory("OEBPS", options).unwrap();
        writer.start_file("OEBPS/ch1.xhtml", options).unwrap();
        std::io::Write::write_all(&mut writer, b"<p>one</p>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let entries = read_archive(Cursor::new(bytes)).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("OEBPS/ch1.xhtml"));
    }

    /// Duplicate paths resolve to the bytes of the last entry
    #[test]
    fn test_read_archive_duplicate_paths_last_wins() {
        let archive = build_archive(&[("a.txt", b"first"), ("a.txt", b"second")]);

        let entries = read_archive(Cursor::new(archive)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["a.txt"], b"second");
    }

    /// A stream that is not a ZIP archive fails the load as a whole
    #[test]
    fn test_read_archive_rejects_garbage() {
        let result = read_archive(Cursor::new(b"this is not a zip archive".to_vec()));
        assert!(matches!(
            result,
            Err(EpubError::CorruptArchive { source: _ })
        ));
    }

    /// A truncated archive fails the load as a whole
    #[test]
    fn test_read_archive_rejects_truncated() {
        let archive = build_archive(&[("ch1.xhtml", b"<p>hello</p>")]);
        let truncated = archive[..archive.len() / 2].to_vec();

        let result = read_archive(Cursor::new(truncated));
        assert!(matches!(
            result,
            Err(EpubError::CorruptArchive { source: _ })
        ));
    }
}
