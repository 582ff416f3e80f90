//! Error Type Definition Module
//!
//! This module defines the error types that may be encountered while loading
//! and normalizing an EPUB archive. All errors are uniformly wrapped in the
//! [EpubError] enumeration for convenient handling by the caller.
//!
//! Only archive-level failures ever surface from the top-level load: every
//! other condition (missing metadata, an undecodable chapter, an unresolvable
//! image reference, a missing cover) degrades to a default or empty value so
//! that a best-effort book is always produced from a syntactically valid ZIP.

use thiserror::Error;

/// Types of errors that can occur during EPUB processing
///
/// This enumeration defines the error cases encountered while reading the
/// ZIP container and decoding its entries. Variants other than
/// [EpubError::CorruptArchive] and [EpubError::IoError] are used internally
/// by the pipeline and are converted into graceful degradations before they
/// reach the caller.
#[derive(Debug, Error)]
pub enum EpubError {
    /// ZIP container related errors
    ///
    /// The byte stream is not a readable ZIP archive, or an entry could not
    /// be inflated. This is the only fatal error of the loading pipeline:
    /// there is no partial recovery at the container layer.
    #[error("Corrupt archive: {source}")]
    CorruptArchive { source: zip::result::ZipError },

    /// Data decoding error - empty data
    ///
    /// This error occurs when trying to decode an empty byte sequence
    /// or parse an empty document.
    #[error("Decode error: The data is empty.")]
    EmptyDataError,

    /// XML parsing failure error
    ///
    /// The event stream ended without ever producing a root element,
    /// usually because the document is not well-formed XML.
    #[error("Failed parsing XML: No root element could be constructed.")]
    FailedParsingXml,

    #[error("IO error: {source}")]
    IoError { source: std::io::Error },

    /// QuickXml error
    ///
    /// This error occurs when parsing XML data using the QuickXml library.
    #[error("QuickXml error: {source}")]
    QuickXmlError { source: quick_xml::Error },

    /// UTF-8 decoding error
    ///
    /// This error occurs when attempting to decode byte data into a UTF-8
    /// string but the data is not valid UTF-8. Chapter entries that fail
    /// this way are skipped rather than aborting the load.
    #[error("Decode error: {source}")]
    Utf8DecodeError { source: std::string::FromUtf8Error },

    /// UTF-16 decoding error
    ///
    /// This error occurs when attempting to decode byte data carrying a
    /// UTF-16 byte order mark but the data is not valid UTF-16.
    #[error("Decode error: {source}")]
    Utf16DecodeError { source: std::string::FromUtf16Error },
}

impl From<zip::result::ZipError> for EpubError {
    fn from(value: zip::result::ZipError) -> Self {
        EpubError::CorruptArchive { source: value }
    }
}

impl From<std::io::Error> for EpubError {
    fn from(value: std::io::Error) -> Self {
        EpubError::IoError { source: value }
    }
}

impl From<quick_xml::Error> for EpubError {
    fn from(value: quick_xml::Error) -> Self {
        EpubError::QuickXmlError { source: value }
    }
}

impl From<std::string::FromUtf8Error> for EpubError {
    fn from(value: std::string::FromUtf8Error) -> Self {
        EpubError::Utf8DecodeError { source: value }
    }
}

impl From<std::string::FromUtf16Error> for EpubError {
    fn from(value: std::string::FromUtf16Error) -> Self {
        EpubError::Utf16DecodeError { source: value }
    }
}

#[cfg(test)]
impl PartialEq for EpubError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Utf8DecodeError { source: l_source },
                Self::Utf8DecodeError { source: r_source },
            ) => l_source == r_source,

            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}
