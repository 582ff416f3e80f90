//! Epub ingest library
//!
//! A Rust library for ingesting EPUB eBook files into a normalized,
//! immutable document model.
//!
//! This library reads an EPUB container and produces a [epub::Book]: basic
//! metadata, an ordered chapter sequence, the embedded images and a
//! best-effort cover. From the loaded book it derives render-ready chapter
//! content on demand, with separate cleaning paths for visual display and
//! for speech synthesis, and can group the chapter list into a navigation
//! hierarchy.
//!
//! The loader is deliberately forgiving: a malformed container is the only
//! fatal condition. Missing metadata, undecodable chapters, unresolvable
//! image references and absent covers all degrade to defaults or omissions
//! with a logged warning, because a partially readable book is more useful
//! than no book.
//!
//! ## Features
//!
//! - Read the EPUB container, resolve metadata, extract ordered chapters.
//! - Per-chapter content sanitization for display and for speech.
//! - Chapter-scoped image resolution with path fallback and validation.
//! - Cover detection cascade and chapter hierarchy grouping.
//!
//! ## Quick Start
//!
//! ```rust, ignore
//! # use epub_ingest::epub::Book;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load an EPUB file
//! let book = Book::open("path/to/file.epub")?;
//!
//! // Get metadata
//! println!("Title: {}", book.title);
//! println!("Author: {}", book.author);
//!
//! // Derive display-ready content for a chapter
//! let content = book.chapter_content(0);
//! println!("{}", content.text);
//!
//! # Ok(())
//! # }
//! ```

pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub mod chapters;
pub mod container;
pub mod epub;
pub mod error;
pub mod hierarchy;
pub mod images;
pub mod metadata;
pub mod sanitize;
pub mod types;

pub use utils::DecodeBytes;
