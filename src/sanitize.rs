//! Content Sanitizer
//!
//! Transforms raw chapter XHTML into two derived forms: a cleaned markup
//! fragment for structured rendering ([clean_for_display]) and a fully
//! detagged plain-text form for speech synthesis ([clean_for_speech]).
//!
//! Both transforms are pure functions over the raw chapter text and work by
//! best-effort pattern matching rather than tree parsing, which lets them
//! tolerate the malformed and unclosed markup real-world EPUB producers
//! emit. They never fail; at worst they pass questionable spans through.
//!
//! The two paths are not composable: the speech transform must always be
//! applied to the original raw markup, never to display-cleaned output.
//! Their entity tables intentionally diverge, so that speech engines receive
//! `...` and straight quotes while the renderer keeps typographic glyphs.

use std::sync::LazyLock;

use regex::Regex;

static XML_DECL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<\?xml[^>]*\?>").unwrap());
static DOCTYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<!DOCTYPE[^>]*>").unwrap());
static XMLNS_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"xmlns[^"]*"[^"]*""#).unwrap());
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<html[^>]*>").unwrap());
static HEAD_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<head>.*?</head>").unwrap());
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<style[^>]*>.*?</style>").unwrap());
static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<script[^>]*>.*?</script>").unwrap());
static BODY_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<body[^>]*>(.*?)</body>").unwrap());
static EPUB_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?epub:[^>]*>").unwrap());
static EPUB_TYPE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"epub:type="[^"]*""#).unwrap());

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static HEX_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#[xX]([0-9a-fA-F]+);").unwrap());
static DEC_ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(\d+);").unwrap());

/// Named entity table for the display path: typographic glyphs are kept
const DISPLAY_ENTITIES: [(&str, &str); 14] = [
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&mdash;", "\u{2014}"),
    ("&ndash;", "\u{2013}"),
    ("&lsquo;", "\u{2018}"),
    ("&rsquo;", "\u{2019}"),
    ("&ldquo;", "\u{201C}"),
    ("&rdquo;", "\u{201D}"),
    ("&hellip;", "\u{2026}"),
];

/// Named entity table for the speech path
///
/// Quotes become straight quotes and the ellipsis becomes three dots, both
/// of which speech engines read more reliably than their typographic forms.
const SPEECH_ENTITIES: [(&str, &str); 14] = [
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&mdash;", "\u{2014}"),
    ("&ndash;", "\u{2013}"),
    ("&lsquo;", "'"),
    ("&rsquo;", "'"),
    ("&ldquo;", "\""),
    ("&rdquo;", "\""),
    ("&hellip;", "..."),
];

/// Cleans raw chapter XHTML into a markup fragment for structured display
///
/// Strips the XML declaration, doctype and namespace attribute assignments,
/// removes the `<head>`, `<style>` and `<script>` blocks, extracts the
/// `<body>` interior when present, drops `epub:`-namespaced tags and
/// `epub:type` attributes, then decodes entities. Structural tags (`<p>`,
/// `<h1>`, `<ul>`, ...) are retained; the result is markup, not plain text.
pub fn clean_for_display(raw: &str) -> String {
    let cleaned = XML_DECL.replace_all(raw, "");
    let cleaned = DOCTYPE.replace_all(&cleaned, "");
    let cleaned = XMLNS_ATTR.replace_all(&cleaned, "");
    let cleaned = HTML_TAG.replace_all(&cleaned, "<html>");
    let cleaned = HEAD_BLOCK.replace_all(&cleaned, "");
    let cleaned = STYLE_BLOCK.replace_all(&cleaned, "");
    let cleaned = SCRIPT_BLOCK.replace_all(&cleaned, "");

    // Operate on the body interior if there is one, else the whole document
    let cleaned = match BODY_BLOCK.captures(&cleaned) {
        Some(captures) => captures[1].to_string(),
        None => cleaned.into_owned(),
    };

    let cleaned = EPUB_TAG.replace_all(&cleaned, "");
    let cleaned = EPUB_TYPE_ATTR.replace_all(&cleaned, "");

    decode_entities(&cleaned, &DISPLAY_ENTITIES)
        .trim()
        .to_string()
}

/// Cleans raw chapter XHTML into plain text for speech synthesis
///
/// Removes every tag-like span in a single greedy pass, collapses runs of
/// whitespace to a single space, trims, then decodes entities with the
/// speech table. Must be called with the original raw markup, not with
/// display-cleaned output.
pub fn clean_for_speech(raw: &str) -> String {
    let cleaned = ANY_TAG.replace_all(raw, " ");
    let cleaned = WHITESPACE_RUN.replace_all(&cleaned, " ");

    decode_entities(cleaned.trim(), &SPEECH_ENTITIES)
}

/// Decodes named entities from the given table, then numeric character
/// references (`&#NNN;` and `&#xHH;`)
///
/// Numeric references that do not map to a valid character are left verbatim.
fn decode_entities(text: &str, table: &[(&str, &str)]) -> String {
    let mut decoded = text.to_string();
    for (entity, replacement) in table {
        decoded = decoded.replace(entity, replacement);
    }

    let decoded = HEX_ENTITY.replace_all(&decoded, |captures: &regex::Captures| {
        u32::from_str_radix(&captures[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| captures[0].to_string())
    });
    let decoded = DEC_ENTITY.replace_all(&decoded, |captures: &regex::Captures| {
        captures[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| captures[0].to_string())
    });

    decoded.into_owned()
}
