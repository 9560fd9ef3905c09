#![forbid(unsafe_code)]

//! XML document handling for cardsig.
//!
//! Two parsers are used over the same text: `roxmltree` checks
//! well-formedness and serves signature structure lookups, and `uppsala`
//! provides the DOM that canonicalization walks, since it keeps namespace
//! prefixes and declarations as written.  This crate adds input decoding,
//! an owned [`XmlDocument`] and the [`NodeSet`] used by document-subset
//! canonicalization.

pub mod document;
pub mod nodeset;

pub use document::XmlDocument;
pub use nodeset::NodeSet;

use cardsig_core::Error;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Return roxmltree parsing options that allow DTD.
///
/// roxmltree expands only internal entities and never fetches external
/// ones, so accepting a DTD cannot reach outside the input.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}

/// Decode raw input bytes as UTF-8, dropping a leading byte-order mark.
pub fn decode_input(data: &[u8]) -> Result<&str, Error> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    std::str::from_utf8(data).map_err(|e| Error::MalformedInput(format!("invalid UTF-8: {e}")))
}

/// Parse XML text, reporting any well-formedness error as `MalformedInput`.
pub fn parse(text: &str) -> Result<roxmltree::Document<'_>, Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    roxmltree::Document::parse_with_options(text, parsing_options())
        .map_err(|e| Error::MalformedInput(e.to_string()))
}

/// Parse XML text into the DOM walked by canonicalization.
///
/// The text must pass [`parse`] first; node ids are stable across
/// re-parses of the same text.
pub fn parse_dom(text: &str) -> Result<uppsala::Document<'_>, Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    parse(text)?;
    uppsala::parse(text).map_err(|e| Error::MalformedInput(e.to_string()))
}
