//! Raw-text extraction from `.docx` packages.
//!
//! Reads `word/document.xml` out of the zip container and keeps only run text.
//! Paragraph ends and explicit breaks become newlines; run tabs become tabs.

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::extraction::ExtractionError;
use crate::models::document::DocumentKind;

const DOCUMENT_PART: &str = "word/document.xml";

/// Cap on the unzipped document part. A CV body is a few hundred KiB at most.
pub const MAX_DOCUMENT_XML_BYTES: u64 = 16 * 1024 * 1024;

/// Tokens of interest in WordprocessingML, in document order.
static WORD_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<w:t(?:\s[^>]*)?>(?P<text>[^<]*)</w:t>|(?P<para></w:p>|<w:p\s*/>)|(?P<tab><w:tab\s*/>)|(?P<brk><w:(?:br|cr)(?:\s[^>]*)?/>)"#)
        .expect("word token regex is valid")
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").expect("entity regex is valid")
});

pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let unreadable = |reason: String| ExtractionError::Unreadable {
        kind: DocumentKind::Docx,
        reason,
    };

    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| unreadable(e.to_string()))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| unreadable(format!("{DOCUMENT_PART}: {e}")))?;

    if part.size() > MAX_DOCUMENT_XML_BYTES {
        return Err(unreadable(format!(
            "{DOCUMENT_PART}: {} bytes unpacked (max: {MAX_DOCUMENT_XML_BYTES})",
            part.size()
        )));
    }

    // The declared size comes from the archive itself; cap the actual read too.
    let mut xml = String::new();
    let read = (&mut part)
        .take(MAX_DOCUMENT_XML_BYTES + 1)
        .read_to_string(&mut xml)
        .map_err(|e| unreadable(format!("{DOCUMENT_PART}: {e}")))?;
    if read as u64 > MAX_DOCUMENT_XML_BYTES {
        return Err(unreadable(format!(
            "{DOCUMENT_PART}: unpacks past {MAX_DOCUMENT_XML_BYTES} bytes"
        )));
    }

    Ok(document_xml_to_text(&xml))
}

fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len() / 4);
    for caps in WORD_TOKEN_RE.captures_iter(xml) {
        if let Some(text) = caps.name("text") {
            out.push_str(&decode_entities(text.as_str()));
        } else if caps.name("para").is_some() || caps.name("brk").is_some() {
            out.push('\n');
        } else if caps.name("tab").is_some() {
            out.push('\t');
        }
    }
    out.trim().to_string()
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let code = match entity.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity.trim_start_matches('#').parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
