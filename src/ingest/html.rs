//! Streaming scan of company profile HTML built on `lol_html`.
//!
//! The scanner records every element in document order without building a
//! tree or inserting implied elements, so a document that omits `<head>` or
//! `<html>` is seen exactly as written.

use std::error::Error;
use std::fmt;

use lol_html::{element, text, HtmlRewriter, OutputSink, Settings};

/// Element kinds the company profile format cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Head,
    Title,
    Body,
    H1,
    H2,
    Paragraph,
    Other(String),
}

impl NodeKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "html" => Self::Document,
            "head" => Self::Head,
            "title" => Self::Title,
            "body" => Self::Body,
            "h1" => Self::H1,
            "h2" => Self::H2,
            "p" => Self::Paragraph,
            other => Self::Other(other.to_string()),
        }
    }
}

/// The only element sequence a company profile may have.
pub const EXPECTED_STRUCTURE: [NodeKind; 7] = [
    NodeKind::Document,
    NodeKind::Head,
    NodeKind::Title,
    NodeKind::Body,
    NodeKind::H1,
    NodeKind::H2,
    NodeKind::Paragraph,
];

/// Flattened view of one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedDocument {
    /// Every element, in the order its start tag appeared.
    pub kinds: Vec<NodeKind>,
    pub title: String,
    pub h1: String,
    pub h2: String,
    pub paragraph: String,
}

impl ScannedDocument {
    /// True when the element sequence is exactly `EXPECTED_STRUCTURE`.
    pub fn has_expected_structure(&self) -> bool {
        self.kinds == EXPECTED_STRUCTURE
    }
}

/// Scan an HTML string into its element sequence and the text of the
/// elements that carry company details. Character entities are decoded.
pub fn scan_document(html: &str) -> Result<ScannedDocument, HtmlScanError> {
    let mut kinds = Vec::new();
    let mut title = String::new();
    let mut h1 = String::new();
    let mut h2 = String::new();
    let mut paragraph = String::new();

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("*", |el| {
                    kinds.push(NodeKind::from_tag(&el.tag_name()));
                    Ok(())
                }),
                text!("title", |chunk| {
                    title.push_str(chunk.as_str());
                    Ok(())
                }),
                text!("h1", |chunk| {
                    h1.push_str(chunk.as_str());
                    Ok(())
                }),
                text!("h2", |chunk| {
                    h2.push_str(chunk.as_str());
                    Ok(())
                }),
                text!("p", |chunk| {
                    paragraph.push_str(chunk.as_str());
                    Ok(())
                }),
            ],
            ..Settings::default()
        },
        NoopSink,
    );

    rewriter
        .write(html.as_bytes())
        .map_err(HtmlScanError::Rewrite)?;
    rewriter.end().map_err(HtmlScanError::Rewrite)?;

    Ok(ScannedDocument {
        kinds,
        title: decode_entities(&title),
        h1: decode_entities(&h1),
        h2: decode_entities(&h2),
        paragraph: decode_entities(&paragraph),
    })
}

/// Decode the handful of named and numeric entities that show up in
/// hand-written profiles. Unknown entities are left as written.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let decoded = tail.find(';').and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix('#')
                    .and_then(|num| match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    })
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end + 1))
        });

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Errors surfaced while scanning HTML.
#[derive(Debug)]
pub enum HtmlScanError {
    /// The rewriter rejected the input.
    Rewrite(lol_html::errors::RewritingError),
}

impl fmt::Display for HtmlScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rewrite(err) => write!(f, "html scan error: {err}"),
        }
    }
}

impl Error for HtmlScanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rewrite(err) => Some(err),
        }
    }
}

struct NoopSink;

impl OutputSink for NoopSink {
    fn handle_chunk(&mut self, _chunk: &[u8]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = "<HTML>\n<HEAD>\n<TITLE>Company Description: Acme Corp</TITLE>\n</HEAD>\n<BODY>\n<H1>Acme Corp</H1>\n<H2>Ticker: ACME</H2>\n<P>\n    Makes anvils.\n</P>\n</BODY>\n</HTML>";

    #[test]
    fn test_scan_collects_kinds_in_order() {
        let doc = scan_document(PROFILE).unwrap();
        assert_eq!(doc.kinds, EXPECTED_STRUCTURE);
        assert!(doc.has_expected_structure());
    }

    #[test]
    fn test_scan_collects_text() {
        let doc = scan_document(PROFILE).unwrap();
        assert_eq!(doc.title, "Company Description: Acme Corp");
        assert_eq!(doc.h1, "Acme Corp");
        assert_eq!(doc.h2, "Ticker: ACME");
        assert_eq!(doc.paragraph, "\n    Makes anvils.\n");
    }

    #[test]
    fn test_scan_does_not_insert_implied_elements() {
        let doc = scan_document("<title>x</title><h1>x</h1>").unwrap();
        assert_eq!(doc.kinds, vec![NodeKind::Title, NodeKind::H1]);
        assert!(!doc.has_expected_structure());
    }

    #[test]
    fn test_scan_records_unknown_elements() {
        let doc = scan_document("<html><div><span>x</span></div></html>").unwrap();
        assert_eq!(
            doc.kinds,
            vec![
                NodeKind::Document,
                NodeKind::Other("div".to_string()),
                NodeKind::Other("span".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("AT&amp;T"), "AT&T");
        assert_eq!(decode_entities("&lt;b&gt; &#65;&#x42;"), "<b> AB");
        assert_eq!(decode_entities("R&D &unknown; &"), "R&D &unknown; &");
        assert_eq!(decode_entities("plain"), "plain");
    }
}
