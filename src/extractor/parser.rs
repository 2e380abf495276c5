//! Sitemap XML parser
//!
//! This module turns a sitemap document into the entries the resolver needs:
//! - `<sitemap><loc>` entries of a sitemap index
//! - `<url><loc>` entries of a URL set
//!
//! Element names are matched on their local name, so namespace prefixes are
//! ignored. Extension elements such as `<image:loc>` are not picked up because
//! only a `<loc>` directly inside `<url>` or `<sitemap>` counts.

use crate::ExtractError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Entries extracted from one sitemap document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    /// Sub-sitemap URLs, in document order (non-empty for a sitemap index)
    pub sitemaps: Vec<String>,

    /// Page URLs, in document order
    pub urls: Vec<String>,
}

impl SitemapDocument {
    /// Returns true if the document lists other sitemaps
    pub fn is_index(&self) -> bool {
        !self.sitemaps.is_empty()
    }
}

/// Parses sitemap XML
///
/// # Arguments
///
/// * `xml` - The document text
/// * `source_url` - Where the document came from (used in error messages)
///
/// # Returns
///
/// * `Ok(SitemapDocument)` - The index and URL-set entries found
/// * `Err(ExtractError::Parse)` - Malformed XML, an empty document, or a
///   `<sitemap>` entry without a `<loc>`
///
/// # Example
///
/// ```
/// use sitemap_harvest::extractor::parse_sitemap;
///
/// let xml = r#"<urlset><url><loc>https://example.com/a</loc></url></urlset>"#;
/// let doc = parse_sitemap(xml, "https://example.com/sitemap.xml").unwrap();
/// assert_eq!(doc.urls, vec!["https://example.com/a".to_string()]);
/// assert!(!doc.is_index());
/// ```
pub fn parse_sitemap(xml: &str, source_url: &str) -> Result<SitemapDocument, ExtractError> {
    let parse_error = |message: String| ExtractError::Parse {
        url: source_url.to_string(),
        message,
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = SitemapDocument::default();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut saw_root = false;

    // Text of the <loc> being read
    let mut loc = String::new();
    // Some while inside a <sitemap>; holds its <loc> once seen
    let mut sitemap_loc: Option<Option<String>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_root = true;
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"sitemap" => sitemap_loc = Some(None),
                    b"loc" => loc.clear(),
                    _ => {}
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                saw_root = true;
                if e.local_name().as_ref() == b"sitemap" {
                    return Err(parse_error("<sitemap> entry without <loc>".to_string()));
                }
            }
            Ok(Event::Text(e)) => {
                if top_is(&stack, b"loc") {
                    let text = e
                        .unescape()
                        .map_err(|err| parse_error(format!("bad text in <loc>: {}", err)))?;
                    loc.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if top_is(&stack, b"loc") {
                    loc.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                let closed = stack.pop();
                match closed.as_deref() {
                    Some(b"loc") => {
                        let value = loc.trim();
                        if value.is_empty() {
                            continue;
                        }
                        if top_is(&stack, b"url") {
                            document.urls.push(value.to_string());
                        } else if top_is(&stack, b"sitemap") {
                            if let Some(slot) = sitemap_loc.as_mut() {
                                if slot.is_none() {
                                    *slot = Some(value.to_string());
                                }
                            }
                        }
                    }
                    Some(b"sitemap") => match sitemap_loc.take() {
                        Some(Some(sub)) => document.sitemaps.push(sub),
                        _ => {
                            return Err(parse_error("<sitemap> entry without <loc>".to_string()))
                        }
                    },
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(parse_error(format!(
                    "malformed XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(parse_error("document has no root element".to_string()));
    }

    if !stack.is_empty() {
        return Err(parse_error("unexpected end of document".to_string()));
    }

    Ok(document)
}

fn top_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().map(Vec::as_slice) == Some(name)
}
