//! Extraction of `(name, identifier)` pairs from `AATGetTermMatch` responses.
//!
//! The service answers with a list of subjects, each carrying a
//! `Preferred_Parent` element whose text starts with the canonical label and
//! identifier of the term:
//!
//! ```xml
//! <Preferred_Parent>Neo-Romantic [300021476], styles and periods by general era [300264088]</Preferred_Parent>
//! ```
//!
//! Only the text before the first comma is inspected. A label whose
//! identifier sits after a comma, or that uses nested brackets, does not
//! yield a match and is skipped.

use lazy_static::lazy_static;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::core::RawMatch;
use crate::error::{ReconcileError, Result};

/// Element carrying the label and identifier of each hit
pub const PREFERRED_PARENT: &[u8] = b"Preferred_Parent";

lazy_static! {
    static ref LABEL_PATTERN: Regex =
        Regex::new(r"(?P<name>.*)\[(?P<result_id>.+?)\]").expect("label pattern is valid");
}

/// Parse a response body into matches, in document order.
///
/// Fails only when the body is not well-formed XML; entries that do not
/// look like `name [id]` are skipped.
pub fn parse_term_match(xml: &str) -> Result<Vec<RawMatch>> {
    Ok(preferred_parents(xml)?
        .iter()
        .filter_map(|text| parse_label(text))
        .collect())
}

/// Text content of every `Preferred_Parent` element, in document order.
///
/// Only the text before the element's first child counts, and the body must
/// hold exactly one root element.
pub fn preferred_parents(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut texts = Vec::new();
    let mut current: Option<String> = None;
    let mut collecting = false;
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut root_closed = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if root_closed {
                    return Err(malformed("junk after document element"));
                }
                depth += 1;
                saw_root = true;
                if current.is_none() && e.local_name().as_ref() == PREFERRED_PARENT {
                    current = Some(String::new());
                    collecting = true;
                } else {
                    collecting = false;
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    root_closed = true;
                }
                if e.local_name().as_ref() == PREFERRED_PARENT {
                    if let Some(text) = current.take() {
                        texts.push(text);
                    }
                    collecting = false;
                }
            }
            Event::Empty(_) => {
                if root_closed {
                    return Err(malformed("junk after document element"));
                }
                if depth == 0 {
                    root_closed = true;
                }
                saw_root = true;
                collecting = false;
            }
            Event::Text(t) => {
                if depth == 0 {
                    if !t.iter().all(u8::is_ascii_whitespace) {
                        return Err(malformed("text outside the root element"));
                    }
                } else if collecting {
                    if let Some(text) = current.as_mut() {
                        text.push_str(&t.unescape().map_err(quick_xml::Error::from)?);
                    }
                }
            }
            Event::CData(c) => {
                if collecting {
                    if let Some(text) = current.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&c));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(malformed("response has no root element"));
    }
    if depth != 0 {
        return Err(malformed("response ended inside an open element"));
    }

    Ok(texts)
}

fn malformed(message: &str) -> ReconcileError {
    ReconcileError::Provider {
        provider: "aat".to_string(),
        message: message.to_string(),
    }
}

/// Extract `(name, id)` from a `Preferred_Parent` text, if it has that shape
pub fn parse_label(text: &str) -> Option<RawMatch> {
    let head = text.split(',').next().unwrap_or_default();
    let caps = LABEL_PATTERN.captures(head)?;

    Some(RawMatch::new(&caps["name"], &caps["result_id"]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Vocabulary xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <Count>3</Count>
  <Subject>
    <Preferred_Term>Neo-Romantic</Preferred_Term>
    <Preferred_Parent>Neo-Romantic [300021476], styles and periods by general era [300264088]</Preferred_Parent>
    <Subject_ID>300021476</Subject_ID>
  </Subject>
  <Subject>
    <Preferred_Term>broken</Preferred_Term>
    <Preferred_Parent>no identifier here, [300000000]</Preferred_Parent>
  </Subject>
  <Subject>
    <Preferred_Term>Romanesque</Preferred_Term>
    <Preferred_Parent>Romanesque &amp; Gothic [300020768]</Preferred_Parent>
  </Subject>
</Vocabulary>"#;

    #[test]
    fn test_parse_term_match() {
        let matches = parse_term_match(RESPONSE).unwrap();

        assert_eq!(
            matches,
            vec![
                RawMatch::new("Neo-Romantic ", "300021476"),
                RawMatch::new("Romanesque & Gothic ", "300020768"),
            ]
        );
    }

    #[test]
    fn test_no_preferred_parents() {
        let xml = "<Vocabulary><Count>0</Count></Vocabulary>";
        assert!(parse_term_match(xml).unwrap().is_empty());

        let xml = "<Vocabulary/>";
        assert!(parse_term_match(xml).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(parse_term_match("<Vocabulary><Subject></Vocabulary>").is_err());
        assert!(parse_term_match("<Vocabulary><Subject>").is_err());
        assert!(parse_term_match("Service Unavailable").is_err());
        assert!(parse_term_match("").is_err());
    }

    #[test]
    fn test_text_after_first_child_is_ignored() {
        let xml = "<Vocabulary><Subject>\
            <Preferred_Parent>Baroque [1]<i>x</i> tail [2]</Preferred_Parent>\
            </Subject></Vocabulary>";

        assert_eq!(preferred_parents(xml).unwrap(), vec!["Baroque [1]".to_string()]);
        assert_eq!(
            parse_term_match(xml).unwrap(),
            vec![RawMatch::new("Baroque ", "1")]
        );

        let xml = "<Vocabulary><Preferred_Parent><b/>Rococo [3]</Preferred_Parent></Vocabulary>";
        assert_eq!(preferred_parents(xml).unwrap(), vec![String::new()]);
        assert!(parse_term_match(xml).unwrap().is_empty());
    }

    #[test]
    fn test_single_root_element() {
        assert!(parse_term_match("<a/><b/>").is_err());
        assert!(parse_term_match("<Vocabulary></Vocabulary><Vocabulary/>").is_err());
        assert!(parse_term_match("<Vocabulary/> trailing").is_err());
        assert!(parse_term_match("<Vocabulary/>\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(
            parse_label("Neo-Romantic [300021476], styles"),
            Some(RawMatch::new("Neo-Romantic ", "300021476"))
        );
        assert_eq!(
            parse_label("gold leaf [300264831]"),
            Some(RawMatch::new("gold leaf ", "300264831"))
        );
        // greedy name, lazy id
        assert_eq!(
            parse_label("a [1] b [2]"),
            Some(RawMatch::new("a [1] b ", "2"))
        );
    }

    #[test]
    fn test_parse_label_skips_other_shapes() {
        assert_eq!(parse_label("Neo-Romantic, [300021476]"), None);
        assert_eq!(parse_label("Neo-Romantic []"), None);
        assert_eq!(parse_label("Neo-Romantic"), None);
        assert_eq!(parse_label(""), None);
    }
}
