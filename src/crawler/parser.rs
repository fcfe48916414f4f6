//! HTML parser for discovering candidate links
//!
//! This module collects the raw values of every link-bearing attribute in a
//! page. Values are returned untouched apart from trimming; deciding whether
//! they are followable is the link resolver's job.

use scraper::{Html, Selector};

/// Tag/attribute pairs that carry navigable paths
const LINK_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("area", "href"),
    ("link", "href"),
    ("base", "href"),
    ("script", "src"),
    ("iframe", "src"),
    ("frame", "src"),
    ("embed", "src"),
    ("img", "src"),
    ("source", "src"),
    ("object", "data"),
    ("form", "action"),
];

/// A raw path found in a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The attribute value
    pub path: String,
    /// Tag the value was found in
    pub tag: String,
    /// Attribute holding the value
    pub attribute: String,
}

impl Candidate {
    fn new(path: &str, tag: &str, attribute: &str) -> Self {
        Self {
            path: path.to_string(),
            tag: tag.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

/// Extracts every candidate path from a parsed document
///
/// Candidates come out grouped by tag in a fixed order, and in document
/// order within each tag. `<meta http-equiv="refresh">` targets are included.
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use sumi_recon::crawler::extract_candidates;
///
/// let document = Html::parse_document(r#"<a href="/login">Log in</a><form action="/search"></form>"#);
/// let paths: Vec<String> = extract_candidates(&document).into_iter().map(|c| c.path).collect();
/// assert_eq!(paths, vec!["/login", "/search"]);
/// ```
pub fn extract_candidates(document: &Html) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for (tag, attribute) in LINK_ATTRIBUTES {
        let Ok(selector) = Selector::parse(&format!("{}[{}]", tag, attribute)) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attribute) {
                let value = value.trim();
                if !value.is_empty() {
                    candidates.push(Candidate::new(value, tag, attribute));
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("meta[http-equiv][content]") {
        for element in document.select(&selector) {
            let is_refresh = element
                .value()
                .attr("http-equiv")
                .is_some_and(|v| v.eq_ignore_ascii_case("refresh"));
            if !is_refresh {
                continue;
            }
            if let Some(target) = element.value().attr("content").and_then(refresh_target) {
                candidates.push(Candidate::new(target, "meta", "content"));
            }
        }
    }

    candidates
}

/// Extracts the URL from a refresh directive such as `5; url='/next'`
fn refresh_target(content: &str) -> Option<&str> {
    let lower = content.to_ascii_lowercase();
    let idx = lower.find("url=")?;
    let target = content[idx + 4..]
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim();
    (!target.is_empty()).then_some(target)
}
