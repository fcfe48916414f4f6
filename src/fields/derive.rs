//! Field derivation from result URLs

use crate::fields::{Field, RequestedField};
use crate::output::CrawlResult;
use crate::url::{hostname, registered_domain};
use indexmap::IndexMap;
use serde::Serialize;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Everything but ASCII alphanumerics and `-_.~` is escaped in query output
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A single derived field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOutput {
    pub field: String,
    pub value: String,
}

impl FieldOutput {
    fn new(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

/// Parsed pieces of a result URL shared by every field
struct UrlParts<'a> {
    raw: &'a str,
    hostname: String,
    root_url: String,
    path: String,
    /// Query values grouped by key, keys in first-seen order
    query: IndexMap<String, Vec<String>>,
}

impl<'a> UrlParts<'a> {
    fn parse(raw: &'a str) -> Option<Self> {
        let url = Url::parse(raw).ok()?;

        let (root_url, path) = match split_authority(raw) {
            Some((authority, has_path)) => {
                let path = if has_path { decode_path(&url) } else { String::new() };
                (format!("{}://{}", url.scheme(), authority), path)
            }
            None => {
                let mut root_url = format!("{}://{}", url.scheme(), url.host_str().unwrap_or(""));
                if let Some(port) = url.port() {
                    root_url.push_str(&format!(":{}", port));
                }
                (root_url, decode_path(&url))
            }
        };

        let mut query: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, value) in url.query_pairs() {
            query
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }

        Some(Self {
            raw,
            hostname: hostname(&url),
            root_url,
            path,
            query,
        })
    }

    /// Query encoded with sorted keys, the way other tools expect to diff it
    fn canonical_query(&self) -> String {
        let mut keys: Vec<&String> = self.query.keys().collect();
        keys.sort();

        let mut pairs = Vec::new();
        for key in keys {
            for value in &self.query[key] {
                pairs.push(format!("{}={}", query_escape(key), query_escape(value)));
            }
        }
        pairs.join("&")
    }

    fn has_path(&self) -> bool {
        !self.path.is_empty() && self.path != "/"
    }

    /// Last path element, ignoring trailing slashes
    fn base_name(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or("")
    }

    /// Path up to and including the last `/` before the final segment
    fn directory(&self) -> Option<&str> {
        if !self.has_path() {
            return None;
        }
        let rest = self.path.get(1..)?;
        let idx = rest.rfind('/')?;
        self.path.get(..idx + 2)
    }
}

/// Authority of a `scheme://` URL as written (userinfo dropped, port kept),
/// and whether a path follows it
fn split_authority(raw: &str) -> Option<(&str, bool)> {
    let rest = &raw[raw.find("://")? + 3..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    Some((host, rest[end..].starts_with('/')))
}

/// Percent-decoded URL path
fn decode_path(url: &Url) -> String {
    percent_decode_str(url.path()).decode_utf8_lossy().into_owned()
}

/// Escapes a query component: unreserved characters stay, spaces become `+`
fn query_escape(component: &str) -> String {
    utf8_percent_encode(component, QUERY_COMPONENT)
        .to_string()
        .replace("%20", "+")
}

impl Field {
    /// Appends the rows of this field for a URL
    fn derive_into(self, parts: &UrlParts<'_>, out: &mut Vec<FieldOutput>) {
        let name = self.name();
        match self {
            Field::Url => out.push(FieldOutput::new(name, parts.raw)),
            Field::Fqdn => out.push(FieldOutput::new(name, parts.hostname.as_str())),
            Field::Rdn => out.push(FieldOutput::new(
                name,
                registered_domain(&parts.hostname).unwrap_or_default(),
            )),
            Field::Rurl => out.push(FieldOutput::new(name, parts.root_url.as_str())),
            Field::Path => {
                if !parts.path.is_empty() {
                    out.push(FieldOutput::new(name, parts.path.as_str()));
                }
            }
            Field::Qpath => {
                if !parts.query.is_empty() {
                    let value = format!("{}?{}", parts.path, parts.canonical_query());
                    out.push(FieldOutput::new(name, value));
                }
            }
            Field::Qurl => {
                if !parts.query.is_empty() {
                    out.push(FieldOutput::new(name, parts.raw));
                }
            }
            Field::Key => {
                for key in parts.query.keys() {
                    out.push(FieldOutput::new(name, key.as_str()));
                }
            }
            Field::Value => {
                for value in parts.query.values().flatten() {
                    out.push(FieldOutput::new(name, value.as_str()));
                }
            }
            Field::Kv => {
                for (key, values) in &parts.query {
                    for value in values {
                        out.push(FieldOutput::new(name, format!("{}={}", key, value)));
                    }
                }
            }
            Field::File => {
                let base = parts.base_name();
                if parts.has_path() && base.contains('.') {
                    out.push(FieldOutput::new(name, base));
                }
            }
            Field::Dir => {
                if let Some(dir) = parts.directory() {
                    out.push(FieldOutput::new(name, dir));
                }
            }
            Field::Udir => {
                if let Some(dir) = parts.directory() {
                    out.push(FieldOutput::new(name, format!("{}{}", parts.root_url, dir)));
                }
            }
        }
    }
}

/// Derives the requested fields for a result
///
/// Rows come out in request order; multi-valued fields (query keys, values,
/// pairs and custom fields) keep the order of the underlying query or
/// custom-field mapping, so output is stable across runs. A result whose URL
/// does not parse yields no rows.
///
/// # Examples
///
/// ```
/// use sumi_recon::fields::{derive_fields, FieldRegistry};
/// use sumi_recon::output::CrawlResult;
///
/// let result = CrawlResult::new("https://a.example.com/dir1/dir2/file.txt?x=1&y=2");
/// let requested = FieldRegistry::default().parse("file,dir,kv").unwrap();
///
/// let values: Vec<String> = derive_fields(&result, &requested)
///     .into_iter()
///     .map(|row| row.value)
///     .collect();
/// assert_eq!(values, vec!["file.txt", "/dir1/dir2/", "x=1", "y=2"]);
/// ```
pub fn derive_fields(result: &CrawlResult, requested: &[RequestedField]) -> Vec<FieldOutput> {
    let mut out = Vec::new();
    let Some(parts) = UrlParts::parse(&result.url) else {
        return out;
    };

    for field in requested {
        match field {
            RequestedField::Builtin(builtin) => builtin.derive_into(&parts, &mut out),
            RequestedField::Custom(name) => {
                if let Some(values) = result.custom_fields.get(name) {
                    out.extend(values.iter().map(|v| FieldOutput::new(name, v.as_str())));
                }
            }
        }
    }
    out
}
