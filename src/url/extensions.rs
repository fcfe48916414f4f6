//! File extension filtering for discovered paths

use crate::config::ExtensionsConfig;
use std::collections::HashSet;

/// Extensions that are never worth crawling unless explicitly allowed
pub const DEFAULT_DENY_LIST: &[&str] = &[
    "3g2", "3gp", "7z", "apk", "arj", "avi", "axd", "bmp", "css", "csv", "deb", "dll", "doc",
    "drv", "eot", "exe", "flv", "gif", "gifv", "gz", "h264", "ico", "iso", "jar", "jpeg", "jpg",
    "lock", "m4a", "m4v", "map", "mkv", "mov", "mp3", "mp4", "mpeg", "mpg", "msi", "ogg", "ogm",
    "ogv", "otf", "pdf", "pkg", "png", "ppt", "psd", "rar", "rm", "rpm", "svg", "swf", "sys",
    "tar", "tif", "tiff", "ttf", "txt", "vob", "wav", "webm", "webp", "wmv", "woff", "woff2",
    "xcf", "xls", "xlsx", "zip",
];

/// Decides whether a discovered path has a crawlable file extension
pub trait ExtensionFilter: Send + Sync {
    /// Returns false when the path must not be followed
    fn validate_path(&self, path: &str) -> bool;
}

/// Allow/deny list extension filter
///
/// * A non-empty match list only lets those extensions through. A `*` entry
///   anywhere in it means all extensions, same as an empty list.
/// * Without an exclusive match list the deny list applies: defaults, minus
///   the allow list, plus any extra denied extensions.
/// * Paths without an extension are always accepted.
#[derive(Debug, Clone)]
pub struct ExtensionValidator {
    matched: HashSet<String>,
    denied: HashSet<String>,
}

impl ExtensionValidator {
    /// Builds the validator from the extension configuration
    pub fn new(config: &ExtensionsConfig) -> Self {
        let mut matched: HashSet<String> = config
            .matched
            .iter()
            .map(|e| clean_extension(e))
            .filter(|e| !e.is_empty())
            .collect();
        if matched.contains("*") {
            matched.clear();
        }

        let allowed: HashSet<String> = config.allow_list.iter().map(|e| clean_extension(e)).collect();

        let denied = DEFAULT_DENY_LIST
            .iter()
            .map(|e| e.to_string())
            .filter(|e| !allowed.contains(e))
            .chain(config.deny_list.iter().map(|e| clean_extension(e)))
            .filter(|e| !e.is_empty())
            .collect();

        Self { matched, denied }
    }
}

impl Default for ExtensionValidator {
    fn default() -> Self {
        Self::new(&ExtensionsConfig::default())
    }
}

impl ExtensionFilter for ExtensionValidator {
    fn validate_path(&self, path: &str) -> bool {
        let Some(extension) = path_extension(path) else {
            return true;
        };

        if !self.matched.is_empty() {
            return self.matched.contains(&extension);
        }

        !self.denied.contains(&extension)
    }
}

/// Lowercases an extension and strips a leading dot
fn clean_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

/// Extracts the lowercase extension of the last path segment
///
/// Query strings, fragments and the authority of absolute or
/// protocol-relative URLs are ignored, so `https://example.com` has no
/// extension while `/static/app.JS?v=2` has `js`.
fn path_extension(path: &str) -> Option<String> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let mut path = &path[..end];

    let authority_start = if let Some(idx) = path.find("://") {
        Some(idx + 3)
    } else if path.starts_with("//") {
        Some(2)
    } else {
        None
    };
    if let Some(start) = authority_start {
        path = path[start..].find('/').map_or("", |idx| &path[start + idx..]);
    }

    let segment = path.rsplit('/').next().unwrap_or("");
    let (_, extension) = segment.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    Some(extension.to_lowercase())
}
