//! Crawl scope rules
//!
//! A link is in scope when its host is the crawl's root host (or a subdomain
//! of it, when enabled) and it passes the configured URL patterns.

use crate::config::ScopeConfig;
use crate::url::{hostname, matches_host};
use crate::ConfigError;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// Errors raised while checking a URL against the scope
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Decides whether an absolute URL may be followed from a crawl root
///
/// Implementations are configured once per crawl and then only read, so they
/// must be shareable across fetch workers.
pub trait ScopeMatcher: Send + Sync {
    /// Returns `Ok(true)` when `url` is in scope for a crawl rooted at
    /// `root_hostname`. Both `Ok(false)` and `Err(_)` reject the link.
    fn validate(&self, url: &Url, root_hostname: &str) -> Result<bool, ScopeError>;
}

/// Scope matcher built from the configured scope rules
#[derive(Debug, Clone, Default)]
pub struct ScopeManager {
    in_scope: Vec<Regex>,
    out_of_scope: Vec<Regex>,
    include_subdomains: bool,
}

impl ScopeManager {
    /// Compiles the scope rules
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` naming the first pattern that is
    /// not a valid regular expression.
    pub fn new(config: &ScopeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            in_scope: compile_patterns(&config.in_scope)?,
            out_of_scope: compile_patterns(&config.out_of_scope)?,
            include_subdomains: config.include_subdomains,
        })
    }

    /// Returns true when subdomains of the root host are followed
    pub fn includes_subdomains(&self) -> bool {
        self.include_subdomains
    }
}

impl ScopeMatcher for ScopeManager {
    fn validate(&self, url: &Url, root_hostname: &str) -> Result<bool, ScopeError> {
        let host = hostname(url);
        if host.is_empty() {
            return Err(ScopeError::MissingHost(url.to_string()));
        }

        let root = root_hostname.to_lowercase();
        if !matches_host(&root, &host, self.include_subdomains) {
            return Ok(false);
        }

        let candidate = url.as_str();
        if self.out_of_scope.iter().any(|p| p.is_match(candidate)) {
            return Ok(false);
        }

        if !self.in_scope.is_empty() && !self.in_scope.iter().any(|p| p.is_match(candidate)) {
            return Ok(false);
        }

        Ok(true)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(in_scope: &[&str], out_of_scope: &[&str], include_subdomains: bool) -> ScopeManager {
        ScopeManager::new(&ScopeConfig {
            in_scope: in_scope.iter().map(|s| s.to_string()).collect(),
            out_of_scope: out_of_scope.iter().map(|s| s.to_string()).collect(),
            include_subdomains,
        })
        .unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_host_in_scope() {
        let scope = manager(&[], &[], false);
        assert!(scope
            .validate(&url("https://example.com/a"), "example.com")
            .unwrap());
    }

    #[test]
    fn test_other_host_out_of_scope() {
        let scope = manager(&[], &[], false);
        assert!(!scope
            .validate(&url("https://other.com/a"), "example.com")
            .unwrap());
    }

    #[test]
    fn test_subdomains_follow_flag() {
        let strict = manager(&[], &[], false);
        let relaxed = manager(&[], &[], true);
        let target = url("https://api.example.com/v1");

        assert!(!strict.validate(&target, "example.com").unwrap());
        assert!(relaxed.validate(&target, "example.com").unwrap());
        assert!(relaxed.includes_subdomains());
    }

    #[test]
    fn test_root_hostname_case_insensitive() {
        let scope = manager(&[], &[], false);
        assert!(scope
            .validate(&url("https://example.com/"), "Example.COM")
            .unwrap());
    }

    #[test]
    fn test_out_of_scope_pattern_wins() {
        let scope = manager(&[], &["/logout"], false);
        assert!(!scope
            .validate(&url("https://example.com/logout?next=/"), "example.com")
            .unwrap());
        assert!(scope
            .validate(&url("https://example.com/login"), "example.com")
            .unwrap());
    }

    #[test]
    fn test_in_scope_patterns_restrict() {
        let scope = manager(&["/api/"], &[], false);
        assert!(scope
            .validate(&url("https://example.com/api/users"), "example.com")
            .unwrap());
        assert!(!scope
            .validate(&url("https://example.com/blog"), "example.com")
            .unwrap());
    }

    #[test]
    fn test_hostless_url_is_error() {
        let scope = manager(&[], &[], false);
        let result = scope.validate(&url("mailto:admin@example.com"), "example.com");
        assert!(matches!(result, Err(ScopeError::MissingHost(_))));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = ScopeManager::new(&ScopeConfig {
            in_scope: vec!["(unclosed".to_string()],
            out_of_scope: vec![],
            include_subdomains: false,
        });
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }
}
