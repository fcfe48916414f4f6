//! Link resolution: raw discovered path to followable absolute URL

use crate::url::{ExtensionFilter, ScopeError, ScopeMatcher};
use std::sync::Arc;
use url::Url;

/// Capability that accepts every URL and every path
///
/// Used when no scope or extension rules are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ScopeMatcher for AcceptAll {
    fn validate(&self, _url: &Url, _root_hostname: &str) -> Result<bool, ScopeError> {
        Ok(true)
    }
}

impl ExtensionFilter for AcceptAll {
    fn validate_path(&self, _path: &str) -> bool {
        true
    }
}

/// Turns paths found on a page into absolute, in-scope URLs
///
/// The resolver holds no mutable state and can be shared by every fetch
/// worker of a crawl.
#[derive(Clone)]
pub struct LinkResolver {
    scope: Arc<dyn ScopeMatcher>,
    extensions: Arc<dyn ExtensionFilter>,
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self {
            scope: Arc::new(AcceptAll),
            extensions: Arc::new(AcceptAll),
        }
    }
}

impl std::fmt::Debug for LinkResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkResolver").finish_non_exhaustive()
    }
}

impl LinkResolver {
    /// Creates a resolver that accepts everything that parses
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the scope matcher
    pub fn with_scope(mut self, scope: Arc<dyn ScopeMatcher>) -> Self {
        self.scope = scope;
        self
    }

    /// Replaces the extension filter
    pub fn with_extensions(mut self, extensions: Arc<dyn ExtensionFilter>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Resolves `candidate` against the page it was found on
    ///
    /// # Resolution Steps
    ///
    /// 1. Reject same-page fragments (`#...`)
    /// 2. Reject paths the extension filter refuses
    /// 3. Join against `base` (RFC 3986); reject on parse failure
    /// 4. Reject URLs the scope matcher refuses or errors on
    /// 5. Drop the fragment
    /// 6. Serialize
    ///
    /// Protocol-relative candidates (`//host/path`) take the scheme of `base`
    /// during the join. Nothing else is normalized.
    ///
    /// # Returns
    ///
    /// * `Some(String)` - The absolute URL to follow
    /// * `None` - The candidate is not a followable link, for any reason
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_recon::url::LinkResolver;
    /// use url::Url;
    ///
    /// let resolver = LinkResolver::new();
    /// let base = Url::parse("https://example.com/docs/").unwrap();
    ///
    /// assert_eq!(
    ///     resolver.resolve(&base, "example.com", "intro.html#setup"),
    ///     Some("https://example.com/docs/intro.html".to_string())
    /// );
    /// assert_eq!(resolver.resolve(&base, "example.com", "#top"), None);
    /// ```
    pub fn resolve(&self, base: &Url, root_hostname: &str, candidate: &str) -> Option<String> {
        if candidate.starts_with('#') {
            return None;
        }

        if !self.extensions.validate_path(candidate) {
            return None;
        }

        let mut absolute = base.join(candidate).ok()?;

        match self.scope.validate(&absolute, root_hostname) {
            Ok(true) => {}
            Ok(false) | Err(_) => return None,
        }

        absolute.set_fragment(None);
        Some(absolute.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtensionsConfig, ScopeConfig};
    use crate::url::{ExtensionValidator, ScopeManager};

    struct FailingScope;

    impl ScopeMatcher for FailingScope {
        fn validate(&self, url: &Url, _root_hostname: &str) -> Result<bool, ScopeError> {
            Err(ScopeError::MissingHost(url.to_string()))
        }
    }

    fn base() -> Url {
        Url::parse("https://example.com/dir/page.html").unwrap()
    }

    fn scoped_resolver() -> LinkResolver {
        let scope = ScopeManager::new(&ScopeConfig::default()).unwrap();
        LinkResolver::new()
            .with_scope(Arc::new(scope))
            .with_extensions(Arc::new(ExtensionValidator::new(&ExtensionsConfig::default())))
    }

    #[test]
    fn test_fragment_only_rejected() {
        let resolver = LinkResolver::new();
        for candidate in ["#", "#top", "#/route?x=1"] {
            assert_eq!(resolver.resolve(&base(), "example.com", candidate), None);
        }
    }

    #[test]
    fn test_relative_paths() {
        let resolver = LinkResolver::new();
        assert_eq!(
            resolver.resolve(&base(), "example.com", "other.html"),
            Some("https://example.com/dir/other.html".to_string())
        );
        assert_eq!(
            resolver.resolve(&base(), "example.com", "../up"),
            Some("https://example.com/up".to_string())
        );
        assert_eq!(
            resolver.resolve(&base(), "example.com", "/root?q=1"),
            Some("https://example.com/root?q=1".to_string())
        );
    }

    #[test]
    fn test_fragment_stripped() {
        let resolver = LinkResolver::new();
        let resolved = resolver
            .resolve(&base(), "example.com", "/a?x=1#section")
            .unwrap();
        assert_eq!(resolved, "https://example.com/a?x=1");
        assert!(Url::parse(&resolved).unwrap().fragment().is_none());
    }

    #[test]
    fn test_protocol_relative_inherits_scheme() {
        let resolver = LinkResolver::new();
        let resolved = resolver
            .resolve(&base(), "example.com", "//cdn.example.com/lib")
            .unwrap();
        assert_eq!(resolved, "https://cdn.example.com/lib");

        let http_base = Url::parse("http://example.com/").unwrap();
        let resolved = resolver
            .resolve(&http_base, "example.com", "//example.com/x")
            .unwrap();
        assert!(resolved.starts_with("http://"));
    }

    #[test]
    fn test_no_normalization_beyond_fragment() {
        let resolver = LinkResolver::new();
        assert_eq!(
            resolver.resolve(&base(), "example.com", "/Admin/"),
            Some("https://example.com/Admin/".to_string())
        );
    }

    #[test]
    fn test_out_of_scope_rejected() {
        let resolver = scoped_resolver();
        assert_eq!(
            resolver.resolve(&base(), "example.com", "https://other.com/page"),
            None
        );
        assert_eq!(
            resolver.resolve(&base(), "example.com", "//other.com/page"),
            None
        );
        assert!(resolver
            .resolve(&base(), "example.com", "/in-scope")
            .is_some());
    }

    #[test]
    fn test_disallowed_extension_rejected() {
        let resolver = scoped_resolver();
        assert_eq!(resolver.resolve(&base(), "example.com", "/logo.png"), None);
        assert!(resolver
            .resolve(&base(), "example.com", "/login.php")
            .is_some());
    }

    #[test]
    fn test_scope_error_rejects() {
        let resolver = LinkResolver::new().with_scope(Arc::new(FailingScope));
        assert_eq!(resolver.resolve(&base(), "example.com", "/page"), None);
    }

    #[test]
    fn test_hostless_schemes_rejected_by_scope() {
        let resolver = scoped_resolver();
        assert_eq!(
            resolver.resolve(&base(), "example.com", "mailto:admin@example.com"),
            None
        );
        assert_eq!(
            resolver.resolve(&base(), "example.com", "javascript:void(0)"),
            None
        );
    }

    #[test]
    fn test_unparseable_rejected() {
        let resolver = LinkResolver::new();
        assert_eq!(resolver.resolve(&base(), "example.com", "http://[::1"), None);
    }
}
