use url::{Host, Url};

/// Returns the bare hostname of a URL: no port, no IPv6 brackets
///
/// URLs without a host yield an empty string. Domain names come back
/// lowercase.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_recon::url::hostname;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(hostname(&url), "example.com");
/// ```
pub fn hostname(url: &Url) -> String {
    match url.host() {
        Some(Host::Domain(domain)) => domain.to_lowercase(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => String::new(),
    }
}

/// Reduces a hostname to its registered domain (effective TLD plus one label)
///
/// Uses the public suffix list, so multi-label suffixes such as `co.uk` are
/// handled. Returns `None` for bare suffixes, single-label hosts and IP
/// addresses, none of which have a registered domain.
///
/// # Examples
///
/// ```
/// use sumi_recon::url::registered_domain;
///
/// assert_eq!(registered_domain("a.example.com"), Some("example.com".to_string()));
/// assert_eq!(registered_domain("blog.example.co.uk"), Some("example.co.uk".to_string()));
/// assert_eq!(registered_domain("localhost"), None);
/// ```
pub fn registered_domain(host: &str) -> Option<String> {
    if host.parse::<std::net::IpAddr>().is_ok() {
        return None;
    }
    let host = host.trim_end_matches('.').to_lowercase();
    psl::domain_str(&host).map(str::to_string)
}
