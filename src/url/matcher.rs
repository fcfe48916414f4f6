/// Checks whether a candidate host belongs to a crawl's root host
///
/// Without subdomains only the exact root host matches. With subdomains the
/// root host and any host below it match (`root` acts like `*.root`), but
/// lookalike hosts that merely end with the same characters do not.
///
/// Both arguments should already be lowercase.
///
/// # Examples
///
/// ```
/// use sumi_recon::url::matches_host;
///
/// assert!(matches_host("example.com", "example.com", false));
/// assert!(!matches_host("example.com", "api.example.com", false));
/// assert!(matches_host("example.com", "api.example.com", true));
/// assert!(!matches_host("example.com", "badexample.com", true));
/// ```
pub fn matches_host(root: &str, candidate: &str, include_subdomains: bool) -> bool {
    if root.is_empty() || candidate.is_empty() {
        return false;
    }
    if candidate == root {
        return true;
    }
    include_subdomains
        && candidate.len() > root.len()
        && candidate.ends_with(root)
        && candidate.as_bytes()[candidate.len() - root.len() - 1] == b'.'
}
