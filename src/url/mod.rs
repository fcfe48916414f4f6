//! URL handling module for Sumi-Recon
//!
//! This module turns raw paths discovered on a page into scope-checked absolute
//! URLs, and provides the host helpers used by field derivation and the crawl
//! frontier.

mod domain;
mod extensions;
mod matcher;
mod normalize;
mod resolve;
mod scope;

// Re-export main functions
pub use domain::{hostname, registered_domain};
pub use extensions::{ExtensionFilter, ExtensionValidator, DEFAULT_DENY_LIST};
pub use matcher::matches_host;
pub use normalize::{dedup_key, normalize_url};
pub use resolve::{AcceptAll, LinkResolver};
pub use scope::{ScopeError, ScopeManager, ScopeMatcher};
