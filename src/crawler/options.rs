//! Immutable per-crawl options shared by every fetch worker

use crate::config::{Config, CrawlerConfig};
use crate::fields::FieldRegistry;
use crate::url::{ExtensionValidator, LinkResolver, ScopeManager};
use crate::ConfigError;
use std::sync::Arc;

/// Everything a crawl needs that does not change while it runs
#[derive(Debug, Clone)]
pub struct CrawlerOptions {
    /// Fetch limits and HTTP settings
    pub crawler: CrawlerConfig,

    /// Link resolver with the configured scope and extension rules
    pub resolver: LinkResolver,

    /// Known fields, including custom field definitions
    pub registry: FieldRegistry,
}

impl CrawlerOptions {
    /// Builds crawl options from validated configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let scope = ScopeManager::new(&config.scope)?;
        let extensions = ExtensionValidator::new(&config.extensions);
        let resolver = LinkResolver::new()
            .with_scope(Arc::new(scope))
            .with_extensions(Arc::new(extensions));

        Ok(Self {
            crawler: config.crawler.clone(),
            resolver,
            registry: FieldRegistry::new(&config.custom_fields)?,
        })
    }
}
