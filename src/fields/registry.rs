//! Field names and the registry that validates them

use crate::config::{CustomFieldConfig, ResponsePart};
use crate::fields::FieldError;
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;

/// Built-in fields derivable from any result URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The full URL
    Url,
    /// The percent-decoded URL path, empty when the URL has none
    Path,
    /// The hostname
    Fqdn,
    /// The registered domain (eTLD+1)
    Rdn,
    /// Scheme and host, with any port as written
    Rurl,
    /// The full URL, only when it has a query
    Qurl,
    /// Path plus canonical query
    Qpath,
    /// Last path segment, when it looks like a file
    File,
    /// Each query key
    Key,
    /// Each query value
    Value,
    /// Each `key=value` pair
    Kv,
    /// Directory part of the path
    Dir,
    /// Scheme, host and directory
    Udir,
}

impl Field {
    /// Every built-in field, in documentation order
    pub const ALL: [Field; 13] = [
        Field::Url,
        Field::Path,
        Field::Fqdn,
        Field::Rdn,
        Field::Rurl,
        Field::Qurl,
        Field::Qpath,
        Field::File,
        Field::Key,
        Field::Value,
        Field::Kv,
        Field::Dir,
        Field::Udir,
    ];

    /// Returns the name operators use for this field
    pub fn name(self) -> &'static str {
        match self {
            Field::Url => "url",
            Field::Path => "path",
            Field::Fqdn => "fqdn",
            Field::Rdn => "rdn",
            Field::Rurl => "rurl",
            Field::Qurl => "qurl",
            Field::Qpath => "qpath",
            Field::File => "file",
            Field::Key => "key",
            Field::Value => "value",
            Field::Kv => "kv",
            Field::Dir => "dir",
            Field::Udir => "udir",
        }
    }

    /// Looks up a built-in field by name
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated entry of an operator's field list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestedField {
    Builtin(Field),
    Custom(String),
}

impl RequestedField {
    pub fn name(&self) -> &str {
        match self {
            RequestedField::Builtin(field) => field.name(),
            RequestedField::Custom(name) => name,
        }
    }
}

/// A compiled custom field definition
#[derive(Debug, Clone)]
pub struct CustomFieldDefinition {
    pub name: String,
    pub part: ResponsePart,
    pub patterns: Vec<Regex>,
    pub group: usize,
}

impl CustomFieldDefinition {
    /// Compiles a definition from configuration
    pub fn compile(config: &CustomFieldConfig) -> Result<Self, FieldError> {
        let name = config.name.trim();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(FieldError::InvalidName(config.name.clone()));
        }
        if Field::from_name(name).is_some() {
            return Err(FieldError::ReservedName(name.to_string()));
        }
        if config.patterns.is_empty() {
            return Err(FieldError::NoPatterns(name.to_string()));
        }

        let patterns = config
            .patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| FieldError::InvalidPattern {
                    name: name.to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(pattern) = patterns.iter().find(|p| p.captures_len() <= config.group) {
            return Err(FieldError::InvalidPattern {
                name: name.to_string(),
                message: format!(
                    "pattern '{}' has no capture group {}",
                    pattern.as_str(),
                    config.group
                ),
            });
        }

        Ok(Self {
            name: name.to_string(),
            part: config.part,
            patterns,
            group: config.group,
        })
    }

    /// Returns every distinct match of the selected capture group, in order
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for pattern in &self.patterns {
            for captures in pattern.captures_iter(text) {
                if let Some(found) = captures.get(self.group) {
                    let found = found.as_str();
                    if !found.is_empty() && !values.iter().any(|v| v == found) {
                        values.push(found.to_string());
                    }
                }
            }
        }
        values
    }
}

/// Known field names: the built-in set plus configured custom fields
///
/// Built once from configuration and shared read-only by the crawl.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    custom: IndexMap<String, CustomFieldDefinition>,
}

impl FieldRegistry {
    /// Builds a registry from custom field configuration
    ///
    /// # Errors
    ///
    /// Fails on invalid, duplicate or reserved names and on bad patterns.
    pub fn new(custom_fields: &[CustomFieldConfig]) -> Result<Self, FieldError> {
        let mut custom = IndexMap::new();
        for config in custom_fields {
            let definition = CustomFieldDefinition::compile(config)?;
            if custom.contains_key(&definition.name) {
                return Err(FieldError::DuplicateName(definition.name));
            }
            custom.insert(definition.name.clone(), definition);
        }
        Ok(Self { custom })
    }

    /// Returns true when `name` is a built-in or custom field
    pub fn contains(&self, name: &str) -> bool {
        Field::from_name(name).is_some() || self.custom.contains_key(name)
    }

    /// Iterates over custom field definitions in configuration order
    pub fn custom_fields(&self) -> impl Iterator<Item = &CustomFieldDefinition> {
        self.custom.values()
    }

    /// Validates a comma-separated field list
    ///
    /// Surrounding whitespace and empty entries are ignored.
    ///
    /// # Errors
    ///
    /// * `FieldError::Empty` - The list names no fields
    /// * `FieldError::Unknown` - A name is neither built-in nor custom; the
    ///   error names the offending field and the full list
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_recon::fields::{Field, FieldRegistry, RequestedField};
    ///
    /// let registry = FieldRegistry::default();
    /// let fields = registry.parse("url, qpath").unwrap();
    /// assert_eq!(fields, vec![
    ///     RequestedField::Builtin(Field::Url),
    ///     RequestedField::Builtin(Field::Qpath),
    /// ]);
    /// assert!(registry.parse("url,nope").is_err());
    /// ```
    pub fn parse(&self, list: &str) -> Result<Vec<RequestedField>, FieldError> {
        let mut requested = Vec::new();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if let Some(field) = Field::from_name(name) {
                requested.push(RequestedField::Builtin(field));
            } else if self.custom.contains_key(name) {
                requested.push(RequestedField::Custom(name.to_string()));
            } else {
                return Err(FieldError::Unknown {
                    field: name.to_string(),
                    requested: list.to_string(),
                });
            }
        }

        if requested.is_empty() {
            return Err(FieldError::Empty(list.to_string()));
        }
        Ok(requested)
    }
}
