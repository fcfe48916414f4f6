//! Output fields for crawl results
//!
//! This module handles:
//! - The closed set of built-in fields and operator-defined custom fields
//! - Validating requested field lists once, at configuration time
//! - Deriving field values from a result URL
//! - Extracting custom field values from responses
//! - Persisting field values into per-host files

mod custom;
mod derive;
mod registry;
mod store;

pub use custom::extract_custom_fields;
pub use derive::{derive_fields, FieldOutput};
pub use registry::{CustomFieldDefinition, Field, FieldRegistry, RequestedField};
pub use store::FieldStore;

use thiserror::Error;

/// Errors raised while configuring fields
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("no field names provided: {0}")]
    Empty(String),

    #[error("invalid field {field} specified: {requested}")]
    Unknown { field: String, requested: String },

    #[error("invalid custom field name '{0}': use letters, digits, '-' or '_'")]
    InvalidName(String),

    #[error("custom field {0} shadows a built-in field")]
    ReservedName(String),

    #[error("custom field {0} is defined more than once")]
    DuplicateName(String),

    #[error("custom field {0} has no patterns")]
    NoPatterns(String),

    #[error("invalid pattern for custom field {name}: {message}")]
    InvalidPattern { name: String, message: String },
}
