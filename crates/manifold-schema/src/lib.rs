pub mod error;
pub mod node;
pub mod types;
pub mod validate;
pub mod wire;

/// Maximum length for entity keys (they become folder and module names).
pub const MAX_ENTITY_KEY_LEN: usize = 96;

/// Maximum length for field identifiers.
pub const MAX_FIELD_ID_LEN: usize = 64;

/// Permission flags carried over from doctype permission rows, in seed order.
pub const PERMISSION_ACTIONS: [&str; 7] = [
    "read", "write", "create", "delete", "submit", "cancel", "amend",
];

use crate::error::ErrorTree;
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::ErrorTree,
        node::*,
        types::{EntityOrigin, FieldOptions, FieldType, FollowUp, NamingRule, NamingStrategy},
    };
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Map, Value};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(ErrorTree),

    #[error("invalid naming rule: {0}")]
    NamingRule(String),
}
