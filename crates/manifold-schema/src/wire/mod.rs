//! Read-side shapes of the on-disk JSON files.
//!
//! Every key is optional, and list fields read `null` or a non-list value as
//! empty.  Writers operate on raw JSON maps so untouched keys keep their
//! authored order across a rewrite.

mod doc;
mod doctype;
mod inventory;
mod vocab;

pub use doc::{ActionsDoc, DocMeta, SchemaDoc};
pub use doctype::DoctypeMeta;
pub use inventory::{SourceDoctypeRow, SourceInventory, SourceRepo};
pub use vocab::{ActionModel, ActionModelEntry, ActionVocabulary};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// lenient_list
// a JSON array as-is, anything else as empty
pub(crate) fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

// lenient_string
// strings pass through, numbers are stringified, everything else is absent
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Ok(None),
    }
}
