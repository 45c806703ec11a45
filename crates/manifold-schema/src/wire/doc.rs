use super::{lenient_list, lenient_string};
use crate::node::Classification;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

///
/// DocMeta
/// `doc.json` of a doc triplet
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DocMeta {
    #[serde(deserialize_with = "lenient_string")]
    pub doc_key: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub doc_title: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub doc_code: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub doc_kind: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,

    #[serde(deserialize_with = "lenient_classification")]
    pub classification: Classification,

    pub is_public: Value,
}

///
/// SchemaDoc
/// `schema.json` of a doc triplet
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SchemaDoc {
    #[serde(deserialize_with = "lenient_string")]
    pub doc_key: Option<String>,

    pub schema_version: Option<Value>,
    pub source: Option<Value>,

    #[serde(deserialize_with = "lenient_list")]
    pub fields: Vec<Value>,

    #[serde(deserialize_with = "lenient_list")]
    pub child_tables: Vec<Value>,

    #[serde(deserialize_with = "lenient_list")]
    pub validation_rules: Vec<Value>,

    pub naming_rule: Option<Value>,
}

///
/// ActionsDoc
/// `actions.json` of a doc triplet
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionsDoc {
    #[serde(deserialize_with = "lenient_list")]
    pub actions: Vec<Value>,
}

impl ActionsDoc {
    /// String action ids in declaration order; other entries are ignored.
    #[must_use]
    pub fn action_ids(&self) -> Vec<String> {
        self.actions
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect()
    }
}

// a null or malformed classification block reads as empty
fn lenient_classification<'de, D>(deserializer: D) -> Result<Classification, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    Ok(serde_json::from_value(value).unwrap_or_default())
}

///
/// TESTS
///
