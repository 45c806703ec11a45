use super::{lenient_list, lenient_string};
use serde::Deserialize;
use serde_json::Value;

///
/// DoctypeMeta
/// legacy doctype JSON (`<name>/<name>.json`)
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DoctypeMeta {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub module: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub autoname: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub default_view: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub sort_field: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub sort_order: Option<String>,

    pub is_public: Value,

    #[serde(deserialize_with = "lenient_list")]
    pub fields: Vec<Value>,

    #[serde(deserialize_with = "lenient_list")]
    pub permissions: Vec<Value>,
}
