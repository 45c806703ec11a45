use crate::prelude::*;

///
/// ChildTable
///
/// Repeatable group of fields owned by exactly one entity.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ChildTable {
    pub table_id: String,

    #[serde(default = "default_row_kind")]
    pub row_doc_kind: String,

    #[serde(rename = "linked_doc", alias = "linked_entity", default)]
    pub linked_entity: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl ChildTable {
    #[must_use]
    pub fn new(table_id: &str, linked_entity: Option<String>) -> Self {
        Self {
            table_id: table_id.to_string(),
            row_doc_kind: default_row_kind(),
            linked_entity,
            fields: Vec::new(),
        }
    }
}

fn default_row_kind() -> String {
    "child".to_string()
}
