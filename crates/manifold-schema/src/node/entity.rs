use crate::prelude::*;
use std::path::PathBuf;

///
/// EntityDescriptor
///
/// One logical document type, resolved from either on-disk vocabulary.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityDescriptor {
    pub entity_key: String,
    pub title: String,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub classification: Classification,
    pub is_public: bool,
    pub schema: EntitySchema,
    pub actions: Vec<String>,
    pub permissions: Vec<PermissionSeed>,
    pub origin: EntityOrigin,
    pub source_path: PathBuf,
}

impl EntityDescriptor {
    /// Title used for generated names, falling back to the key.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.entity_key
        } else {
            &self.title
        }
    }

    #[must_use]
    pub fn field(&self, field_id: &str) -> Option<&FieldDescriptor> {
        self.schema.fields.iter().find(|f| f.field_id == field_id)
    }
}

///
/// Classification
/// bundle → app → module → submodule placement tags
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Classification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submodule_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_role: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

///
/// EntitySchema
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EntitySchema {
    pub schema_version: Option<Value>,
    pub source: Option<Value>,
    pub fields: Vec<FieldDescriptor>,
    pub child_tables: Vec<ChildTable>,
    pub validation_rules: Vec<Value>,
    pub naming_rule: NamingRule,
}
