use crate::{ArtifactBuilder, RouteEntry};
use manifold_schema::prelude::*;
use manifold_utils::hash::fingerprint;

///
/// BridgeManifest
///
/// Machine-readable summary of what was generated for an entity, written
/// next to the views so downstream tooling can detect schema drift without
/// re-reading the doc folder.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BridgeManifest {
    pub entity_key: String,
    pub title: String,
    pub app_id: String,
    pub module_id: String,
    pub origin: EntityOrigin,
    pub is_public: bool,
    pub routes: Vec<RouteEntry>,
    pub fields: Vec<ManifestField>,
    pub child_tables: Vec<String>,
    pub naming_rule: NamingRule,
    pub schema_fingerprint: String,
}

impl BridgeManifest {
    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        crate::render::json_text(self)
    }
}

///
/// ManifestField
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ManifestField {
    pub field_id: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    pub required: bool,

    #[serde(rename = "linked_doc", skip_serializing_if = "Option::is_none")]
    pub linked_entity: Option<String>,
}

// generate
#[must_use]
pub fn generate(builder: &ArtifactBuilder, routes: &[RouteEntry]) -> BridgeManifest {
    let entity = builder.entity;

    let fields: Vec<ManifestField> = entity
        .schema
        .fields
        .iter()
        .map(|f| ManifestField {
            field_id: f.field_id.clone(),
            field_type: f.field_type.clone(),
            required: f.required,
            linked_entity: f.linked_entity.clone(),
        })
        .collect();

    let child_tables = entity
        .schema
        .child_tables
        .iter()
        .map(|t| t.table_id.clone())
        .collect();

    BridgeManifest {
        entity_key: entity.entity_key.clone(),
        title: entity.display_name().to_string(),
        app_id: builder.app_id.to_string(),
        module_id: builder.module_id.to_string(),
        origin: entity.origin,
        is_public: entity.is_public,
        routes: routes.to_vec(),
        schema_fingerprint: schema_fingerprint(&fields),
        fields,
        child_tables,
        naming_rule: entity.schema.naming_rule.clone(),
    }
}

// one line per field in declaration order
fn schema_fingerprint(fields: &[ManifestField]) -> String {
    let mut canonical = String::new();
    for field in fields {
        canonical.push_str(&field.field_id);
        canonical.push(':');
        canonical.push_str(field.field_type.as_str());
        canonical.push(':');
        canonical.push_str(if field.required { "1" } else { "0" });
        canonical.push(':');
        canonical.push_str(field.linked_entity.as_deref().unwrap_or_default());
        canonical.push('\n');
    }

    fingerprint(canonical.as_bytes())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::entity;

    #[test]
    fn fingerprint_tracks_field_changes() {
        let before = entity("invoice", "Invoice", false);
        let mut after = before.clone();
        after.schema.fields[1].required = true;

        let a = ArtifactBuilder::new(&before, "billing", "accounts").generate();
        let b = ArtifactBuilder::new(&after, "billing", "accounts").generate();

        assert_ne!(a.manifest.schema_fingerprint, b.manifest.schema_fingerprint);
        assert_eq!(a.manifest.schema_fingerprint.len(), 16);
    }

    #[test]
    fn manifest_json_uses_doc_vocabulary() {
        let invoice = entity("invoice", "Invoice", false);
        let text = ArtifactBuilder::new(&invoice, "billing", "accounts")
            .generate()
            .manifest
            .to_json()
            .unwrap();

        assert!(text.contains("\"linked_doc\": \"Customer\""));
        assert!(text.contains("\"type\": \"Currency\""));
        assert!(text.ends_with("}\n"));
    }
}
