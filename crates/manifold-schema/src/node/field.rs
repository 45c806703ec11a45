use crate::prelude::*;

///
/// FieldDescriptor
///
/// One attribute of an entity in the neutral (doc) vocabulary.
/// `linked_entity` is a name-based reference and may dangle.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub field_id: String,
    pub label: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub options: Option<FieldOptions>,

    #[serde(default)]
    pub default: Option<Value>,

    #[serde(rename = "linked_doc", alias = "linked_entity", default)]
    pub linked_entity: Option<String>,

    #[serde(default)]
    pub indexed: bool,

    #[serde(default)]
    pub ui: FieldUi,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub source: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up: Vec<FollowUp>,
}

impl FieldDescriptor {
    /// A plain field with default flags, used by native seed templates.
    #[must_use]
    pub fn new(field_id: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            field_id: field_id.to_string(),
            label: label.to_string(),
            field_type,
            required: false,
            read_only: false,
            options: None,
            default: None,
            linked_entity: None,
            indexed: false,
            ui: FieldUi::default(),
            source: Map::new(),
            follow_up: Vec::new(),
        }
    }

    #[must_use]
    pub fn select_values(&self) -> Option<&[String]> {
        self.options.as_ref().and_then(FieldOptions::values)
    }

    pub fn mark(&mut self, follow_up: FollowUp) {
        if !self.follow_up.contains(&follow_up) {
            self.follow_up.push(follow_up);
        }
    }
}

///
/// FieldUi
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct FieldUi {
    pub visible: bool,
    pub list_visible: bool,
    pub filterable: bool,
    pub sortable: bool,
}

impl Default for FieldUi {
    fn default() -> Self {
        Self {
            visible: true,
            list_visible: false,
            filterable: false,
            sortable: true,
        }
    }
}
