use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{convert::Infallible, fmt, str::FromStr};

///
/// FieldType
///
/// The fixed field vocabulary shared by doctype JSON and doc schemas.
/// Unknown names are kept verbatim in `Other` so nothing is lost on a
/// round trip through the translator.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Attach,
    AttachImage,
    Autocomplete,
    Barcode,
    Button,
    Check,
    Code,
    Color,
    ColumnBreak,
    Currency,
    #[default]
    Data,
    Date,
    Datetime,
    Duration,
    DynamicLink,
    Float,
    Geolocation,
    Html,
    HtmlEditor,
    Icon,
    Image,
    Int,
    Json,
    Link,
    LongText,
    MarkdownEditor,
    Password,
    Percent,
    Phone,
    Rating,
    ReadOnly,
    SectionBreak,
    Select,
    Signature,
    SmallText,
    TabBreak,
    Table,
    TableMultiSelect,
    Text,
    TextEditor,
    Time,
    Other(String),
}

// canonical display names, in the order of the enum
const NAMED_TYPES: [(FieldType, &str); 41] = [
    (FieldType::Attach, "Attach"),
    (FieldType::AttachImage, "Attach Image"),
    (FieldType::Autocomplete, "Autocomplete"),
    (FieldType::Barcode, "Barcode"),
    (FieldType::Button, "Button"),
    (FieldType::Check, "Check"),
    (FieldType::Code, "Code"),
    (FieldType::Color, "Color"),
    (FieldType::ColumnBreak, "Column Break"),
    (FieldType::Currency, "Currency"),
    (FieldType::Data, "Data"),
    (FieldType::Date, "Date"),
    (FieldType::Datetime, "Datetime"),
    (FieldType::Duration, "Duration"),
    (FieldType::DynamicLink, "Dynamic Link"),
    (FieldType::Float, "Float"),
    (FieldType::Geolocation, "Geolocation"),
    (FieldType::Html, "HTML"),
    (FieldType::HtmlEditor, "HTML Editor"),
    (FieldType::Icon, "Icon"),
    (FieldType::Image, "Image"),
    (FieldType::Int, "Int"),
    (FieldType::Json, "JSON"),
    (FieldType::Link, "Link"),
    (FieldType::LongText, "Long Text"),
    (FieldType::MarkdownEditor, "Markdown Editor"),
    (FieldType::Password, "Password"),
    (FieldType::Percent, "Percent"),
    (FieldType::Phone, "Phone"),
    (FieldType::Rating, "Rating"),
    (FieldType::ReadOnly, "Read Only"),
    (FieldType::SectionBreak, "Section Break"),
    (FieldType::Select, "Select"),
    (FieldType::Signature, "Signature"),
    (FieldType::SmallText, "Small Text"),
    (FieldType::TabBreak, "Tab Break"),
    (FieldType::Table, "Table"),
    (FieldType::TableMultiSelect, "Table MultiSelect"),
    (FieldType::Text, "Text"),
    (FieldType::TextEditor, "Text Editor"),
    (FieldType::Time, "Time"),
];

impl FieldType {
    /// Canonical doctype spelling (`Long Text`, `Table MultiSelect`, ...).
    #[must_use]
    pub fn as_str(&self) -> &str {
        if let Self::Other(name) = self {
            return name;
        }

        NAMED_TYPES
            .iter()
            .find(|(ty, _)| ty == self)
            .map_or("Data", |(_, name)| name)
    }

    /// Layout-only types that carry no data.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::SectionBreak | Self::ColumnBreak | Self::TabBreak | Self::Html | Self::Button
        )
    }

    /// Types whose `options` name another entity.
    #[must_use]
    pub const fn is_relationship(&self) -> bool {
        matches!(
            self,
            Self::Link | Self::DynamicLink | Self::Table | Self::TableMultiSelect
        )
    }

    /// Relationship types that embed a child table.
    #[must_use]
    pub const fn is_child_table(&self) -> bool {
        matches!(self, Self::Table | Self::TableMultiSelect)
    }

    #[must_use]
    pub const fn is_select(&self) -> bool {
        matches!(self, Self::Select)
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int | Self::Float | Self::Currency | Self::Percent | Self::Rating | Self::Duration
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = Infallible;

    // exact doctype spelling first, then a loose match that ignores case
    // and separators so `long-text` and `long_text` also resolve
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some((ty, _)) = NAMED_TYPES.iter().find(|(_, name)| *name == trimmed) {
            return Ok(ty.clone());
        }

        let loose = squash(trimmed);
        if let Some((ty, _)) = NAMED_TYPES.iter().find(|(_, name)| squash(name) == loose) {
            return Ok(ty.clone());
        }

        Ok(Self::Other(trimmed.to_string()))
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(ty) => ty,
            Err(never) => match never {},
        }
    }
}

impl From<FieldType> for String {
    fn from(ty: FieldType) -> Self {
        ty.as_str().to_string()
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

///
/// FieldOptions
///
/// Either an enumerated value set (selects) or an opaque payload kept
/// verbatim when its meaning depends on the consuming field type.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldOptions {
    Values { values: Vec<String> },
    Raw { raw: Value },
}

impl FieldOptions {
    #[must_use]
    pub fn values(&self) -> Option<&[String]> {
        match self {
            Self::Values { values } => Some(values),
            Self::Raw { .. } => None,
        }
    }
}

///
/// FollowUp
///
/// Marker left on a translated field when a best-effort default was used.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum FollowUp {
    #[display("label_derived")]
    LabelDerived,
    #[display("missing_linked_entity")]
    MissingLinkedEntity,
    #[display("missing_select_values")]
    MissingSelectValues,
    #[display("type_defaulted")]
    TypeDefaulted,
}

///
/// NamingStrategy
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[remain::sorted]
pub enum NamingStrategy {
    #[display("custom")]
    Custom,
    #[display("hash")]
    Hash,
    #[display("series")]
    Series,
    #[display("uuid")]
    Uuid,
}

///
/// NamingRule
///
/// How the consuming application generates identifiers for new records.
/// Wire form is `{"strategy": ..., "pattern": ...}`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "NamingRuleRecord", into = "NamingRuleRecord")]
pub enum NamingRule {
    Series { pattern: Option<String> },
    Uuid,
    Hash,
    Custom { pattern: String },
}

impl NamingRule {
    /// Parse a doctype `autoname` value.
    ///
    /// `naming_series:<pattern>` selects a series, `hash` (any case) and
    /// `UUID` select generated ids, anything else is a custom pattern.
    #[must_use]
    pub fn from_autoname(autoname: Option<&str>) -> Self {
        let Some(autoname) = autoname.filter(|s| !s.trim().is_empty()) else {
            return Self::default();
        };

        if let Some(pattern) = autoname.strip_prefix("naming_series:") {
            return Self::Series {
                pattern: (!pattern.is_empty()).then(|| pattern.to_string()),
            };
        }
        if autoname.eq_ignore_ascii_case("hash") {
            return Self::Hash;
        }
        if autoname == "UUID" {
            return Self::Uuid;
        }

        Self::Custom {
            pattern: autoname.to_string(),
        }
    }

    /// Render back into a doctype `autoname` value.
    ///
    /// A series without a pattern has no canonical autoname and yields `None`.
    #[must_use]
    pub fn to_autoname(&self) -> Option<String> {
        match self {
            Self::Series { pattern: Some(p) } => Some(format!("naming_series:{p}")),
            Self::Series { pattern: None } => None,
            Self::Uuid => Some("UUID".to_string()),
            Self::Hash => Some("hash".to_string()),
            Self::Custom { pattern } => Some(pattern.clone()),
        }
    }

    #[must_use]
    pub const fn strategy(&self) -> NamingStrategy {
        match self {
            Self::Series { .. } => NamingStrategy::Series,
            Self::Uuid => NamingStrategy::Uuid,
            Self::Hash => NamingStrategy::Hash,
            Self::Custom { .. } => NamingStrategy::Custom,
        }
    }

    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::Series { pattern } => pattern.as_deref(),
            Self::Custom { pattern } => Some(pattern),
            Self::Uuid | Self::Hash => None,
        }
    }
}

impl Default for NamingRule {
    fn default() -> Self {
        Self::Series { pattern: None }
    }
}

///
/// NamingRuleRecord
/// wire shape of a naming rule
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NamingRuleRecord {
    #[serde(default)]
    pub strategy: Option<NamingStrategy>,
    #[serde(default)]
    pub pattern: Option<String>,
}

impl TryFrom<NamingRuleRecord> for NamingRule {
    type Error = String;

    fn try_from(record: NamingRuleRecord) -> Result<Self, Self::Error> {
        let pattern = record.pattern.filter(|p| !p.is_empty());

        match record.strategy.unwrap_or(NamingStrategy::Series) {
            NamingStrategy::Series => Ok(Self::Series { pattern }),
            NamingStrategy::Uuid => Ok(Self::Uuid),
            NamingStrategy::Hash => Ok(Self::Hash),
            NamingStrategy::Custom => pattern
                .map(|pattern| Self::Custom { pattern })
                .ok_or_else(|| "custom naming rule requires a pattern".to_string()),
        }
    }
}

impl From<NamingRule> for NamingRuleRecord {
    fn from(rule: NamingRule) -> Self {
        Self {
            strategy: Some(rule.strategy()),
            pattern: rule.pattern().map(ToString::to_string),
        }
    }
}

///
/// EntityOrigin
/// which on-disk layout an entity was discovered in
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum EntityOrigin {
    #[display("doctype")]
    Doctype,
    #[display("legacy_doc")]
    LegacyDoc,
    #[display("submodule_doc")]
    SubmoduleDoc,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_type_round_trips_doctype_spelling() {
        for (ty, name) in &NAMED_TYPES {
            assert_eq!(ty.as_str(), *name);
            assert_eq!(name.parse::<FieldType>().unwrap(), ty.clone());
        }
    }

    #[test]
    fn field_type_accepts_loose_spellings() {
        assert_eq!("long-text".parse::<FieldType>().unwrap(), FieldType::LongText);
        assert_eq!("datetime".parse::<FieldType>().unwrap(), FieldType::Datetime);
        assert_eq!(
            "Geo Point".parse::<FieldType>().unwrap(),
            FieldType::Other("Geo Point".to_string())
        );
    }

    #[test]
    fn structural_types_are_not_relationships() {
        assert!(FieldType::SectionBreak.is_structural());
        assert!(!FieldType::SectionBreak.is_relationship());
        assert!(FieldType::TableMultiSelect.is_child_table());
        assert!(FieldType::DynamicLink.is_relationship());
    }

    #[test]
    fn options_serialize_as_tagged_maps() {
        let values = FieldOptions::Values {
            values: vec!["Open".into(), "Closed".into()],
        };
        assert_eq!(
            serde_json::to_value(&values).unwrap(),
            json!({"values": ["Open", "Closed"]})
        );

        let raw: FieldOptions = serde_json::from_value(json!({"raw": "fa-icon"})).unwrap();
        assert_eq!(raw, FieldOptions::Raw { raw: json!("fa-icon") });
    }

    #[test]
    fn naming_rule_from_autoname() {
        assert_eq!(
            NamingRule::from_autoname(Some("naming_series:INV-.####")),
            NamingRule::Series {
                pattern: Some("INV-.####".to_string())
            }
        );
        assert_eq!(
            NamingRule::from_autoname(Some("naming_series:")),
            NamingRule::Series { pattern: None }
        );
        assert_eq!(NamingRule::from_autoname(Some("Hash")), NamingRule::Hash);
        assert_eq!(NamingRule::from_autoname(Some("UUID")), NamingRule::Uuid);
        assert_eq!(
            NamingRule::from_autoname(Some("field:title")),
            NamingRule::Custom {
                pattern: "field:title".to_string()
            }
        );
        assert_eq!(NamingRule::from_autoname(None), NamingRule::default());
    }

    #[test]
    fn naming_rule_wire_shape() {
        let rule = NamingRule::Uuid;
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({"strategy": "uuid", "pattern": null})
        );

        let empty: NamingRule = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, NamingRule::default());

        assert!(serde_json::from_value::<NamingRule>(json!({"strategy": "custom"})).is_err());
    }

    #[test]
    fn autoname_round_trip() {
        let rule = NamingRule::from_autoname(Some("naming_series:TKT-.#####"));
        assert_eq!(rule.to_autoname().as_deref(), Some("naming_series:TKT-.#####"));
        assert_eq!(NamingRule::Series { pattern: None }.to_autoname(), None);
    }
}
