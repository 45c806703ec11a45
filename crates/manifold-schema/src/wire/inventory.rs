use super::lenient_string;
use serde::Deserialize;
use serde_json::Value;

///
/// SourceInventory
/// catalogue of legacy doctypes across source repos, fed to the matcher
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SourceInventory {
    pub repos: Vec<SourceRepo>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SourceRepo {
    #[serde(deserialize_with = "lenient_string")]
    pub repo_name: Option<String>,

    pub doctypes: Vec<SourceDoctypeRow>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SourceDoctypeRow {
    #[serde(deserialize_with = "lenient_string")]
    pub doctype_name: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub module_name: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub package_name: Option<String>,

    pub is_table: Value,

    #[serde(deserialize_with = "lenient_string")]
    pub json_file: Option<String>,
}
