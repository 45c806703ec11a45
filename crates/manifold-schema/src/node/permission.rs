use crate::prelude::*;

///
/// PermissionSeed
/// role plus the actions its doctype permission row grants
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PermissionSeed {
    pub role_id: String,
    pub actions: Vec<String>,
}
