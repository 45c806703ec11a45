use super::lenient_string;
use serde::Deserialize;
use std::collections::BTreeSet;

///
/// ActionModel
/// shared action model file listing every allowed action id
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionModel {
    pub actions: Vec<ActionModelEntry>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionModelEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub action_id: Option<String>,
}

///
/// ActionVocabulary
/// closed set of allowed action ids
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActionVocabulary(BTreeSet<String>);

impl ActionVocabulary {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn contains(&self, action_id: &str) -> bool {
        self.0.contains(action_id)
    }

    /// Action ids outside the vocabulary, in input order.
    #[must_use]
    pub fn invalid<'a>(&self, action_ids: &'a [String]) -> Vec<&'a str> {
        action_ids
            .iter()
            .filter(|id| !self.contains(id))
            .map(String::as_str)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ActionModel> for ActionVocabulary {
    fn from(model: ActionModel) -> Self {
        Self::new(model.actions.into_iter().filter_map(|entry| entry.action_id))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vocabulary_flags_unknown_actions() {
        let model: ActionModel = serde_json::from_value(json!({
            "actions": [{"action_id": "create"}, {"action_id": "submit"}, {"label": "x"}]
        }))
        .unwrap();
        let vocab = ActionVocabulary::from(model);

        assert_eq!(vocab.len(), 2);
        let ids = vec!["create".to_string(), "teleport".to_string()];
        assert_eq!(vocab.invalid(&ids), vec!["teleport"]);
    }
}
