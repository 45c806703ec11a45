//! Doc runtime artifacts: the runtime JSON and the Python/JS hook scaffolds
//! written next to each doc triplet.

use crate::{
    render::json_text,
    view::{PyClass, PyExpr, PyMethod, PyModule},
};
use serde::Serialize;
use serde_json::Value;

/// Generator tag recorded in every runtime JSON.
pub const GENERATOR: &str = "plug runtime";

/// Files a runtime JSON is derived from, in read order.
pub const GENERATED_FROM: [&str; 3] = ["doc.json", "schema.json", "actions.json"];

///
/// RuntimeDoc
///
/// Field order here is the on-disk key order.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuntimeDoc {
    pub doc_key: Option<String>,
    pub doc_title: Option<String>,
    pub doc_kind: Option<String>,
    pub status: Option<String>,
    pub classification: Value,
    pub allowed_actions: Vec<Value>,
    pub schema: RuntimeSchema,
    pub interop: RuntimeInterop,
    pub runtime: RuntimeBlock,
}

impl RuntimeDoc {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        json_text(self)
    }
}

///
/// RuntimeSchema
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RuntimeSchema {
    pub schema_version: Option<Value>,
    pub source: Option<Value>,
    pub fields: Vec<Value>,
    pub child_tables: Vec<Value>,
    pub validation_rules: Vec<Value>,
    pub naming_rule: Value,
}

///
/// RuntimeInterop
/// provenance of anything borrowed from a legacy doctype
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RuntimeInterop {
    pub doctype_json_source: DoctypeSource,
    pub borrowed_doctype_meta: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DoctypeSource {
    pub mapped: bool,
    pub path: Option<String>,
    pub name: Option<String>,
    pub module: Option<String>,
}

///
/// RuntimeBlock
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuntimeBlock {
    pub source_of_truth: String,
    pub generated_from: Vec<String>,
    pub generator: String,
    pub todo: Vec<String>,
}

impl Default for RuntimeBlock {
    fn default() -> Self {
        Self {
            source_of_truth: "doc_folder".to_string(),
            generated_from: GENERATED_FROM.iter().map(ToString::to_string).collect(),
            generator: GENERATOR.to_string(),
            todo: vec![
                "Populate schema.fields and child_tables from the mapping translation \
                 before seeding"
                    .to_string(),
                "Replace scaffold action sets with doc-specific action subsets where applicable"
                    .to_string(),
            ],
        }
    }
}

// hooks_py
// `<doc_key>.py`: a DocRuntime class with one stub per allowed action
#[must_use]
pub fn hooks_py(doc_key: &str, action_ids: &[String]) -> PyModule {
    let mut class = PyClass::new("DocRuntime", &[])
        .attr("doc_key", PyExpr::Str(doc_key.to_string()))
        .method(PyMethod {
            name: "validate".to_string(),
            params: vec!["self".to_string(), "payload".to_string()],
            docstring: Some("Validate payload against translated schema rules.".to_string()),
            body: vec!["return payload".to_string()],
        })
        .method(PyMethod {
            name: "allowed_actions".to_string(),
            params: vec!["self".to_string()],
            docstring: None,
            body: vec![format!(
                "return {}",
                crate::render::expr(&PyExpr::str_list(action_ids.iter().cloned()))
            )],
        });

    for action_id in action_ids {
        class = class.method(PyMethod {
            name: format!("action_{action_id}"),
            params: vec![
                "self".to_string(),
                "doc_id".to_string(),
                "payload=None".to_string(),
            ],
            docstring: Some(format!("Handle '{action_id}' for {doc_key}.")),
            body: vec![format!(
                "raise NotImplementedError(\"Implement {doc_key}.{action_id} in backend runtime\")"
            )],
        });
    }

    PyModule {
        docstring: Some(format!(
            "Doc runtime hooks for {doc_key}. Generated from the doc folder (source of truth)."
        )),
        imports: Vec::new(),
        classes: vec![class],
    }
}

///
/// RuntimeHooksJs
/// `<doc_key>.js` client hook scaffold
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuntimeHooksJs {
    pub doc_key: String,
    pub action_ids: Vec<String>,
}

impl RuntimeHooksJs {
    #[must_use]
    pub fn new(doc_key: &str, action_ids: &[String]) -> Self {
        Self {
            doc_key: doc_key.to_string(),
            action_ids: action_ids.to_vec(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Render;
    use serde_json::json;

    fn actions() -> Vec<String> {
        vec!["submit".to_string(), "cancel".to_string()]
    }

    #[test]
    fn py_hooks_stub_each_action() {
        let text = hooks_py("leave_request", &actions()).render();

        assert!(text.starts_with("\"\"\"Doc runtime hooks for leave_request."));
        assert!(text.contains("class DocRuntime:\n    doc_key = 'leave_request'\n"));
        assert!(text.contains("        return ['submit', 'cancel']\n"));
        assert!(text.contains("    def action_cancel(self, doc_id, payload=None):\n"));
        assert!(text.contains(
            "        raise NotImplementedError(\
             \"Implement leave_request.submit in backend runtime\")\n"
        ));
    }

    #[test]
    fn js_hooks_export_actions() {
        let text = RuntimeHooksJs::new("leave_request", &actions()).render();

        assert!(text.contains("export const DOC_KEY = \"leave_request\";\n"));
        assert!(text.contains("export const ALLOWED_ACTIONS = [\"submit\", \"cancel\"];\n"));
        assert!(text.contains("export function getVisibleActions(context = {}) {\n"));
        assert!(text.contains("export function applyFieldBehaviors(values = {}) {\n"));
    }

    #[test]
    fn runtime_json_key_order_is_stable() {
        let doc = RuntimeDoc {
            doc_key: Some("leave_request".to_string()),
            doc_title: None,
            doc_kind: None,
            status: None,
            classification: json!({}),
            allowed_actions: vec![json!("submit")],
            schema: RuntimeSchema::default(),
            interop: RuntimeInterop::default(),
            runtime: RuntimeBlock::default(),
        };
        let text = doc.to_json().unwrap();

        let keys: Vec<_> = [
            "\"doc_key\"",
            "\"allowed_actions\"",
            "\"schema\"",
            "\"interop\"",
            "\"runtime\"",
        ]
        .iter()
        .map(|k| text.find(k).unwrap())
        .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("\"generator\": \"plug runtime\""));
    }
}
