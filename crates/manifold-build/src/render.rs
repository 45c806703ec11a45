//! Text rendering for generated artifacts.
//!
//! Every renderer ends its output with exactly one newline.

use crate::{
    PackageInit, RuntimeHooksJs, UrlsModule,
    view::{PyClass, PyExpr, PyMethod, PyModule},
};
use serde::Serialize;
use std::fmt::Write;

const INDENT: &str = "    ";

///
/// Render
///

pub trait Render {
    fn render(&self) -> String;
}

/// Pretty JSON (two-space indent) with a trailing newline.
pub fn json_text<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');

    Ok(text)
}

// expr
/// Render a Python expression.
#[must_use]
pub fn expr(e: &PyExpr) -> String {
    match e {
        PyExpr::Name(name) => name.clone(),
        PyExpr::Str(s) => {
            let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
            format!("'{escaped}'")
        }
        PyExpr::List(items) => {
            let items: Vec<String> = items.iter().map(expr).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

impl Render for PyModule {
    fn render(&self) -> String {
        let mut out = String::new();

        if let Some(doc) = &self.docstring {
            let _ = writeln!(out, "\"\"\"{doc}\"\"\"");
            out.push('\n');
        }

        for import in &self.imports {
            let _ = writeln!(out, "from {} import {}", import.module, import.names.join(", "));
        }
        if !self.imports.is_empty() && !self.classes.is_empty() {
            out.push('\n');
        }

        for (i, class) in self.classes.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            render_class(class, &mut out);
        }

        out
    }
}

fn render_class(class: &PyClass, out: &mut String) {
    if class.bases.is_empty() {
        let _ = writeln!(out, "class {}:", class.name);
    } else {
        let _ = writeln!(out, "class {}({}):", class.name, class.bases.join(", "));
    }

    if class.attrs.is_empty() && class.methods.is_empty() {
        let _ = writeln!(out, "{INDENT}pass");
        return;
    }

    for attr in &class.attrs {
        let _ = writeln!(out, "{INDENT}{} = {}", attr.target, expr(&attr.value));
    }

    for (i, method) in class.methods.iter().enumerate() {
        if i > 0 || !class.attrs.is_empty() {
            out.push('\n');
        }
        render_method(method, out);
    }
}

fn render_method(method: &PyMethod, out: &mut String) {
    let _ = writeln!(out, "{INDENT}def {}({}):", method.name, method.params.join(", "));

    if let Some(doc) = &method.docstring {
        let _ = writeln!(out, "{INDENT}{INDENT}\"\"\"{doc}\"\"\"");
    }
    if method.body.is_empty() && method.docstring.is_none() {
        let _ = writeln!(out, "{INDENT}{INDENT}pass");
    }
    for line in &method.body {
        let _ = writeln!(out, "{INDENT}{INDENT}{line}");
    }
}

impl Render for UrlsModule {
    fn render(&self) -> String {
        let mut out = String::from(
            "from django.urls import path, include\n\
             from rest_framework.routers import DefaultRouter\n\
             router = DefaultRouter()\n",
        );

        for reg in &self.registrations {
            let _ = writeln!(out, "from {} import {}", reg.import_path, reg.viewset_name);
            let _ = writeln!(
                out,
                "router.register(r'{}', {}, basename='{}')",
                reg.route_path, reg.viewset_name, reg.basename
            );
        }

        out.push_str("\nurlpatterns = [\n    path('', include(router.urls)),\n]\n");
        out
    }
}

impl Render for PackageInit {
    fn render(&self) -> String {
        match self {
            Self::Wildcard => "from . import *\n".to_string(),
            Self::Modules(modules) => modules.iter().fold(String::new(), |mut out, m| {
                let _ = writeln!(out, "from .{m} import *");
                out
            }),
        }
    }
}

impl Render for RuntimeHooksJs {
    fn render(&self) -> String {
        let actions: Vec<String> = self
            .action_ids
            .iter()
            .map(|a| serde_json::Value::String(a.clone()).to_string())
            .collect();

        let mut out = String::new();
        let _ = writeln!(out, "// Doc client runtime hooks for {}.", self.doc_key);
        out.push_str("// Generated from the doc folder (source of truth).\n\n");
        let _ = writeln!(out, "export const DOC_KEY = \"{}\";", self.doc_key);
        let _ = writeln!(out, "export const ALLOWED_ACTIONS = [{}];", actions.join(", "));
        out.push_str(
            "\nexport function getVisibleActions(context = {}) {\n\
             \x20 const { disabledActions = [] } = context;\n\
             \x20 return ALLOWED_ACTIONS.filter((action) => !disabledActions.includes(action));\n\
             }\n\n\
             export function applyFieldBehaviors(values = {}) {\n\
             \x20 return values;\n\
             }\n",
        );

        out
    }
}

///
/// TESTS
///
