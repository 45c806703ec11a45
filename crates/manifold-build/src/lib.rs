//! Artifact generation for migrated entities.
//!
//! Generation is split in two: builders turn an [`EntityDescriptor`] into
//! structured artifacts (a Python module tree, route entries, a bridge
//! manifest), and [`render`] turns those into text.  Both halves are pure,
//! so regenerating from the same descriptor is byte-identical.

pub mod init;
pub mod manifest;
pub mod render;
pub mod route;
pub mod runtime;
pub mod urls;
pub mod view;

pub use init::PackageInit;
pub use manifest::BridgeManifest;
pub use render::Render;
pub use route::{RouteEntry, RouteTable};
pub use runtime::{RuntimeDoc, RuntimeHooksJs, RuntimeInterop, RuntimeSchema};
pub use urls::UrlsModule;
pub use view::PyModule;

use manifold_schema::node::EntityDescriptor;
use manifold_utils::case::to_type_name;

// generate
/// Build every per-entity artifact for `entity` placed under `app`/`module`.
#[must_use]
pub fn generate(entity: &EntityDescriptor, app_id: &str, module_id: &str) -> ArtifactSet {
    ArtifactBuilder::new(entity, app_id, module_id).generate()
}

///
/// ArtifactBuilder
///

pub struct ArtifactBuilder<'a> {
    pub entity: &'a EntityDescriptor,
    pub app_id: &'a str,
    pub module_id: &'a str,
}

impl<'a> ArtifactBuilder<'a> {
    #[must_use]
    pub const fn new(entity: &'a EntityDescriptor, app_id: &'a str, module_id: &'a str) -> Self {
        Self {
            entity,
            app_id,
            module_id,
        }
    }

    /// Generate the route entries, view module and manifest for the entity.
    #[must_use]
    pub fn generate(&self) -> ArtifactSet {
        let routes = route::generate(self);
        let view = view::generate(self);
        let manifest = manifest::generate(self, &routes);

        ArtifactSet {
            model_id: self.model_id().to_string(),
            routes,
            view,
            manifest,
        }
    }

    /// Python file stem shared by the view, model, filter and serializer.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.entity.entity_key
    }

    /// TitleCase class name derived from the entity title.
    #[must_use]
    pub fn type_name(&self) -> String {
        to_type_name(self.entity.display_name())
    }

    #[must_use]
    pub fn viewset_name(&self) -> String {
        format!("{}ViewSet", self.type_name())
    }

    #[must_use]
    pub fn public_viewset_name(&self) -> String {
        format!("Public{}ViewSet", self.type_name())
    }
}

///
/// ArtifactSet
/// everything generated for one entity
///

#[derive(Clone, Debug, PartialEq)]
pub struct ArtifactSet {
    pub model_id: String,
    pub routes: Vec<RouteEntry>,
    pub view: PyModule,
    pub manifest: BridgeManifest,
}

///
/// TESTS
///

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use manifold_schema::prelude::*;
    use std::path::PathBuf;

    pub(crate) fn entity(key: &str, title: &str, is_public: bool) -> EntityDescriptor {
        let mut customer = FieldDescriptor::new("customer", "Customer", FieldType::Link);
        customer.linked_entity = Some("Customer".to_string());

        EntityDescriptor {
            entity_key: key.to_string(),
            title: title.to_string(),
            kind: Some("master".to_string()),
            status: Some("active".to_string()),
            classification: Classification::default(),
            is_public,
            schema: EntitySchema {
                fields: vec![customer, FieldDescriptor::new("total", "Total", FieldType::Currency)],
                ..EntitySchema::default()
            },
            actions: vec!["create".to_string()],
            permissions: Vec::new(),
            origin: EntityOrigin::SubmoduleDoc,
            source_path: PathBuf::from("apps/billing/invoice"),
        }
    }

    #[test]
    fn generate_is_idempotent() {
        let invoice = entity("sales_invoice", "Sales Invoice", true);

        let first = generate(&invoice, "billing", "accounts");
        let second = generate(&invoice, "billing", "accounts");

        assert_eq!(first, second);
        assert_eq!(first.view.render(), second.view.render());
        assert_eq!(
            first.manifest.to_json().unwrap(),
            second.manifest.to_json().unwrap()
        );
    }

    #[test]
    fn names_fall_back_to_key_without_title() {
        let invoice = entity("sales_invoice", "  ", false);
        let builder = ArtifactBuilder::new(&invoice, "billing", "accounts");

        assert_eq!(builder.viewset_name(), "SalesInvoiceViewSet");
        assert_eq!(builder.public_viewset_name(), "PublicSalesInvoiceViewSet");
    }
}
