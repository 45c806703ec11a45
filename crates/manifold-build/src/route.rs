use crate::ArtifactBuilder;
use serde::Serialize;

///
/// RouteEntry
///
/// One router registration.  `route_path` doubles as the router basename
/// (`public-<key>` for the read-only surface).
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RouteEntry {
    pub route_path: String,
    pub viewset_name: String,
    pub is_public: bool,
}

impl RouteEntry {
    #[must_use]
    pub fn basename(&self) -> String {
        if self.is_public {
            self.route_path.replacen("public/", "public-", 1)
        } else {
            self.route_path.clone()
        }
    }
}

// generate
// the main route, then the public one when the entity opts in
#[must_use]
pub fn generate(builder: &ArtifactBuilder) -> Vec<RouteEntry> {
    let model_id = builder.model_id();
    let mut routes = vec![RouteEntry {
        route_path: model_id.to_string(),
        viewset_name: builder.viewset_name(),
        is_public: false,
    }];

    if builder.entity.is_public {
        routes.push(RouteEntry {
            route_path: format!("public/{model_id}"),
            viewset_name: builder.public_viewset_name(),
            is_public: true,
        });
    }

    routes
}

///
/// RouteTable
///
/// App-wide registration list in discovery order, grouped by module for
/// the view imports.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RouteTable {
    modules: Vec<ModuleRoutes>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleRoutes {
    pub module_id: String,
    pub models: Vec<ModelRoutes>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModelRoutes {
    pub model_id: String,
    pub routes: Vec<RouteEntry>,
}

impl RouteTable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Append routes for a model, keeping first-seen module order.
    pub fn push(&mut self, module_id: &str, model_id: &str, routes: Vec<RouteEntry>) {
        let index = match self.modules.iter().position(|m| m.module_id == module_id) {
            Some(index) => index,
            None => {
                self.modules.push(ModuleRoutes {
                    module_id: module_id.to_string(),
                    models: Vec::new(),
                });
                self.modules.len() - 1
            }
        };

        self.modules[index].models.push(ModelRoutes {
            model_id: model_id.to_string(),
            routes,
        });
    }

    #[must_use]
    pub fn modules(&self) -> &[ModuleRoutes] {
        &self.modules
    }

    /// Total number of router registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|m| &m.models)
            .map(|m| m.routes.len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::entity;

    #[test]
    fn public_entity_gets_second_route() {
        let invoice = entity("invoice", "Invoice", true);
        let routes = generate(&ArtifactBuilder::new(&invoice, "billing", "accounts"));

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[1].route_path, "public/invoice");
        assert_eq!(routes[1].basename(), "public-invoice");
        assert_eq!(routes[1].viewset_name, "PublicInvoiceViewSet");
    }

    #[test]
    fn private_entity_gets_one_route() {
        let invoice = entity("invoice", "Invoice", false);
        let routes = generate(&ArtifactBuilder::new(&invoice, "billing", "accounts"));

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].basename(), "invoice");
    }

    #[test]
    fn table_keeps_module_order() {
        let mut table = RouteTable::new();
        table.push("sales", "quote", Vec::new());
        table.push("accounts", "invoice", Vec::new());
        table.push("sales", "order", Vec::new());

        let modules: Vec<_> = table.modules().iter().map(|m| m.module_id.as_str()).collect();
        assert_eq!(modules, vec!["sales", "accounts"]);
        assert_eq!(table.modules()[0].models.len(), 2);
        assert!(table.is_empty());
    }
}
