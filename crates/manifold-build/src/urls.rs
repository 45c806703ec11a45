use crate::RouteTable;

///
/// UrlsModule
///
/// The app's `urls.py`: one static router registration per route entry.
/// Always rebuilt in full from the route table.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UrlsModule {
    pub registrations: Vec<Registration>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Registration {
    pub import_path: String,
    pub viewset_name: String,
    pub route_path: String,
    pub basename: String,
}

impl UrlsModule {
    #[must_use]
    pub fn from_routes(table: &RouteTable) -> Self {
        let mut registrations = Vec::with_capacity(table.len());

        for module in table.modules() {
            for model in &module.models {
                let import_path = format!(".views.{}.{}", module.module_id, model.model_id);

                for route in &model.routes {
                    registrations.push(Registration {
                        import_path: import_path.clone(),
                        viewset_name: route.viewset_name.clone(),
                        route_path: route.route_path.clone(),
                        basename: route.basename(),
                    });
                }
            }
        }

        Self { registrations }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArtifactBuilder, Render, tests::entity};

    fn table() -> RouteTable {
        let mut table = RouteTable::new();
        for (module, key, public) in [
            ("accounts", "invoice", true),
            ("accounts", "payment", false),
            ("sales", "quote", false),
        ] {
            let e = entity(key, "", public);
            let set = ArtifactBuilder::new(&e, "billing", module).generate();
            table.push(module, &set.model_id, set.routes);
        }
        table
    }

    #[test]
    fn registrations_follow_discovery_order() {
        let urls = UrlsModule::from_routes(&table());
        let routes: Vec<_> = urls
            .registrations
            .iter()
            .map(|r| r.route_path.as_str())
            .collect();

        assert_eq!(routes, vec!["invoice", "public/invoice", "payment", "quote"]);
    }

    #[test]
    fn rendered_urls_register_statically() {
        let text = UrlsModule::from_routes(&table()).render();

        assert!(text.starts_with(
            "from django.urls import path, include\n\
             from rest_framework.routers import DefaultRouter\n\
             router = DefaultRouter()\n"
        ));
        assert!(text.contains("from .views.accounts.invoice import InvoiceViewSet\n"));
        assert!(text.contains(
            "router.register(r'public/invoice', PublicInvoiceViewSet, basename='public-invoice')\n"
        ));
        assert!(text.contains("router.register(r'quote', QuoteViewSet, basename='quote')\n"));
        assert!(text.ends_with("urlpatterns = [\n    path('', include(router.urls)),\n]\n"));
    }

    #[test]
    fn empty_table_still_renders_router() {
        let text = UrlsModule::from_routes(&RouteTable::new()).render();

        assert!(text.contains("router = DefaultRouter()\n"));
        assert!(!text.contains("register"));
    }
}
