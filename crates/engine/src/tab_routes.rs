use navtree_registry::{BuiltinSection, CRD_RESOURCES_ROUTE, MenuRegistry, PageRegistry, PermissionGate};
use navtree_types::{ComponentRef, CrdDescriptor, MenuRegistration, QueryParams, TabRoute};
use navtree_util::{build_extension_page_url, build_url};
use tracing::debug;

/// Component rendering a custom resource list.
pub const CRD_LIST_COMPONENT: &str = "CrdList";

/// Builds the ordered sub-tabs of navigation entries.
pub struct TabRouteBuilder<'a> {
    menus: &'a dyn MenuRegistry,
    pages: &'a dyn PageRegistry,
}

impl<'a> TabRouteBuilder<'a> {
    pub fn new(menus: &'a dyn MenuRegistry, pages: &'a dyn PageRegistry) -> Self {
        Self { menus, pages }
    }

    /// One tab per sub item of `menu` whose target resolves to a page, in
    /// registry order. Unresolvable sub items are dropped.
    pub fn from_menu(&self, menu: &MenuRegistration) -> Vec<TabRoute> {
        self.menus
            .sub_items(menu)
            .into_iter()
            .filter_map(|sub_item| {
                let Some(page) = self.pages.get_by_target(&sub_item.target) else {
                    debug!(
                        extension_id = %sub_item.extension_id,
                        title = %sub_item.title,
                        "dropping sub item with unresolvable target"
                    );
                    return None;
                };
                Some(TabRoute {
                    url: build_extension_page_url(&page.extension_id, page.page_id.as_deref(), &sub_item.target.params),
                    route_path: page.route_path,
                    title: sub_item.title,
                    component: page.component,
                    exact: Some(page.exact),
                })
            })
            .collect()
    }

    /// The viewable tabs of a built-in section. The namespace query is
    /// appended to tab URLs of namespaced sections.
    pub fn from_section(
        section: &BuiltinSection,
        permissions: &dyn PermissionGate,
        namespace_query: &QueryParams,
    ) -> Vec<TabRoute> {
        section
            .tabs
            .iter()
            .filter(|tab| tab.resource.is_none_or(|resource| permissions.is_allowed(resource)))
            .map(|tab| TabRoute {
                title: tab.title.to_string(),
                url: if section.namespaced {
                    build_url(tab.url, namespace_query)
                } else {
                    tab.url.to_string()
                },
                route_path: tab.route_path.to_string(),
                component: ComponentRef::named(tab.component),
                exact: None,
            })
            .collect()
    }

    /// One tab per definition of a custom resource group, in catalog order.
    pub fn from_crds(crds: &[CrdDescriptor]) -> Vec<TabRoute> {
        crds.iter()
            .map(|crd| TabRoute {
                title: crd.resource_kind().to_string(),
                url: crd.resource_url(),
                route_path: CRD_RESOURCES_ROUTE.to_string(),
                component: ComponentRef::named(CRD_LIST_COMPONENT),
                exact: None,
            })
            .collect()
    }
}
