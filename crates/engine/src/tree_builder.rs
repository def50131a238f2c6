use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use navtree_registry::{
    BuiltinSection, CrdCatalog, MenuRegistry, PageRegistry, PermissionGate, RouteTable, SectionVisibility,
};
use navtree_types::{MenuRegistration, NavItem, QueryParams};
use navtree_util::{build_extension_page_url, build_url, sanitize_extension_name};
use tracing::{debug, info};

use crate::{ActiveRoute, ActiveRouteResolver, RouteCandidate, TabRouteBuilder, expand_crd_groups};

/// Resource kind gating the custom resource catalog load.
pub const CRD_PERMISSION: &str = "customresourcedefinitions";

/// Id of the entry built for an extension's root menu.
///
/// Extension ids live in their own namespace so they never collide with a
/// built-in section or with a menu of another extension.
pub fn extension_item_id(extension_id: &str, menu_id: &str) -> String {
    format!("extension-{}-{menu_id}", sanitize_extension_name(extension_id))
}

/// Collaborators the tree is composed from.
#[derive(Clone)]
pub struct NavigationSources {
    pub permissions: Arc<dyn PermissionGate>,
    pub menus: Arc<dyn MenuRegistry>,
    pub pages: Arc<dyn PageRegistry>,
    pub crds: Arc<dyn CrdCatalog>,
    pub route_table: RouteTable,
}

/// Composes the ordered top-level navigation entries.
///
/// Built-in sections come first in route table order, followed by extension
/// menus in registry order. Output is a pure function of the inputs, apart
/// from the custom resource catalog load this builder requests once.
pub struct NavigationTreeBuilder {
    sources: NavigationSources,
    crd_load_requested: AtomicBool,
}

impl NavigationTreeBuilder {
    pub fn new(sources: NavigationSources) -> Self {
        Self {
            sources,
            crd_load_requested: AtomicBool::new(false),
        }
    }

    pub fn sources(&self) -> &NavigationSources {
        &self.sources
    }

    /// Builds the full tree for `current_path`.
    pub fn build(&self, current_path: &str, namespace_query: &QueryParams) -> Vec<NavItem> {
        self.request_crd_load();

        let mut items: Vec<NavItem> = self
            .sources
            .route_table
            .sections()
            .iter()
            .map(|section| self.builtin_item(section, current_path, namespace_query))
            .collect();

        let tab_builder = TabRouteBuilder::new(self.sources.menus.as_ref(), self.sources.pages.as_ref());
        let mut seen: HashSet<String> = HashSet::new();
        for menu in self.sources.menus.root_items() {
            let Some(item) = self.extension_item(&menu, &tab_builder, current_path) else {
                continue;
            };
            if !seen.insert(item.id.clone()) {
                debug!(
                    extension_id = %menu.extension_id,
                    id = %item.id,
                    "skipping menu registration with repeated id"
                );
                continue;
            }
            items.push(item);
        }
        items
    }

    /// Starts the catalog load the first time it is permitted and neither
    /// loaded nor loading. A failed load is not retried.
    fn request_crd_load(&self) {
        if self.crd_load_requested.load(Ordering::Acquire) {
            return;
        }
        let catalog = &self.sources.crds;
        if catalog.is_loaded() || catalog.is_loading() {
            return;
        }
        if !self.sources.permissions.is_allowed(CRD_PERMISSION) {
            return;
        }
        if self.crd_load_requested.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("requesting custom resource definitions");
        catalog.load_all();
    }

    fn builtin_item(&self, section: &BuiltinSection, current_path: &str, namespace_query: &QueryParams) -> NavItem {
        let permissions = self.sources.permissions.as_ref();
        let sub_menus = TabRouteBuilder::from_section(section, permissions, namespace_query);
        let is_hidden = match section.visibility {
            SectionVisibility::Always => false,
            SectionVisibility::Resource(resource) => !permissions.is_allowed(resource),
            SectionVisibility::AnyTab => sub_menus.is_empty(),
        };

        let mut routes = vec![RouteCandidate::prefix(section.route_path)];
        routes.extend(section.tabs.iter().map(|tab| RouteCandidate::prefix(tab.route_path)));
        let is_active = ActiveRouteResolver::is_active(current_path, ActiveRoute::AnyOf(routes));

        let url = if section.namespaced {
            build_url(section.url, namespace_query)
        } else {
            section.url.to_string()
        };

        let children = if section.expands_crds {
            expand_crd_groups(self.sources.crds.as_ref(), current_path)
        } else {
            Vec::new()
        };

        NavItem {
            id: section.id.to_string(),
            url,
            title: section.title.to_string(),
            icon: Some(section.icon.to_icon()),
            is_active,
            is_hidden,
            sub_menus,
            children,
        }
    }

    /// Builds the entry of a root extension menu, or `None` when it has no id
    /// or neither its target nor any of its sub items resolves to a page.
    ///
    /// The entry is active anywhere beneath its page or sub-routes; `exact`
    /// only applies to the tabs themselves.
    fn extension_item(
        &self,
        menu: &MenuRegistration,
        tab_builder: &TabRouteBuilder<'_>,
        current_path: &str,
    ) -> Option<NavItem> {
        let Some(id) = menu.menu_id() else {
            debug!(
                extension_id = %menu.extension_id,
                title = %menu.title,
                "skipping menu registration without id"
            );
            return None;
        };

        let page = self.sources.pages.get_by_target(&menu.target);
        let sub_menus = tab_builder.from_menu(menu);

        let (url, is_active) = if let Some(page) = &page {
            let url = build_extension_page_url(&page.extension_id, page.page_id.as_deref(), &menu.target.params);
            let candidate = RouteCandidate::prefix(&page.route_path);
            (url, ActiveRouteResolver::is_active(current_path, candidate))
        } else if let Some(first) = sub_menus.first() {
            let routes = sub_menus
                .iter()
                .map(|tab| RouteCandidate::prefix(&tab.route_path))
                .collect();
            (first.url.clone(), ActiveRouteResolver::is_active(current_path, ActiveRoute::AnyOf(routes)))
        } else {
            debug!(
                extension_id = %menu.extension_id,
                menu_id = %id,
                "skipping menu registration without resolvable page"
            );
            return None;
        };

        Some(NavItem {
            id: extension_item_id(&menu.extension_id, id),
            url,
            title: menu.title.clone(),
            icon: menu.icon.clone(),
            is_active,
            is_hidden: false,
            sub_menus,
            children: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navtree_registry::{
        ClusterPageMenuRegistry, ClusterPageRegistry, CrdStore, PermissionsConfig, ResourcePermissions, StaticCrdSource,
    };

    fn builder_with(permissions: PermissionsConfig) -> NavigationTreeBuilder {
        NavigationTreeBuilder::new(NavigationSources {
            permissions: Arc::new(ResourcePermissions::new(permissions)),
            menus: Arc::new(ClusterPageMenuRegistry::new()),
            pages: Arc::new(ClusterPageRegistry::new()),
            crds: Arc::new(CrdStore::new(Arc::new(StaticCrdSource::default()))),
            route_table: RouteTable::builtin(),
        })
    }

    #[test]
    fn namespaced_sections_carry_the_query() {
        let builder = builder_with(PermissionsConfig::default());
        let query = QueryParams::from([("namespaces".to_string(), "default".to_string())]);
        let items = builder.build("/", &query);
        let url_of = |id: &str| items.iter().find(|item| item.id == id).map(|item| item.url.clone());
        assert_eq!(url_of("workloads").as_deref(), Some("/workloads?namespaces=default"));
        assert_eq!(url_of("events").as_deref(), Some("/events?namespaces=default"));
        assert_eq!(url_of("nodes").as_deref(), Some("/nodes"));
        assert_eq!(url_of("custom-resources").as_deref(), Some("/crd/definitions"));
    }

    #[test]
    fn section_is_active_on_any_of_its_tabs() {
        let builder = builder_with(PermissionsConfig::default());
        let items = builder.build("/deployments", &QueryParams::new());
        let active: Vec<_> = items.iter().filter(|item| item.is_active).map(|item| item.id.as_str()).collect();
        assert_eq!(active, vec!["workloads"]);
    }

    #[test]
    fn tabbed_section_hides_when_no_tab_is_viewable() {
        let mut config = PermissionsConfig::default();
        for kind in ["services", "endpoints", "ingresses", "networkpolicies"] {
            config.resources.insert(kind.to_string(), false);
        }
        let items = builder_with(config).build("/", &QueryParams::new());
        let network = items.iter().find(|item| item.id == "networks").expect("network");
        assert!(network.is_hidden);
        assert!(network.sub_menus.is_empty());
    }

    #[test]
    fn extension_ids_are_namespaced_by_extension() {
        assert_eq!(extension_item_id("@acme/metrics", "cpu"), "extension-acme-metrics-cpu");
        assert_ne!(extension_item_id("ext-a", "nodes"), "nodes");
    }

    #[test]
    fn crd_load_is_not_requested_without_permission() {
        let mut config = PermissionsConfig::default();
        config.resources.insert(CRD_PERMISSION.to_string(), false);
        let builder = builder_with(config);
        builder.build("/", &QueryParams::new());
        assert!(!builder.crd_load_requested.load(Ordering::Acquire));
    }
}
