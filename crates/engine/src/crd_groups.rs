use navtree_registry::{CRD_RESOURCES_ROUTE, CrdCatalog, crd_group_url};
use navtree_types::{NavChild, NavItem};
use navtree_util::RoutePattern;
use tracing::debug;

use crate::TabRouteBuilder;

/// Expands the custom resource catalog into one entry per API group.
///
/// While the catalog is loading a single placeholder is returned instead,
/// even when some groups are already known. Groups keep catalog order.
pub fn expand_crd_groups(catalog: &dyn CrdCatalog, current_path: &str) -> Vec<NavChild> {
    if catalog.is_loading() {
        debug!("custom resource catalog loading; rendering placeholder");
        return vec![NavChild::LoadingPlaceholder];
    }

    let active_group = active_crd_group(current_path);
    catalog
        .groups()
        .into_iter()
        .map(|(group, crds)| {
            NavChild::Item(NavItem {
                id: format!("crd-{group}"),
                url: crd_group_url(&group),
                is_active: active_group.as_deref() == Some(group.as_str()),
                is_hidden: false,
                icon: None,
                sub_menus: TabRouteBuilder::from_crds(&crds),
                children: Vec::new(),
                title: group,
            })
        })
        .collect()
}

/// The API group of the custom resource list shown at `current_path`.
fn active_crd_group(current_path: &str) -> Option<String> {
    let pattern = RoutePattern::new(CRD_RESOURCES_ROUTE, false).ok()?;
    pattern.match_path(current_path)?.params.remove("group")
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use navtree_types::CrdDescriptor;

    struct FixedCatalog {
        loading: bool,
        groups: IndexMap<String, Vec<CrdDescriptor>>,
    }

    impl CrdCatalog for FixedCatalog {
        fn is_loading(&self) -> bool {
            self.loading
        }

        fn is_loaded(&self) -> bool {
            !self.loading
        }

        fn groups(&self) -> IndexMap<String, Vec<CrdDescriptor>> {
            self.groups.clone()
        }

        fn load_all(&self) {}
    }

    fn crd(group: &str, kind: &str, plural: &str) -> CrdDescriptor {
        CrdDescriptor {
            group: group.into(),
            kind: kind.into(),
            plural: plural.into(),
            version: None,
        }
    }

    fn catalog(loading: bool) -> FixedCatalog {
        let mut groups = IndexMap::new();
        groups.insert(
            "monitoring.coreos.com".to_string(),
            vec![crd("monitoring.coreos.com", "ServiceMonitor", "servicemonitors")],
        );
        groups.insert(
            "cert-manager.io".to_string(),
            vec![
                crd("cert-manager.io", "Certificate", "certificates"),
                crd("cert-manager.io", "Issuer", "issuers"),
            ],
        );
        FixedCatalog { loading, groups }
    }

    fn items(children: Vec<NavChild>) -> Vec<NavItem> {
        children
            .into_iter()
            .map(|child| match child {
                NavChild::Item(item) => item,
                NavChild::LoadingPlaceholder => panic!("unexpected placeholder"),
            })
            .collect()
    }

    #[test]
    fn loading_catalog_yields_only_the_placeholder() {
        let children = expand_crd_groups(&catalog(true), "/");
        assert_eq!(children, vec![NavChild::LoadingPlaceholder]);
    }

    #[test]
    fn groups_keep_catalog_order_and_siblings() {
        let groups = items(expand_crd_groups(&catalog(false), "/"));
        let ids: Vec<_> = groups.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["crd-monitoring.coreos.com", "crd-cert-manager.io"]);

        let cert_manager = &groups[1];
        assert_eq!(cert_manager.title, "cert-manager.io");
        assert_eq!(cert_manager.url, "/crd/definitions?groups=cert-manager.io");
        let kinds: Vec<_> = cert_manager.sub_menus.iter().map(|tab| tab.title.as_str()).collect();
        assert_eq!(kinds, vec!["Certificate", "Issuer"]);
    }

    #[test]
    fn group_is_active_on_its_resource_lists() {
        let groups = items(expand_crd_groups(&catalog(false), "/crd/cert-manager.io/issuers"));
        assert!(!groups[0].is_active);
        assert!(groups[1].is_active);
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        let empty = FixedCatalog {
            loading: false,
            groups: IndexMap::new(),
        };
        assert!(expand_crd_groups(&empty, "/").is_empty());
    }
}
