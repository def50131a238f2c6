use std::sync::RwLock;

use navtree_types::MenuRegistration;
use tokio::sync::watch;
use tracing::debug;

use crate::Revision;

/// Source of extension-contributed menu entries.
pub trait MenuRegistry: Send + Sync {
    /// Top-level registrations in registration order.
    fn root_items(&self) -> Vec<MenuRegistration>;
    /// Children of `menu` in registration order.
    fn sub_items(&self, menu: &MenuRegistration) -> Vec<MenuRegistration>;
}

/// In-memory menu registry fed by loaded extensions.
#[derive(Debug, Default)]
pub struct ClusterPageMenuRegistry {
    items: RwLock<Vec<MenuRegistration>>,
    revision: Revision,
}

impl ClusterPageMenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends registrations contributed by an extension.
    pub fn add(&self, registrations: impl IntoIterator<Item = MenuRegistration>) {
        let mut items = self.items.write().expect("menu registry lock");
        let before = items.len();
        items.extend(registrations);
        debug!(added = items.len() - before, total = items.len(), "menu registrations added");
        drop(items);
        self.revision.bump();
    }

    /// Drops every registration of `extension_id`, e.g. when it is disabled.
    pub fn remove_extension(&self, extension_id: &str) {
        self.items
            .write()
            .expect("menu registry lock")
            .retain(|item| item.extension_id != extension_id);
        debug!(extension_id = %extension_id, "menu registrations removed");
        self.revision.bump();
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

impl MenuRegistry for ClusterPageMenuRegistry {
    fn root_items(&self) -> Vec<MenuRegistration> {
        self.items
            .read()
            .expect("menu registry lock")
            .iter()
            .filter(|item| item.parent_id.is_none())
            .cloned()
            .collect()
    }

    fn sub_items(&self, menu: &MenuRegistration) -> Vec<MenuRegistration> {
        let Some(menu_id) = menu.menu_id() else {
            return Vec::new();
        };
        self.items
            .read()
            .expect("menu registry lock")
            .iter()
            .filter(|item| item.extension_id == menu.extension_id && item.parent_id.as_deref() == Some(menu_id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navtree_types::PageTarget;

    fn registration(extension_id: &str, id: Option<&str>, parent_id: Option<&str>, title: &str) -> MenuRegistration {
        MenuRegistration {
            extension_id: extension_id.into(),
            id: id.map(Into::into),
            parent_id: parent_id.map(Into::into),
            title: title.into(),
            icon: None,
            target: PageTarget {
                extension_id: extension_id.into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn root_items_exclude_children_and_keep_order() {
        let registry = ClusterPageMenuRegistry::new();
        registry.add([
            registration("a", Some("metrics"), None, "Metrics"),
            registration("a", None, Some("metrics"), "CPU"),
            registration("b", Some("logs"), None, "Logs"),
        ]);
        let titles: Vec<_> = registry.root_items().into_iter().map(|item| item.title).collect();
        assert_eq!(titles, vec!["Metrics", "Logs"]);
    }

    #[test]
    fn sub_items_are_scoped_to_the_owning_extension() {
        let registry = ClusterPageMenuRegistry::new();
        registry.add([
            registration("a", Some("metrics"), None, "Metrics"),
            registration("a", None, Some("metrics"), "CPU"),
            registration("b", None, Some("metrics"), "Foreign"),
            registration("a", None, Some("metrics"), "Memory"),
        ]);
        let root = registry.root_items().remove(0);
        let titles: Vec<_> = registry.sub_items(&root).into_iter().map(|item| item.title).collect();
        assert_eq!(titles, vec!["CPU", "Memory"]);
    }

    #[test]
    fn menu_without_id_has_no_sub_items() {
        let registry = ClusterPageMenuRegistry::new();
        registry.add([
            registration("a", Some(""), None, "Anonymous"),
            registration("a", None, Some(""), "Orphan"),
        ]);
        let root = registry.root_items().remove(0);
        assert!(registry.sub_items(&root).is_empty());
    }

    #[test]
    fn remove_extension_drops_all_of_its_items() {
        let registry = ClusterPageMenuRegistry::new();
        let receiver = registry.subscribe();
        registry.add([
            registration("a", Some("metrics"), None, "Metrics"),
            registration("b", Some("logs"), None, "Logs"),
        ]);
        registry.remove_extension("a");
        let titles: Vec<_> = registry.root_items().into_iter().map(|item| item.title).collect();
        assert_eq!(titles, vec!["Logs"]);
        assert!(receiver.has_changed().expect("sender alive"));
    }
}
