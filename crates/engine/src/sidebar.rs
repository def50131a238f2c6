//! Reactive sidebar driver.
//!
//! The sidebar owns the current location and namespace selection, rebuilds
//! the whole tree whenever one of its observed inputs changes and publishes
//! the latest tree on a `watch` channel for the rendering layer.

use std::sync::Arc;

use navtree_types::{NavItem, QueryParams};
use navtree_util::preferences::{PreferencesError, SidebarPreferences};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::NavigationTreeBuilder;

/// Query parameters carrying the selected namespaces.
pub fn namespace_query(namespaces: &[String]) -> QueryParams {
    let mut query = QueryParams::new();
    if !namespaces.is_empty() {
        query.insert("namespaces".to_string(), namespaces.join(","));
    }
    query
}

pub struct Sidebar {
    builder: NavigationTreeBuilder,
    location: String,
    namespaces: Vec<String>,
    preferences: Arc<SidebarPreferences>,
    tree: watch::Sender<Arc<Vec<NavItem>>>,
}

impl Sidebar {
    pub fn new(builder: NavigationTreeBuilder, preferences: Arc<SidebarPreferences>) -> Self {
        Self {
            builder,
            location: "/".to_string(),
            namespaces: Vec::new(),
            preferences,
            tree: watch::Sender::new(Arc::new(Vec::new())),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: impl Into<String>) -> Arc<Vec<NavItem>> {
        self.location = location.into();
        self.rebuild()
    }

    pub fn set_namespaces(&mut self, namespaces: Vec<String>) -> Arc<Vec<NavItem>> {
        self.namespaces = namespaces;
        self.rebuild()
    }

    /// Discards the previous tree and composes a new one.
    pub fn rebuild(&self) -> Arc<Vec<NavItem>> {
        let items = Arc::new(self.builder.build(&self.location, &namespace_query(&self.namespaces)));
        debug!(location = %self.location, items = items.len(), "navigation tree rebuilt");
        self.tree.send_replace(items.clone());
        items
    }

    /// The most recently built tree.
    pub fn items(&self) -> Arc<Vec<NavItem>> {
        self.tree.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<NavItem>>> {
        self.tree.subscribe()
    }

    pub fn is_pinned(&self) -> bool {
        self.preferences.is_pinned()
    }

    /// Pins or unpins the sidebar. The tree is unaffected.
    pub fn toggle(&self) -> Result<bool, PreferencesError> {
        self.preferences.toggle_pinned()
    }

    /// Rebuilds on every location change and every change reported by
    /// `sources` until the location sender is dropped.
    pub async fn run(mut self, mut locations: watch::Receiver<String>, sources: Vec<watch::Receiver<u64>>) {
        let (changed_tx, mut changed_rx) = mpsc::unbounded_channel::<()>();
        let forwarders: Vec<_> = sources
            .into_iter()
            .map(|mut source| {
                let changed_tx = changed_tx.clone();
                tokio::spawn(async move {
                    while source.changed().await.is_ok() {
                        if changed_tx.send(()).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        drop(changed_tx);

        self.location = locations.borrow_and_update().clone();
        self.rebuild();

        loop {
            tokio::select! {
                changed = locations.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.location = locations.borrow_and_update().clone();
                    self.rebuild();
                }
                Some(()) = changed_rx.recv() => {
                    // Coalesce bursts into a single rebuild.
                    while changed_rx.try_recv().is_ok() {}
                    self.rebuild();
                }
            }
        }

        for forwarder in forwarders {
            forwarder.abort();
        }
        debug!("sidebar driver stopped");
    }
}
