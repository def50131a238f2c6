use std::sync::RwLock;

use navtree_types::{PageRegistration, PageTarget};
use navtree_util::{RoutePattern, RoutePatternError, extension_page_route_path};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::Revision;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The extension already registered a page with the same id.
    #[error("extension '{extension_id}' already registered page '{page_id}'")]
    DuplicatePage { extension_id: String, page_id: String },
    /// The page's route path cannot be compiled.
    #[error("extension '{extension_id}' registered an invalid route: {source}")]
    InvalidRoute {
        extension_id: String,
        #[source]
        source: RoutePatternError,
    },
}

/// Resolves menu targets to concrete extension pages.
pub trait PageRegistry: Send + Sync {
    fn get_by_target(&self, target: &PageTarget) -> Option<PageRegistration>;
}

/// In-memory page registry fed by loaded extensions.
#[derive(Debug, Default)]
pub struct ClusterPageRegistry {
    pages: RwLock<Vec<PageRegistration>>,
    revision: Revision,
}

impl ClusterPageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the pages of one extension.
    ///
    /// Pages without a route path are mounted under the extension's base
    /// path. The batch is rejected as a whole when a page id is already taken
    /// by the same extension or a route path does not compile.
    pub fn add(&self, pages: impl IntoIterator<Item = PageRegistration>) -> Result<(), RegistryError> {
        let mut registered = self.pages.write().expect("page registry lock");
        let mut accepted: Vec<PageRegistration> = Vec::new();
        for mut page in pages {
            let taken = registered
                .iter()
                .chain(accepted.iter())
                .any(|existing| existing.extension_id == page.extension_id && existing.page_id == page.page_id);
            if taken {
                return Err(RegistryError::DuplicatePage {
                    extension_id: page.extension_id,
                    page_id: page.page_id.unwrap_or_default(),
                });
            }
            if page.route_path.is_empty() {
                page.route_path = extension_page_route_path(&page.extension_id, page.page_id.as_deref());
            }
            if let Err(source) = RoutePattern::new(&page.route_path, page.exact) {
                return Err(RegistryError::InvalidRoute {
                    extension_id: page.extension_id,
                    source,
                });
            }
            accepted.push(page);
        }
        debug!(added = accepted.len(), "extension pages registered");
        registered.extend(accepted);
        drop(registered);
        self.revision.bump();
        Ok(())
    }

    pub fn remove_extension(&self, extension_id: &str) {
        self.pages
            .write()
            .expect("page registry lock")
            .retain(|page| page.extension_id != extension_id);
        self.revision.bump();
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

impl PageRegistry for ClusterPageRegistry {
    fn get_by_target(&self, target: &PageTarget) -> Option<PageRegistration> {
        let wanted = target.page_id.as_deref().filter(|page_id| !page_id.is_empty());
        self.pages
            .read()
            .expect("page registry lock")
            .iter()
            .find(|page| {
                page.extension_id == target.extension_id
                    && page.page_id.as_deref().filter(|page_id| !page_id.is_empty()) == wanted
            })
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navtree_types::ComponentRef;

    fn page(extension_id: &str, page_id: Option<&str>) -> PageRegistration {
        PageRegistration {
            extension_id: extension_id.into(),
            page_id: page_id.map(Into::into),
            route_path: String::new(),
            exact: false,
            component: ComponentRef::named("Page"),
        }
    }

    fn target(extension_id: &str, page_id: Option<&str>) -> PageTarget {
        PageTarget {
            extension_id: extension_id.into(),
            page_id: page_id.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn resolves_pages_by_extension_and_page_id() {
        let registry = ClusterPageRegistry::new();
        registry
            .add([page("@acme/metrics", None), page("@acme/metrics", Some("cpu"))])
            .expect("register");

        let default_page = registry.get_by_target(&target("@acme/metrics", None)).expect("default page");
        assert_eq!(default_page.route_path, "/extension/acme-metrics");

        let cpu = registry.get_by_target(&target("@acme/metrics", Some("cpu"))).expect("cpu page");
        assert_eq!(cpu.route_path, "/extension/acme-metrics/cpu");

        assert!(registry.get_by_target(&target("@acme/metrics", Some("memory"))).is_none());
        assert!(registry.get_by_target(&target("@other/ext", None)).is_none());
    }

    #[test]
    fn invalid_route_rejects_the_batch() {
        let registry = ClusterPageRegistry::new();
        let mut broken = page("ext", Some("broken"));
        broken.route_path = "/extension/ext/:".into();
        let error = registry.add([page("ext", Some("ok")), broken]).expect_err("invalid route");
        assert!(matches!(error, RegistryError::InvalidRoute { ref extension_id, .. } if extension_id == "ext"));
        assert!(registry.get_by_target(&target("ext", Some("ok"))).is_none());
    }

    #[test]
    fn explicit_route_paths_are_kept() {
        let registry = ClusterPageRegistry::new();
        let mut custom = page("ext", Some("detail"));
        custom.route_path = "/extension/ext/detail/:name".into();
        registry.add([custom]).expect("register");
        let resolved = registry.get_by_target(&target("ext", Some("detail"))).expect("resolved");
        assert_eq!(resolved.route_path, "/extension/ext/detail/:name");
    }

    #[test]
    fn duplicate_page_rejects_the_batch() {
        let registry = ClusterPageRegistry::new();
        let error = registry
            .add([page("ext", Some("a")), page("ext", Some("b")), page("ext", Some("a"))])
            .expect_err("duplicate");
        assert_eq!(
            error,
            RegistryError::DuplicatePage {
                extension_id: "ext".into(),
                page_id: "a".into()
            }
        );
        assert!(registry.get_by_target(&target("ext", Some("b"))).is_none());
    }

    #[test]
    fn removing_an_extension_unregisters_its_pages() {
        let registry = ClusterPageRegistry::new();
        registry.add([page("ext", None)]).expect("register");
        registry.remove_extension("ext");
        assert!(registry.get_by_target(&target("ext", None)).is_none());
    }
}
