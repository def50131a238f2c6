//! Fixture files describing every input of a navigation tree build.

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use navtree_engine::NavigationSources;
use navtree_registry::{
    ClusterPageMenuRegistry, ClusterPageRegistry, CrdSource, CrdStore, FileCrdSource, PermissionsConfig,
    ResourcePermissions, RouteTable, StaticCrdSource,
};
use navtree_types::{CrdDescriptor, MenuRegistration, PageRegistration};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    /// Location path the tree is built for
    #[serde(default)]
    pub location: Option<String>,
    /// Selected namespaces appended to namespaced section URLs
    #[serde(default)]
    pub namespaces: Vec<String>,
    #[serde(default)]
    pub permissions: PermissionsConfig,
    /// Icons and components use the `{ variant: value }` map form in both
    /// YAML and JSON.
    #[serde(default, deserialize_with = "serde_yaml::with::singleton_map_recursive::deserialize")]
    pub menus: Vec<MenuRegistration>,
    #[serde(default, deserialize_with = "serde_yaml::with::singleton_map_recursive::deserialize")]
    pub pages: Vec<PageRegistration>,
    /// Inline custom resource definitions
    #[serde(default)]
    pub crds: Vec<CrdDescriptor>,
    /// JSON file listing custom resource definitions; overrides `crds`
    #[serde(default)]
    pub crds_file: Option<String>,
    /// Simulated latency of the custom resource listing, in milliseconds
    #[serde(default)]
    pub crd_latency_ms: Option<u64>,
}

/// Registries populated from a fixture.
pub struct FixtureSources {
    pub sources: NavigationSources,
    pub crds: Arc<CrdStore>,
}

impl Fixture {
    /// Reads a YAML or JSON fixture; the format follows the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_context(|| format!("reading fixture {}", path.display()))?;
        let is_json = path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&content).with_context(|| format!("parsing JSON fixture {}", path.display()))
        } else {
            serde_yaml::from_str(&content).with_context(|| format!("parsing YAML fixture {}", path.display()))
        }
    }

    pub fn into_sources(self) -> Result<FixtureSources> {
        let menus = ClusterPageMenuRegistry::new();
        menus.add(self.menus);

        let pages = ClusterPageRegistry::new();
        pages.add(self.pages).context("registering fixture pages")?;

        let source: Arc<dyn CrdSource> = match self.crds_file {
            Some(path) => Arc::new(FileCrdSource::new(navtree_util::expand_tilde(&path))),
            None => {
                let mut source = StaticCrdSource::new(self.crds);
                if let Some(latency) = self.crd_latency_ms {
                    source = source.with_delay(Duration::from_millis(latency));
                }
                Arc::new(source)
            }
        };
        let crds = Arc::new(CrdStore::new(source));

        Ok(FixtureSources {
            sources: NavigationSources {
                permissions: Arc::new(ResourcePermissions::new(self.permissions)),
                menus: Arc::new(menus),
                pages: Arc::new(pages),
                crds: crds.clone(),
                route_table: RouteTable::builtin(),
            },
            crds,
        })
    }
}
