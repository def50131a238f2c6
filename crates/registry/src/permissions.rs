use std::sync::RwLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::Revision;

/// Answers whether the current user may view a resource kind.
pub trait PermissionGate: Send + Sync {
    /// `resource_kind` is the plural API resource name (e.g. "nodes").
    fn is_allowed(&self, resource_kind: &str) -> bool;
}

impl<F> PermissionGate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_allowed(&self, resource_kind: &str) -> bool {
        self(resource_kind)
    }
}

/// Declarative permission set, as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// Answer for resource kinds without an explicit entry
    #[serde(default = "default_allowed")]
    pub default_allowed: bool,
    /// Explicit answers keyed by resource kind
    #[serde(default)]
    pub resources: IndexMap<String, bool>,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            default_allowed: default_allowed(),
            resources: IndexMap::new(),
        }
    }
}

fn default_allowed() -> bool {
    true
}

/// Mutable permission set for the active cluster.
#[derive(Debug, Default)]
pub struct ResourcePermissions {
    config: RwLock<PermissionsConfig>,
    revision: Revision,
}

impl ResourcePermissions {
    pub fn new(config: PermissionsConfig) -> Self {
        Self {
            config: RwLock::new(config),
            revision: Revision::default(),
        }
    }

    /// Records an explicit answer for `resource_kind`.
    pub fn set(&self, resource_kind: impl Into<String>, allowed: bool) {
        self.config
            .write()
            .expect("permissions lock")
            .resources
            .insert(resource_kind.into(), allowed);
        self.revision.bump();
    }

    /// Replaces the whole permission set, e.g. after switching clusters.
    pub fn replace(&self, config: PermissionsConfig) {
        *self.config.write().expect("permissions lock") = config;
        self.revision.bump();
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

impl PermissionGate for ResourcePermissions {
    fn is_allowed(&self, resource_kind: &str) -> bool {
        let config = self.config.read().expect("permissions lock");
        config
            .resources
            .get(resource_kind)
            .copied()
            .unwrap_or(config.default_allowed)
    }
}
