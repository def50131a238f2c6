//! Custom resource definition catalog.
//!
//! The catalog is loaded in the background at most once. While the load is
//! outstanding `is_loading()` is true; consumers render a placeholder and
//! recompute when the catalog revision changes.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use indexmap::IndexMap;
use navtree_types::CrdDescriptor;
use thiserror::Error;
use tokio::{runtime::Handle, sync::watch};
use tracing::{debug, info, warn};

use crate::Revision;

/// Error surfaced when the definitions cannot be listed.
#[derive(Debug, Error)]
pub enum CrdLoadError {
    #[error("failed to read custom resource definitions: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse custom resource definitions: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("custom resource definitions unavailable: {0}")]
    Unavailable(String),
}

/// Observable catalog of custom resource definitions grouped by API group.
pub trait CrdCatalog: Send + Sync {
    fn is_loading(&self) -> bool;
    fn is_loaded(&self) -> bool;
    /// Definitions keyed by API group, in catalog order.
    fn groups(&self) -> IndexMap<String, Vec<CrdDescriptor>>;
    /// Starts a background load unless one is running or has completed.
    fn load_all(&self);
}

/// Asynchronous source the catalog lists definitions from.
#[async_trait]
pub trait CrdSource: Send + Sync {
    async fn list(&self) -> Result<Vec<CrdDescriptor>, CrdLoadError>;
}

/// Source returning a fixed list, optionally after a delay.
#[derive(Debug, Clone, Default)]
pub struct StaticCrdSource {
    items: Vec<CrdDescriptor>,
    delay: Option<Duration>,
}

impl StaticCrdSource {
    pub fn new(items: Vec<CrdDescriptor>) -> Self {
        Self { items, delay: None }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl CrdSource for StaticCrdSource {
    async fn list(&self) -> Result<Vec<CrdDescriptor>, CrdLoadError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.items.clone())
    }
}

/// Source reading a JSON array of definitions from disk.
#[derive(Debug, Clone)]
pub struct FileCrdSource {
    path: PathBuf,
}

impl FileCrdSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CrdSource for FileCrdSource {
    async fn list(&self) -> Result<Vec<CrdDescriptor>, CrdLoadError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[derive(Debug, Default)]
struct CrdState {
    loading: bool,
    loaded: bool,
    items: Vec<CrdDescriptor>,
}

/// Catalog backed by a [`CrdSource`].
#[derive(Clone)]
pub struct CrdStore {
    source: Arc<dyn CrdSource>,
    state: Arc<Mutex<CrdState>>,
    revision: Arc<Revision>,
}

impl std::fmt::Debug for CrdStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrdStore")
            .field("state", &self.state)
            .field("revision", &self.revision.current())
            .finish()
    }
}

impl CrdStore {
    pub fn new(source: Arc<dyn CrdSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(CrdState::default())),
            revision: Arc::new(Revision::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Loads the definitions and waits for the result.
    ///
    /// Returns `Ok(false)` without touching the source when a load is already
    /// running or has completed.
    pub async fn load(&self) -> Result<bool, CrdLoadError> {
        if !self.begin_load() {
            return Ok(false);
        }
        self.run_load().await.map(|_| true)
    }

    /// Waits until no load is outstanding.
    pub async fn settled(&self) {
        let mut receiver = self.subscribe();
        while self.is_loading() {
            if receiver.changed().await.is_err() {
                break;
            }
        }
    }

    fn begin_load(&self) -> bool {
        {
            let mut state = self.state.lock().expect("crd state lock");
            if state.loading || state.loaded {
                return false;
            }
            state.loading = true;
        }
        self.revision.bump();
        true
    }

    async fn run_load(&self) -> Result<(), CrdLoadError> {
        debug!("custom resource definitions load started");
        let result = self.source.list().await;
        {
            let mut state = self.state.lock().expect("crd state lock");
            state.loading = false;
            if let Ok(items) = &result {
                let mut items = items.clone();
                items.sort_by(|a, b| a.group.cmp(&b.group).then_with(|| a.kind.cmp(&b.kind)));
                state.items = items;
                state.loaded = true;
            }
        }
        self.revision.bump();
        match result {
            Ok(items) => {
                info!(count = items.len(), "custom resource definitions loaded");
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "custom resource definitions load failed");
                Err(error)
            }
        }
    }
}

impl CrdCatalog for CrdStore {
    fn is_loading(&self) -> bool {
        self.state.lock().expect("crd state lock").loading
    }

    fn is_loaded(&self) -> bool {
        self.state.lock().expect("crd state lock").loaded
    }

    fn groups(&self) -> IndexMap<String, Vec<CrdDescriptor>> {
        let state = self.state.lock().expect("crd state lock");
        let mut groups: IndexMap<String, Vec<CrdDescriptor>> = IndexMap::new();
        for crd in &state.items {
            groups.entry(crd.group.clone()).or_default().push(crd.clone());
        }
        groups
    }

    fn load_all(&self) {
        let Ok(handle) = Handle::try_current() else {
            warn!("no async runtime available; custom resource definitions not loaded");
            return;
        };
        if !self.begin_load() {
            return;
        }
        let store = self.clone();
        handle.spawn(async move {
            // Failures are logged by run_load and leave the catalog unloaded.
            let _ = store.run_load().await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crd(group: &str, kind: &str) -> CrdDescriptor {
        CrdDescriptor {
            group: group.into(),
            kind: kind.into(),
            plural: format!("{}s", kind.to_lowercase()),
            version: None,
        }
    }

    struct FailingSource;

    #[async_trait]
    impl CrdSource for FailingSource {
        async fn list(&self) -> Result<Vec<CrdDescriptor>, CrdLoadError> {
            Err(CrdLoadError::Unavailable("forbidden".into()))
        }
    }

    #[tokio::test]
    async fn load_groups_definitions_in_sorted_order() {
        let store = CrdStore::new(Arc::new(StaticCrdSource::new(vec![
            crd("monitoring.coreos.com", "ServiceMonitor"),
            crd("cert-manager.io", "Issuer"),
            crd("cert-manager.io", "Certificate"),
        ])));
        assert!(store.load().await.expect("load"));
        assert!(store.is_loaded());
        assert!(!store.is_loading());

        let groups = store.groups();
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec!["cert-manager.io", "monitoring.coreos.com"]);
        let kinds: Vec<_> = groups["cert-manager.io"].iter().map(|crd| crd.kind.clone()).collect();
        assert_eq!(kinds, vec!["Certificate", "Issuer"]);
    }

    #[tokio::test]
    async fn second_load_is_a_no_op() {
        let store = CrdStore::new(Arc::new(StaticCrdSource::new(vec![crd("a.io", "Widget")])));
        assert!(store.load().await.expect("first load"));
        assert!(!store.load().await.expect("second load"));
    }

    #[tokio::test]
    async fn load_all_runs_in_background() {
        let source = StaticCrdSource::new(vec![crd("a.io", "Widget")]).with_delay(Duration::from_millis(20));
        let store = CrdStore::new(Arc::new(source));
        store.load_all();
        assert!(store.is_loading());
        store.load_all();
        store.settled().await;
        assert!(store.is_loaded());
        assert_eq!(store.groups().len(), 1);
    }

    #[tokio::test]
    async fn failed_load_leaves_catalog_unloaded() {
        let store = CrdStore::new(Arc::new(FailingSource));
        assert!(store.load().await.is_err());
        assert!(!store.is_loaded());
        assert!(!store.is_loading());
        assert!(store.groups().is_empty());
    }

    #[test]
    fn load_all_without_runtime_does_nothing() {
        let store = CrdStore::new(Arc::new(StaticCrdSource::default()));
        store.load_all();
        assert!(!store.is_loading());
        assert!(!store.is_loaded());
    }

    #[tokio::test]
    async fn file_source_reads_json_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("crds.json");
        tokio::fs::write(&path, r#"[{"group":"a.io","kind":"Widget","plural":"widgets"}]"#)
            .await
            .expect("write");
        let items = FileCrdSource::new(&path).list().await.expect("list");
        assert_eq!(items, vec![crd("a.io", "Widget")]);
    }
}
