//! Registries consumed by the navigation tree.
//!
//! This crate defines the collaborator seams the tree builder queries
//! (permissions, extension menus and pages, the custom resource catalog)
//! together with in-memory implementations, and the static table of
//! built-in sections.

pub mod crds;
pub mod menus;
pub mod pages;
pub mod permissions;
pub mod revision;
pub mod route_table;

pub use crds::{CrdCatalog, CrdLoadError, CrdSource, CrdStore, FileCrdSource, StaticCrdSource};
pub use menus::{ClusterPageMenuRegistry, MenuRegistry};
pub use pages::{ClusterPageRegistry, PageRegistry, RegistryError};
pub use permissions::{PermissionGate, PermissionsConfig, ResourcePermissions};
pub use revision::Revision;
pub use route_table::{
    BuiltinSection, CRD_DEFINITIONS_URL, CRD_RESOURCES_ROUTE, RouteTable, SectionIcon, SectionTab, SectionVisibility,
    crd_group_url,
};
