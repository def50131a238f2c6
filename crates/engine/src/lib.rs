//! # Navtree Engine
//!
//! The engine composes the sidebar navigation tree. Every recompute rebuilds
//! the whole tree from its inputs: the built-in sections, the menus and pages
//! contributed by extensions, the custom resource catalog, the permission set
//! and the current location.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use navtree_engine::{NavigationSources, NavigationTreeBuilder};
//! use navtree_registry::*;
//!
//! let sources = NavigationSources {
//!     permissions: Arc::new(ResourcePermissions::default()),
//!     menus: Arc::new(ClusterPageMenuRegistry::new()),
//!     pages: Arc::new(ClusterPageRegistry::new()),
//!     crds: Arc::new(CrdStore::new(Arc::new(StaticCrdSource::default()))),
//!     route_table: RouteTable::builtin(),
//! };
//! let builder = NavigationTreeBuilder::new(sources);
//! for item in builder.build("/pods", &Default::default()) {
//!     println!("{} active={} hidden={}", item.title, item.is_active, item.is_hidden);
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`active_route`**: decides whether route patterns match the location
//! - **`tab_routes`**: turns menu children, section tabs and CRD groups into tabs
//! - **`crd_groups`**: nests custom resource groups under their section
//! - **`tree_builder`**: merges built-in and extension entries in order
//! - **`sidebar`**: recomputes the tree whenever an observed input changes

pub mod active_route;
pub mod crd_groups;
pub mod sidebar;
pub mod tab_routes;
pub mod tree_builder;

pub use active_route::{ActiveRoute, ActiveRouteResolver, RouteCandidate};
pub use crd_groups::expand_crd_groups;
pub use sidebar::{Sidebar, namespace_query};
pub use tab_routes::TabRouteBuilder;
pub use tree_builder::{CRD_PERMISSION, NavigationSources, NavigationTreeBuilder, extension_item_id};
