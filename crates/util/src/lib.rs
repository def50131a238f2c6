//! Shared helpers for the navigation tree: route-pattern matching, URL
//! building for built-in sections and extension pages, and the persisted
//! sidebar preferences.

pub mod path_processing;
pub mod preferences;
pub mod route_matching;
pub mod url_building;

pub use path_processing::expand_tilde;
pub use route_matching::{RouteMatch, RoutePattern, RoutePatternError};
pub use url_building::{
    build_extension_page_url, build_url, encode_query, extension_base_path, extension_page_route_path,
    sanitize_extension_name,
};
