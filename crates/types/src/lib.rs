use std::{any::Any, fmt, sync::Arc};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Ordered query parameters appended to a URL (`?key=value&...`).
pub type QueryParams = IndexMap<String, String>;

/// An opaque renderable capability supplied by an extension.
///
/// The navigation tree never inspects the wrapped value; it only forwards it
/// to the rendering layer. Two handles are equal when they point at the same
/// allocation, so forwarding the same registration twice yields equal trees.
#[derive(Clone)]
pub struct OpaqueHandle(Arc<dyn Any + Send + Sync>);

impl OpaqueHandle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Returns the wrapped value when it is of type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl PartialEq for OpaqueHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for OpaqueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OpaqueHandle(..)")
    }
}

impl Serialize for OpaqueHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("<opaque>")
    }
}

/// Icon attached to a navigation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    /// Named SVG asset bundled with the application (e.g. "kube").
    Svg(String),
    /// Material icon ligature (e.g. "layers").
    Material(String),
    /// Renderer contributed by an extension.
    #[serde(skip_deserializing)]
    Custom(OpaqueHandle),
}

/// Reference to the page component a tab renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentRef {
    /// A built-in component identified by name (e.g. "Pods", "CrdList").
    Named(String),
    /// A component contributed by an extension.
    #[serde(skip_deserializing)]
    Custom(OpaqueHandle),
}

impl ComponentRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

/// A sub-page descriptor nested under a [`NavItem`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabRoute {
    /// Display title of the tab
    pub title: String,
    /// URL navigated to when the tab is selected
    pub url: String,
    /// Route pattern used to decide whether the tab is active
    pub route_path: String,
    /// Component rendered for the tab
    pub component: ComponentRef,
    /// Whether `route_path` must match the whole location path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact: Option<bool>,
}

/// One renderable entry of the navigation tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    /// Stable identifier; identical inputs always produce identical ids
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    pub is_active: bool,
    /// Marks the entry as not viewable. Hidden entries stay in the tree.
    pub is_hidden: bool,
    /// Ordered sub-tabs of this entry
    pub sub_menus: Vec<TabRoute>,
    /// Nested entries rendered beneath this one (custom resource groups)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavChild>,
}

/// A nested entry: either a full item or the placeholder shown while the
/// custom resource catalog is loading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavChild {
    Item(NavItem),
    LoadingPlaceholder,
}

/// Addresses an extension page from a menu registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTarget {
    /// Identifier of the extension owning the page (e.g. "@acme/metrics")
    pub extension_id: String,
    /// Page identifier inside the extension; `None` addresses its default page
    #[serde(default)]
    pub page_id: Option<String>,
    /// Parameters encoded into the page URL
    #[serde(default)]
    pub params: QueryParams,
}

/// A menu entry contributed by an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuRegistration {
    /// Identifier of the contributing extension
    pub extension_id: String,
    /// Menu identifier. Registrations without one are never rendered as
    /// top-level entries and cannot own sub items.
    #[serde(default)]
    pub id: Option<String>,
    /// Identifier of the parent menu for sub items
    #[serde(default)]
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub icon: Option<Icon>,
    pub target: PageTarget,
}

impl MenuRegistration {
    /// Returns the menu id when present and non-empty.
    pub fn menu_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A page contributed by an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRegistration {
    pub extension_id: String,
    #[serde(default)]
    pub page_id: Option<String>,
    /// Route pattern the page is mounted at. Registries fill in the
    /// extension page path when left empty.
    #[serde(default)]
    pub route_path: String,
    #[serde(default)]
    pub exact: bool,
    /// Component rendered for the page
    pub component: ComponentRef,
}

/// A custom resource definition as discovered from the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrdDescriptor {
    /// API group (e.g. "cert-manager.io")
    pub group: String,
    /// Resource kind (e.g. "Certificate")
    pub kind: String,
    /// Plural resource name (e.g. "certificates")
    pub plural: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl CrdDescriptor {
    pub fn resource_kind(&self) -> &str {
        &self.kind
    }

    /// Canonical list URL of the resources of this definition.
    pub fn resource_url(&self) -> String {
        format!("/crd/{}/{}", self.group, self.plural)
    }
}
