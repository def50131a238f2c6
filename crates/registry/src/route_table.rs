//! Static table of the built-in sidebar sections.
//!
//! Sections are listed in the order they are rendered. Each section owns its
//! route pattern, its URL and the static list of tabs it exposes.

use navtree_types::{Icon, QueryParams};
use navtree_util::build_url;

/// Route pattern shared by every custom resource list page.
pub const CRD_RESOURCES_ROUTE: &str = "/crd/:group/:name";

/// URL of the custom resource definitions overview.
pub const CRD_DEFINITIONS_URL: &str = "/crd/definitions";

/// URL of the definitions overview filtered to one API group.
pub fn crd_group_url(group: &str) -> String {
    let query = QueryParams::from([("groups".to_string(), group.to_string())]);
    build_url(CRD_DEFINITIONS_URL, &query)
}

/// Icon of a built-in section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionIcon {
    Svg(&'static str),
    Material(&'static str),
}

impl SectionIcon {
    pub fn to_icon(self) -> Icon {
        match self {
            Self::Svg(name) => Icon::Svg(name.to_string()),
            Self::Material(name) => Icon::Material(name.to_string()),
        }
    }
}

/// Decides when a built-in section is marked hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionVisibility {
    /// Never hidden.
    Always,
    /// Hidden when the resource kind is not viewable.
    Resource(&'static str),
    /// Hidden when none of the section's tabs is viewable.
    AnyTab,
}

/// A tab of a built-in section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTab {
    pub title: &'static str,
    pub route_path: &'static str,
    pub url: &'static str,
    /// Name of the page component rendered for the tab
    pub component: &'static str,
    /// Resource kind that must be viewable for the tab to be listed
    pub resource: Option<&'static str>,
}

impl SectionTab {
    const fn new(
        title: &'static str,
        route_path: &'static str,
        component: &'static str,
        resource: Option<&'static str>,
    ) -> Self {
        Self {
            title,
            route_path,
            url: route_path,
            component,
            resource,
        }
    }
}

/// A built-in sidebar section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinSection {
    /// Stable item id (e.g. "workloads")
    pub id: &'static str,
    pub title: &'static str,
    pub icon: SectionIcon,
    /// Route pattern the section's own page is mounted at
    pub route_path: &'static str,
    pub url: &'static str,
    pub visibility: SectionVisibility,
    /// Whether the selected namespaces are appended to the section's URLs
    pub namespaced: bool,
    pub tabs: Vec<SectionTab>,
    /// Whether custom resource groups are nested beneath this section
    pub expands_crds: bool,
}

fn section(
    id: &'static str,
    title: &'static str,
    icon: SectionIcon,
    path: &'static str,
    visibility: SectionVisibility,
    namespaced: bool,
    tabs: Vec<SectionTab>,
) -> BuiltinSection {
    BuiltinSection {
        id,
        title,
        icon,
        route_path: path,
        url: path,
        visibility,
        namespaced,
        tabs,
        expands_crds: false,
    }
}

/// Ordered set of built-in sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    sections: Vec<BuiltinSection>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RouteTable {
    pub fn new(sections: Vec<BuiltinSection>) -> Self {
        Self { sections }
    }

    /// The application's built-in sections in rendering order.
    pub fn builtin() -> Self {
        use SectionIcon::{Material, Svg};
        use SectionVisibility::{AnyTab, Always, Resource};

        let sections = vec![
            section("cluster", "Cluster", Svg("kube"), "/cluster", Resource("nodes"), false, vec![]),
            section("nodes", "Nodes", Svg("nodes"), "/nodes", Resource("nodes"), false, vec![]),
            section(
                "workloads",
                "Workloads",
                Svg("workloads"),
                "/workloads",
                AnyTab,
                true,
                vec![
                    SectionTab::new("Overview", "/workloads", "WorkloadsOverview", None),
                    SectionTab::new("Pods", "/pods", "Pods", Some("pods")),
                    SectionTab::new("Deployments", "/deployments", "Deployments", Some("deployments")),
                    SectionTab::new("DaemonSets", "/daemonsets", "DaemonSets", Some("daemonsets")),
                    SectionTab::new("StatefulSets", "/statefulsets", "StatefulSets", Some("statefulsets")),
                    SectionTab::new("Jobs", "/jobs", "Jobs", Some("jobs")),
                    SectionTab::new("CronJobs", "/cronjobs", "CronJobs", Some("cronjobs")),
                ],
            ),
            section(
                "config",
                "Configuration",
                Material("list"),
                "/config",
                AnyTab,
                true,
                vec![
                    SectionTab::new("ConfigMaps", "/configmaps", "ConfigMaps", Some("configmaps")),
                    SectionTab::new("Secrets", "/secrets", "Secrets", Some("secrets")),
                    SectionTab::new("Resource Quotas", "/resourcequotas", "ResourceQuotas", Some("resourcequotas")),
                    SectionTab::new("Limit Ranges", "/limitranges", "LimitRanges", Some("limitranges")),
                    SectionTab::new("HPA", "/hpa", "HorizontalPodAutoscalers", Some("horizontalpodautoscalers")),
                    SectionTab::new(
                        "Pod Disruption Budgets",
                        "/poddisruptionbudgets",
                        "PodDisruptionBudgets",
                        Some("poddisruptionbudgets"),
                    ),
                ],
            ),
            section(
                "networks",
                "Network",
                Material("device_hub"),
                "/network",
                AnyTab,
                true,
                vec![
                    SectionTab::new("Services", "/services", "Services", Some("services")),
                    SectionTab::new("Endpoints", "/endpoints", "Endpoints", Some("endpoints")),
                    SectionTab::new("Ingresses", "/ingresses", "Ingresses", Some("ingresses")),
                    SectionTab::new("Network Policies", "/network-policies", "NetworkPolicies", Some("networkpolicies")),
                ],
            ),
            section(
                "storage",
                "Storage",
                Svg("storage"),
                "/storage",
                AnyTab,
                true,
                vec![
                    SectionTab::new(
                        "Persistent Volume Claims",
                        "/persistent-volume-claims",
                        "PersistentVolumeClaims",
                        Some("persistentvolumeclaims"),
                    ),
                    SectionTab::new(
                        "Persistent Volumes",
                        "/persistent-volumes",
                        "PersistentVolumes",
                        Some("persistentvolumes"),
                    ),
                    SectionTab::new("Storage Classes", "/storage-classes", "StorageClasses", Some("storageclasses")),
                ],
            ),
            section(
                "namespaces",
                "Namespaces",
                Material("layers"),
                "/namespaces",
                Resource("namespaces"),
                false,
                vec![],
            ),
            section("events", "Events", Material("access_time"), "/events", Resource("events"), true, vec![]),
            section(
                "apps",
                "Apps",
                Material("apps"),
                "/apps",
                Always,
                true,
                vec![
                    SectionTab::new("Charts", "/apps/charts", "HelmCharts", None),
                    SectionTab::new("Releases", "/apps/releases", "HelmReleases", None),
                ],
            ),
            section(
                "users",
                "Access Control",
                Material("security"),
                "/users-management",
                Always,
                true,
                vec![
                    SectionTab::new("Service Accounts", "/service-accounts", "ServiceAccounts", Some("serviceaccounts")),
                    SectionTab::new("Roles", "/roles", "Roles", Some("roles")),
                    SectionTab::new("Role Bindings", "/role-bindings", "RoleBindings", Some("rolebindings")),
                    SectionTab::new(
                        "Pod Security Policies",
                        "/pod-security-policies",
                        "PodSecurityPolicies",
                        Some("podsecuritypolicies"),
                    ),
                ],
            ),
            BuiltinSection {
                url: CRD_DEFINITIONS_URL,
                expands_crds: true,
                ..section(
                    "custom-resources",
                    "Custom Resources",
                    Material("extension"),
                    "/crd",
                    Always,
                    false,
                    vec![SectionTab::new(
                        "Definitions",
                        CRD_DEFINITIONS_URL,
                        "CrdList",
                        Some("customresourcedefinitions"),
                    )],
                )
            },
        ];

        Self { sections }
    }

    pub fn sections(&self) -> &[BuiltinSection] {
        &self.sections
    }

    pub fn get(&self, id: &str) -> Option<&BuiltinSection> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Replaces the tab list of section `id`, keeping its position.
    pub fn with_tabs(mut self, id: &str, tabs: Vec<SectionTab>) -> Self {
        if let Some(section) = self.sections.iter_mut().find(|section| section.id == id) {
            section.tabs = tabs;
        }
        self
    }
}
