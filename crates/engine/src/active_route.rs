use navtree_types::TabRoute;
use navtree_util::RoutePattern;
use tracing::warn;

/// A route pattern an entry is considered active for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteCandidate<'a> {
    pub path: &'a str,
    pub exact: bool,
}

impl<'a> RouteCandidate<'a> {
    /// Matches `path` and every location beneath it.
    pub fn prefix(path: &'a str) -> Self {
        Self { path, exact: false }
    }

    /// Matches `path` only.
    pub fn exact(path: &'a str) -> Self {
        Self { path, exact: true }
    }
}

impl<'a> From<&'a TabRoute> for RouteCandidate<'a> {
    fn from(tab: &'a TabRoute) -> Self {
        Self {
            path: &tab.route_path,
            exact: tab.exact.unwrap_or(false),
        }
    }
}

/// One pattern, or a set of patterns any of which activates the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveRoute<'a> {
    Single(RouteCandidate<'a>),
    AnyOf(Vec<RouteCandidate<'a>>),
}

impl<'a> From<RouteCandidate<'a>> for ActiveRoute<'a> {
    fn from(candidate: RouteCandidate<'a>) -> Self {
        Self::Single(candidate)
    }
}

impl<'a> From<&'a [TabRoute]> for ActiveRoute<'a> {
    fn from(tabs: &'a [TabRoute]) -> Self {
        Self::AnyOf(tabs.iter().map(RouteCandidate::from).collect())
    }
}

/// Decides which entries are selected for the current location.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveRouteResolver;

impl ActiveRouteResolver {
    /// Returns whether `current_path` matches `route`.
    ///
    /// Patterns that fail to compile never match.
    pub fn is_active<'a>(current_path: &str, route: impl Into<ActiveRoute<'a>>) -> bool {
        match route.into() {
            ActiveRoute::Single(candidate) => Self::matches(current_path, candidate),
            ActiveRoute::AnyOf(candidates) => candidates
                .into_iter()
                .any(|candidate| Self::matches(current_path, candidate)),
        }
    }

    fn matches(current_path: &str, candidate: RouteCandidate<'_>) -> bool {
        match RoutePattern::new(candidate.path, candidate.exact) {
            Ok(pattern) => pattern.is_match(current_path),
            Err(error) => {
                warn!(route_path = %candidate.path, error = %error, "ignoring invalid route pattern");
                false
            }
        }
    }
}
