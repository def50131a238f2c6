use navtree_types::QueryParams;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::form_urlencoded;

/// Bytes escaped inside a single path segment.
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'*')
    .add(b'/')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Encodes query parameters as `application/x-www-form-urlencoded`, keeping
/// insertion order.
pub fn encode_query(query: &QueryParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in query {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Appends `query` to `path`, joining with `&` when `path` already carries a
/// query string.
pub fn build_url(path: &str, query: &QueryParams) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{}", encode_query(query))
}

/// Normalizes an extension identifier for use in a URL path.
///
/// The scope marker of a scoped package name is dropped and its separator
/// becomes a dash: `@acme/metrics` → `acme-metrics`.
pub fn sanitize_extension_name(extension_id: &str) -> String {
    extension_id.replacen('@', "", 1).replacen('/', "-", 1)
}

/// Base path under which all pages of an extension are mounted.
pub fn extension_base_path(extension_id: &str) -> String {
    format!("/extension/{}", sanitize_extension_name(extension_id))
}

/// Route path of an extension page: the extension base path, followed by the
/// page id when the page is not the extension's default page.
pub fn extension_page_route_path(extension_id: &str, page_id: Option<&str>) -> String {
    let base = extension_base_path(extension_id);
    match page_id.filter(|page_id| !page_id.is_empty()) {
        Some(page_id) => format!("{base}/{}", utf8_percent_encode(page_id, SEGMENT_ENCODE_SET)),
        None => base,
    }
}

/// Builds the URL of an extension page with `params` encoded as its query.
///
/// # Examples
/// ```ignore
/// let mut params = QueryParams::new();
/// params.insert("node".into(), "worker-1".into());
/// let url = build_extension_page_url("@acme/metrics", Some("cpu"), &params);
/// assert_eq!(url, "/extension/acme-metrics/cpu?node=worker-1");
/// ```
pub fn build_extension_page_url(extension_id: &str, page_id: Option<&str>, params: &QueryParams) -> String {
    build_url(&extension_page_route_path(extension_id, page_id), params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn build_url_without_query_returns_path() {
        assert_eq!(build_url("/workloads", &QueryParams::new()), "/workloads");
    }

    #[test]
    fn build_url_encodes_query_in_insertion_order() {
        let url = build_url("/events", &query(&[("namespaces", "default,kube-system"), ("sort", "age")]));
        assert_eq!(url, "/events?namespaces=default%2Ckube-system&sort=age");
    }

    #[test]
    fn build_url_extends_existing_query() {
        let url = build_url("/crd/definitions?groups=acme.io", &query(&[("namespaces", "default")]));
        assert_eq!(url, "/crd/definitions?groups=acme.io&namespaces=default");
    }

    #[test]
    fn sanitizes_scoped_extension_names() {
        assert_eq!(sanitize_extension_name("@acme/metrics"), "acme-metrics");
        assert_eq!(sanitize_extension_name("plain-extension"), "plain-extension");
    }

    #[test]
    fn extension_page_url_includes_page_and_params() {
        let url = build_extension_page_url("@acme/metrics", Some("cpu usage"), &query(&[("node", "worker-1")]));
        assert_eq!(url, "/extension/acme-metrics/cpu%20usage?node=worker-1");
    }

    #[test]
    fn route_syntax_in_page_ids_is_escaped() {
        assert_eq!(extension_page_route_path("ext", Some(":id")), "/extension/ext/%3Aid");
        assert_eq!(extension_page_route_path("ext", Some("*")), "/extension/ext/%2A");

        let pattern = crate::RoutePattern::new(&extension_page_route_path("ext", Some(":id")), true).expect("compile");
        assert!(pattern.is_match("/extension/ext/%3Aid"));
        assert!(!pattern.is_match("/extension/ext/anything"));
    }

    #[test]
    fn default_extension_page_has_no_page_segment() {
        assert_eq!(build_extension_page_url("@acme/metrics", None, &QueryParams::new()), "/extension/acme-metrics");
        assert_eq!(extension_page_route_path("@acme/metrics", Some("")), "/extension/acme-metrics");
    }
}
