//! Endpoint id normalization shared by the middleware and introspection.

/// API version prefix stripped before policy lookup.
pub const API_PREFIX: &str = "/api/v1";

/// Normalize a request path into an endpoint id: strip the `/api/v1` prefix
/// (only on a segment boundary) and ensure a single leading slash.
pub fn normalize_endpoint_path(path: &str) -> String {
    let rest = match path.strip_prefix(API_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };
    let trimmed = rest.trim_start_matches('/');
    format!("/{trimmed}")
}
