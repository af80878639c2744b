//! Static asset serving module
//!
//! Serves the annotation page's script, stylesheet, and favicon with MIME
//! detection and conditional-request support.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

const FAVICON_FILE: &str = "favicon.svg";

/// Serve favicon from the static directory
pub async fn serve_favicon(ctx: &RequestContext<'_>, static_dir: &str) -> Response<Full<Bytes>> {
    let path = Path::new(static_dir).join(FAVICON_FILE);
    match fs::read(&path).await {
        Ok(data) => build_asset_response(data, mime::get_content_type(Some("svg")), ctx),
        Err(_) => http::build_404_response(),
    }
}

/// Serve a static asset addressed under the static route prefix
pub async fn serve_asset(
    ctx: &RequestContext<'_>,
    static_dir: &str,
    route_prefix: &str,
) -> Response<Full<Bytes>> {
    match load_asset(static_dir, ctx.path, route_prefix).await {
        Some((content, content_type)) => build_asset_response(content, content_type, ctx),
        None => http::build_404_response(),
    }
}

/// Strip the route prefix and any traversal sequences from a request path
pub fn resolve_relative_path(path: &str, route_prefix: &str) -> String {
    let clean_path = path.trim_start_matches('/').replace("..", "");
    let prefix_clean = route_prefix.trim_matches('/');
    if prefix_clean.is_empty() {
        return clean_path;
    }
    clean_path
        .strip_prefix(&format!("{prefix_clean}/"))
        .map_or_else(|| clean_path.clone(), ToString::to_string)
}

/// Load an asset from the static directory
///
/// Canonicalizes both the directory and the resolved file and refuses any
/// path that escapes the directory.
async fn load_asset(
    static_dir: &str,
    path: &str,
    route_prefix: &str,
) -> Option<(Vec<u8>, &'static str)> {
    let relative_path = resolve_relative_path(path, route_prefix);
    if relative_path.is_empty() {
        return None;
    }
    let file_path = Path::new(static_dir).join(&relative_path);

    let static_dir_canonical = match Path::new(static_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    // File not found is a routine 404, not worth a warning
    let file_path_canonical = file_path.canonicalize().ok()?;
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!("Blocked path escape attempt: {path}"));
        return None;
    }

    let content = fs::read(&file_path_canonical).await.ok()?;
    let content_type =
        mime::get_content_type(file_path_canonical.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Build the asset response, answering 304 when the client's ETag matches
fn build_asset_response(
    content: Vec<u8>,
    content_type: &str,
    ctx: &RequestContext<'_>,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }
    http::response::build_cached_response(Bytes::from(content), content_type, &etag, ctx.is_head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_strips_route_prefix() {
        assert_eq!(
            resolve_relative_path("/static/js/annotate.js", "/static"),
            "js/annotate.js"
        );
        assert_eq!(
            resolve_relative_path("/static/css/style.css", "static"),
            "css/style.css"
        );
    }

    #[test]
    fn test_resolve_without_prefix() {
        assert_eq!(resolve_relative_path("/favicon.svg", ""), "favicon.svg");
    }

    #[test]
    fn test_resolve_removes_traversal_sequences() {
        let resolved = resolve_relative_path("/static/../../etc/passwd", "/static");
        assert!(!resolved.contains(".."));
    }
}
