//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, body-size
//! precheck, route dispatch, and access-log emission.

use crate::annotation;
use crate::config::AppState;
use crate::handler::{pages, static_files};
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Path accepting annotation payloads
const SAVE_ANNOTATION_PATH: &str = "/save_annotation";
/// URL prefix under which static assets are exposed
const STATIC_ROUTE_PREFIX: &str = "/static";

/// Request context for read-only routes
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    // Captured up front; dispatch consumes the request
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let http_version = version_label(req.version());
    let referer = header_value(&req, "referer");
    let user_agent = header_value(&req, "user-agent");

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let response = dispatch(req, &state).await;

    if state.config.logging.access_log {
        let mut entry =
            logger::AccessLogEntry::new(peer_addr.ip().to_string(), method.to_string(), path);
        entry.query = query;
        entry.http_version = http_version.to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response_body_bytes(&response);
        entry.referer = referer;
        entry.user_agent = user_agent;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch a request to its handler
async fn dispatch(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let method = req.method().clone();

    if method == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return resp;
    }

    if method == Method::POST {
        if req.uri().path() == SAVE_ANNOTATION_PATH {
            return annotation::handle_save_annotation(req).await;
        }
        return http::build_404_response();
    }

    if method != Method::GET && method != Method::HEAD {
        logger::log_warning(&format!("Method not allowed: {method}"));
        return http::build_405_response();
    }

    let path = req.uri().path().to_string();
    let ctx = RequestContext {
        path: &path,
        is_head: method == Method::HEAD,
        if_none_match: header_value(&req, "if-none-match"),
    };

    route_get(&ctx, state).await
}

/// Route a GET/HEAD request based on path
async fn route_get(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let routes = &state.config.routes;

    // Health probes answer before any filesystem access
    if routes.health.enabled
        && (ctx.path == routes.health.liveness_path || ctx.path == routes.health.readiness_path)
    {
        return http::build_health_response("ok");
    }

    if ctx.path == "/" {
        return pages::serve_index(ctx, state).await;
    }

    if routes.favicon_paths.iter().any(|p| ctx.path == p) {
        return static_files::serve_favicon(ctx, &state.config.app.static_dir).await;
    }

    if let Some(rest) = ctx.path.strip_prefix(STATIC_ROUTE_PREFIX) {
        if rest.starts_with('/') {
            return static_files::serve_asset(
                ctx,
                &state.config.app.static_dir,
                STATIC_ROUTE_PREFIX,
            )
            .await;
        }
    }

    http::build_404_response()
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Map the wire version to its access-log label
fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

/// Fetch a request header as an owned string
fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Exact body size of an outgoing response
fn response_body_bytes(response: &Response<Full<Bytes>>) -> usize {
    use hyper::body::Body;
    usize::try_from(response.body().size_hint().exact().unwrap_or(0)).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_content_length(value: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri(SAVE_ANNOTATION_PATH)
            .header("content-length", value)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_body_size_within_limit() {
        let req = request_with_content_length("1024");
        assert!(check_body_size(&req, 10_485_760).is_none());
    }

    #[test]
    fn test_body_size_exceeded() {
        let req = request_with_content_length("20971520");
        let resp = check_body_size(&req, 10_485_760).expect("should reject");
        assert_eq!(resp.status(), 413);
    }

    #[test]
    fn test_invalid_content_length_skips_check() {
        let req = request_with_content_length("not-a-number");
        assert!(check_body_size(&req, 10_485_760).is_none());
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(hyper::Version::HTTP_10), "1.0");
        assert_eq!(version_label(hyper::Version::HTTP_11), "1.1");
        assert_eq!(version_label(hyper::Version::HTTP_2), "2");
    }

    #[test]
    fn test_response_body_bytes() {
        let resp = Response::new(Full::new(Bytes::from("hello")));
        assert_eq!(response_body_bytes(&resp), 5);
    }
}
