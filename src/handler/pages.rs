//! Page handler module
//!
//! Serves the annotation page from the template directory. The rendered
//! page is cached in `AppState` after the first successful read; a missing
//! template surfaces as a server error.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, response};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

const INDEX_TEMPLATE: &str = "index.html";

/// Serve the annotation page
pub async fn serve_index(
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    {
        let cache = state.page_cache.read().await;
        if let Some(html) = cache.as_ref() {
            return response::build_html_response(html.clone(), &state.config.http, ctx.is_head);
        }
    }

    let template_path = Path::new(&state.config.app.template_dir).join(INDEX_TEMPLATE);
    match fs::read_to_string(&template_path).await {
        Ok(html) => {
            {
                let mut cache = state.page_cache.write().await;
                *cache = Some(html.clone());
            }
            response::build_html_response(html, &state.config.http, ctx.is_head)
        }
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read template '{}': {e}",
                template_path.display()
            ));
            http::build_500_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state(template_dir: &str) -> Arc<AppState> {
        let mut cfg = Config::load_from("no-such-config-file").expect("defaults should parse");
        cfg.app.template_dir = template_dir.to_string();
        Arc::new(AppState::new(&cfg))
    }

    fn ctx() -> RequestContext<'static> {
        RequestContext {
            path: "/",
            is_head: false,
            if_none_match: None,
        }
    }

    #[tokio::test]
    async fn test_missing_template_is_server_error() {
        let state = test_state("/no-such-template-dir");
        let resp = serve_index(&ctx(), &state).await;
        assert_eq!(resp.status(), 500);
    }

    #[tokio::test]
    async fn test_template_served_and_cached() {
        let dir = std::env::temp_dir().join(format!("annotation-pages-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(INDEX_TEMPLATE), "<html><body>annotate</body></html>").unwrap();

        let state = test_state(dir.to_str().unwrap());
        let resp = serve_index(&ctx(), &state).await;
        assert_eq!(resp.status(), 200);
        assert!(state.page_cache.read().await.is_some());

        // Second request is served from the cache even if the file vanishes
        std::fs::remove_file(dir.join(INDEX_TEMPLATE)).unwrap();
        let resp = serve_index(&ctx(), &state).await;
        assert_eq!(resp.status(), 200);

        std::fs::remove_dir_all(&dir).ok();
    }
}
