//! Annotation endpoint module
//!
//! Handles `POST /save_annotation`. The payload is parsed as arbitrary JSON
//! and acknowledged with a fixed success object; nothing is stored.

mod response;

pub use response::{bad_request, json_response};

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;

use crate::logger;

/// Fixed acknowledgment returned for every accepted annotation payload
#[derive(Debug, Serialize)]
pub struct SaveAnnotationAck {
    pub success: bool,
    pub message: &'static str,
}

impl SaveAnnotationAck {
    pub const fn saved() -> Self {
        Self {
            success: true,
            message: "Annotation saved",
        }
    }
}

/// Accept an annotation payload and acknowledge it
///
/// The body must be valid JSON; its shape is not constrained and its
/// contents are discarded.
// TODO: persist payloads under app.upload_dir once the annotation storage
// format is settled
pub async fn handle_save_annotation(
    req: Request<hyper::body::Incoming>,
) -> Response<Full<Bytes>> {
    let whole_body = if let Ok(collected) = req.collect().await {
        collected.to_bytes()
    } else {
        logger::log_warning("Failed to read annotation request body");
        return bad_request("Failed to read request body");
    };

    if let Err(e) = serde_json::from_slice::<serde_json::Value>(&whole_body) {
        logger::log_warning(&format!("Rejected annotation payload: {e}"));
        return bad_request(&format!("Invalid JSON: {e}"));
    }

    json_response(StatusCode::OK, &SaveAnnotationAck::saved())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_serializes_to_fixed_body() {
        let json = serde_json::to_string(&SaveAnnotationAck::saved()).unwrap();
        assert_eq!(json, r#"{"success":true,"message":"Annotation saved"}"#);
    }

    #[tokio::test]
    async fn test_json_response_body_and_headers() {
        let resp = json_response(StatusCode::OK, &SaveAnnotationAck::saved());
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "application/json"
        );

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"success":true,"message":"Annotation saved"}"#);
    }

    #[tokio::test]
    async fn test_bad_request_shape() {
        let resp = bad_request("Invalid JSON: expected value");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON"));
    }
}
