//! Static asset serving
//!
//! The page bundled into the binary is answered from an in-memory map. An
//! asset directory given on the command line is served by `ServeDir`. Either
//! way, a failed lookup is answered with `404 Not found`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, any};
use lazy_static::lazy_static;
use tower_http::services::ServeDir;
use tower_http::set_status::SetStatus;
use tracing::debug;

use crate::error::AssetError;

lazy_static! {
    // file name -> (content type, body)
    static ref EMBEDDED: HashMap<&'static str, (&'static str, &'static [u8])> = {
        let mut m: HashMap<&'static str, (&'static str, &'static [u8])> = HashMap::new();
        m.insert(
            "index.html",
            ("text/html; charset=utf-8", include_bytes!("./static/index.html")),
        );
        m.insert(
            "app.js",
            ("text/javascript; charset=utf-8", include_bytes!("./static/app.js")),
        );
        m.insert(
            "style.css",
            ("text/css; charset=utf-8", include_bytes!("./static/style.css")),
        );
        m
    };
}

/// Where the fallback route reads assets from
#[derive(Debug, Clone)]
pub enum AssetStore {
    /// The page bundled into the binary
    Embedded,
    /// Files below a root directory
    Directory(PathBuf),
}

/// A bundled asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub name: &'static str,
    pub content_type: &'static str,
    pub body: &'static [u8],
}

/// Look up a bundled asset by request path
///
/// # Arguments
/// * `method` - Only `GET` and `HEAD` are served
/// * `path` - Request path, e.g. `/` or `/app.js`
pub fn embedded(method: &Method, path: &str) -> Result<Asset, AssetError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(AssetError::MethodNotAllowed(method.to_string()));
    }

    let name = match path.trim_start_matches('/') {
        "" => "index.html",
        name => name,
    };
    let (name, (content_type, body)) = EMBEDDED
        .get_key_value(name)
        .ok_or_else(|| AssetError::NotFound(path.to_string()))?;

    Ok(Asset {
        name,
        content_type,
        body,
    })
}

/// The response sent for every failed lookup
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Fallback handler answering from the bundled page
pub async fn serve_embedded(method: Method, uri: Uri) -> Response {
    match embedded(&method, uri.path()) {
        Ok(asset) => {
            let body: &'static [u8] = if method == Method::HEAD { &[] } else { asset.body };
            ([(header::CONTENT_TYPE, asset.content_type)], body).into_response()
        }
        Err(e) => {
            debug!(path = uri.path(), "asset lookup failed: {}", e);
            not_found()
        }
    }
}

/// Service answering from files below `root`
///
/// Directories resolve to their `index.html`. Missing files, paths escaping
/// the root and methods other than `GET`/`HEAD` all get `404 Not found`.
pub fn serve_dir(root: &Path) -> ServeDir<SetStatus<MethodRouter>> {
    ServeDir::new(root)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(any(|| async { not_found() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn dir_request(root: &Path, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = serve_dir(root).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(Body::new(response.into_body()), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[test]
    fn test_embedded_index() {
        let asset = embedded(&Method::GET, "/").unwrap();

        assert_eq!(asset.name, "index.html");
        assert_eq!(asset.content_type, "text/html; charset=utf-8");
        assert!(String::from_utf8_lossy(asset.body).contains("Upload Patient Data"));
    }

    #[test]
    fn test_embedded_script_and_style() {
        let script = embedded(&Method::HEAD, "/app.js").unwrap();
        assert_eq!(script.content_type, "text/javascript; charset=utf-8");

        let style = embedded(&Method::GET, "/style.css").unwrap();
        assert_eq!(style.content_type, "text/css; charset=utf-8");
    }

    #[test]
    fn test_embedded_missing() {
        assert!(matches!(
            embedded(&Method::GET, "/favicon.ico"),
            Err(AssetError::NotFound(_))
        ));
        assert!(matches!(
            embedded(&Method::GET, "/../index.html"),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn test_post_is_rejected() {
        assert!(matches!(
            embedded(&Method::POST, "/"),
            Err(AssetError::MethodNotAllowed(_))
        ));
    }

    #[tokio::test]
    async fn test_serve_embedded_head_has_no_body() {
        let response = serve_embedded(Method::HEAD, Uri::from_static("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_serve_embedded_not_found_body() {
        let response = serve_embedded(Method::GET, Uri::from_static("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Not found");
    }

    #[tokio::test]
    async fn test_directory_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>x</h1>").unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "<p>docs</p>").unwrap();

        let (status, body) = dir_request(dir.path(), Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<h1>x</h1>");

        let (status, body) = dir_request(dir.path(), Method::GET, "/docs/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<p>docs</p>");
    }

    #[tokio::test]
    async fn test_directory_failures_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>x</h1>").unwrap();

        for (method, uri) in [
            (Method::GET, "/missing.png"),
            (Method::GET, "/../Cargo.toml"),
            (Method::DELETE, "/index.html"),
        ] {
            let (status, body) = dir_request(dir.path(), method, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, b"Not found");
        }
    }
}
