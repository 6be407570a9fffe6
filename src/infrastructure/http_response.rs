// HTTP response utilities for JSON with optional Brotli encoding
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Response, StatusCode, header},
};
use serde::Serialize;
use tokio::io::AsyncReadExt;

/// True when the client's Accept-Encoding lists `br`.
pub fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').any(|enc| enc.split(';').next().map(str::trim) == Some("br")))
        .unwrap_or(false)
}

pub async fn json_response<T: Serialize>(status: StatusCode, data: &T, compress: bool) -> Result<Response<Body>, StatusCode> {
    let json = serde_json::to_vec(data).map_err(|e| {
        tracing::error!(error = %e, "JSON serialization failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let (body_bytes, content_encoding) = if compress {
        let original = json.len();
        let mut encoder = BrotliEncoder::new(std::io::Cursor::new(json));
        let mut compressed = Vec::new();
        encoder.read_to_end(&mut compressed).await.map_err(|e| {
            tracing::error!(error = %e, "Brotli compression failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        tracing::trace!(original, compressed = compressed.len(), "compressed response body");
        (compressed, Some("br"))
    } else {
        (json, None)
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, HeaderValue::from(body_bytes.len()))
        .header(header::VARY, "accept-encoding");

    if let Some(encoding) = content_encoding {
        builder = builder.header(header::CONTENT_ENCODING, encoding);
    }

    builder.body(Body::from(body_bytes)).map_err(|e| {
        tracing::error!(error = %e, "failed to build response");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
