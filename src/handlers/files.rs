//! # Handlers de Archivos
//! src/handlers/files.rs
//!
//! - `GET /files/<ruta>`: descarga (200 o 404)
//! - `POST /files/<ruta>`: subida (201 o 406)
//!
//! Los errores del `FileStore` nunca salen de acá: se traducen a status.

use crate::http::{Request, Response, StatusCode};
use crate::router::RouteContext;
use tracing::{debug, warn};

/// Texto de razón que acompaña al 406 de una subida fallida
pub const UPLOAD_ERROR_REASON: &str = "Error uploading file";

/// Handler para `GET /files/<ruta>`
pub fn files_get_handler(_req: &Request, ctx: &RouteContext<'_>) -> Response {
    match ctx.files.download(ctx.path) {
        Ok(contents) => {
            debug!(path = ctx.path, bytes = contents.len(), "file served");
            Response::new(StatusCode::Ok)
                .with_header("Content-Type", "application/octet-stream")
                .with_body_bytes(contents)
        }
        Err(e) => {
            debug!(path = ctx.path, error = %e, "file download failed");
            Response::not_found()
        }
    }
}

/// Handler para `POST /files/<ruta>`
///
/// Antes de escribir se quitan los bytes NUL de ambos extremos del body
/// (relleno de un buffer de lectura de tamaño fijo).
pub fn files_post_handler(req: &Request, ctx: &RouteContext<'_>) -> Response {
    let body = trim_nul_padding(req.body());

    match ctx.files.upload(ctx.path, body) {
        Ok(()) => {
            debug!(path = ctx.path, bytes = body.len(), "file stored");
            Response::new(StatusCode::Created)
        }
        Err(e) => {
            warn!(path = ctx.path, error = %e, "file upload failed");
            Response::new(StatusCode::NotAcceptable).with_reason(UPLOAD_ERROR_REASON)
        }
    }
}

fn trim_nul_padding(body: &[u8]) -> &[u8] {
    let start = body.iter().position(|b| *b != 0).unwrap_or(body.len());
    let end = body.iter().rposition(|b| *b != 0).map_or(start, |i| i + 1);
    &body[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FileStore;

    fn files_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(Some(dir.path().to_path_buf()))
    }

    #[test]
    fn test_trim_nul_padding() {
        assert_eq!(trim_nul_padding(b"\0\0abc\0\0\0"), b"abc");
        assert_eq!(trim_nul_padding(b"a\0b"), b"a\0b");
        assert_eq!(trim_nul_padding(b"\0\0\0"), b"");
        assert_eq!(trim_nul_padding(b""), b"");
    }

    #[test]
    fn test_files_get_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("foo.txt"), b"hello").unwrap();
        let files = files_in(&dir);

        let req = Request::parse(b"GET /files/foo.txt HTTP/1.1\r\n\r\n").unwrap();
        let response = files_get_handler(&req, &RouteContext { path: "foo.txt", files: &files });

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Content-Type"), Some("application/octet-stream"));
        assert_eq!(response.header("Content-Length"), Some("5"));
        assert_eq!(response.body(), b"hello");
    }

    #[test]
    fn test_files_get_missing() {
        let dir = tempfile::tempdir().unwrap();
        let files = files_in(&dir);

        let req = Request::parse(b"GET /files/nope HTTP/1.1\r\n\r\n").unwrap();
        let response = files_get_handler(&req, &RouteContext { path: "nope", files: &files });

        assert_eq!(response.status(), StatusCode::NotFound);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_files_post_strips_padding() {
        let dir = tempfile::tempdir().unwrap();
        let files = files_in(&dir);

        let mut raw = b"POST /files/out.txt HTTP/1.1\r\n\r\nhello".to_vec();
        raw.extend_from_slice(&[0u8; 16]);
        let req = Request::parse(&raw).unwrap();
        let response = files_post_handler(&req, &RouteContext { path: "out.txt", files: &files });

        assert_eq!(response.status(), StatusCode::Created);
        assert_eq!(response.reason(), "Created");
        assert_eq!(std::fs::read(dir.path().join("out.txt")).unwrap(), b"hello");
    }

    #[test]
    fn test_files_post_without_root() {
        let files = FileStore::new(None);

        let req = Request::parse(b"POST /files/out.txt HTTP/1.1\r\n\r\nx").unwrap();
        let response = files_post_handler(&req, &RouteContext { path: "out.txt", files: &files });

        assert_eq!(response.status(), StatusCode::NotAcceptable);
        assert_eq!(response.reason(), UPLOAD_ERROR_REASON);
    }
}
