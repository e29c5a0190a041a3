//! # Handlers Básicos
//! src/handlers/basic.rs
//!
//! - `GET /`: sonda, 200 sin body
//! - `GET /echo/<texto>`: devuelve el sub-path como texto plano
//! - `GET /user-agent`: devuelve el header `User-Agent`

use crate::http::{Request, Response, StatusCode};
use crate::router::RouteContext;

/// Handler para `GET /`
pub fn root_handler(_req: &Request, _ctx: &RouteContext<'_>) -> Response {
    Response::new(StatusCode::Ok)
}

/// Handler para `GET /echo/<texto>`
///
/// El sub-path se devuelve tal cual: sin percent-decoding ni normalización.
///
/// # Ejemplo de response
/// ```text
/// HTTP/1.1 200 OK
/// Content-Type: text/plain
/// Content-Length: 3
///
/// abc
/// ```
pub fn echo_handler(_req: &Request, ctx: &RouteContext<'_>) -> Response {
    Response::new(StatusCode::Ok)
        .with_header("Content-Type", "text/plain")
        .with_body(ctx.path)
}

/// Handler para `GET /user-agent`
///
/// Sin header `User-Agent` responde 200 con body vacío.
pub fn user_agent_handler(req: &Request, _ctx: &RouteContext<'_>) -> Response {
    let user_agent = req.header("User-Agent").unwrap_or_default();

    Response::new(StatusCode::Ok)
        .with_header("Content-Type", "text/plain")
        .with_body(user_agent)
}
