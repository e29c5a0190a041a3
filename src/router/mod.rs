//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router que mapea (método, ruta) a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! El target se descompone en el primer segmento (la ruta, usada para el
//! despacho) y el resto (el sub-path, que recibe el handler):
//!
//! ```text
//! /files/docs/a.txt  →  ruta "/files", sub-path "docs/a.txt"
//! /echo              →  ruta "/echo",  sub-path ""
//! /                  →  ruta "/",      sub-path ""
//! ```
//!
//! La descomposición es puramente textual: sin normalizar `.`/`..` ni
//! percent-decoding. Si no hay handler, la respuesta es 404 Not Found.

use crate::files::FileStore;
use crate::handlers;
use crate::http::{Method, Request, Response};

/// Contexto que recibe cada handler además del request
#[derive(Debug, Clone, Copy)]
pub struct RouteContext<'a> {
    /// Resto del target después del primer segmento
    pub path: &'a str,

    /// Acceso a archivos bajo el directorio configurado
    pub files: &'a FileStore,
}

/// Tipo de función handler
///
/// Un handler recibe el Request y su contexto, y retorna una Response
pub type Handler = fn(&Request, &RouteContext<'_>) -> Response;

/// Router que mapea (método, ruta) a handlers
pub struct Router {
    /// Lista de (método, segmento sin `/`, handler)
    routes: Vec<(Method, String, Handler)>,

    files: FileStore,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new(files: FileStore) -> Self {
        Self {
            routes: Vec::new(),
            files,
        }
    }

    /// Crea un router con todas las rutas del servidor registradas
    pub fn with_default_routes(files: FileStore) -> Self {
        let mut router = Self::new(files);

        router.register(Method::GET, "/", handlers::root_handler);
        router.register(Method::GET, "/echo", handlers::echo_handler);
        router.register(Method::GET, "/user-agent", handlers::user_agent_handler);
        router.register(Method::GET, "/files", handlers::files_get_handler);
        router.register(Method::POST, "/files", handlers::files_post_handler);

        router
    }

    /// Registra una ruta con su handler
    ///
    /// La ruta es un único segmento (`/echo`); `/` registra la raíz.
    ///
    /// # Ejemplo
    /// ```
    /// use minihttp::files::FileStore;
    /// use minihttp::http::{Method, Request, Response, StatusCode};
    /// use minihttp::router::{RouteContext, Router};
    ///
    /// fn hello_handler(_req: &Request, _ctx: &RouteContext<'_>) -> Response {
    ///     Response::new(StatusCode::Ok).with_body("hello")
    /// }
    ///
    /// let mut router = Router::new(FileStore::default());
    /// router.register(Method::GET, "/hello", hello_handler);
    ///
    /// let request = Request::parse(b"GET /hello HTTP/1.1\r\n\r\n").unwrap();
    /// assert_eq!(router.route(&request).body(), b"hello");
    /// ```
    pub fn register(&mut self, method: Method, route: &str, handler: Handler) {
        self.routes
            .push((method, route.trim_matches('/').to_string(), handler));
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// Siempre retorna una respuesta bien formada; los errores de los
    /// handlers ya vienen traducidos a status.
    pub fn route(&self, request: &Request) -> Response {
        let (segment, path) = split_target(request.target());

        let handler = self
            .routes
            .iter()
            .find(|(method, route, _)| method == request.method() && route == segment)
            .map(|(_, _, handler)| *handler);

        let mut response = match handler {
            Some(handler) => {
                let ctx = RouteContext {
                    path,
                    files: &self.files,
                };
                handler(request, &ctx)
            }
            None => Response::not_found(),
        };

        Self::apply_content_encoding(request, &mut response);
        response
    }

    /// Anuncia gzip si el cliente lo acepta, sea cual sea el resultado
    ///
    /// El body no se comprime: sólo se agrega el header.
    fn apply_content_encoding(request: &Request, response: &mut Response) {
        let accepts_gzip = request
            .header("Accept-Encoding")
            .is_some_and(|value| value.contains("gzip"));

        if accepts_gzip {
            response.add_header("Content-Encoding", "gzip");
        }
    }
}

/// Divide el target en (primer segmento, resto)
///
/// Se quitan las barras de ambos extremos y se corta en la primera `/`.
pub fn split_target(target: &str) -> (&str, &str) {
    let trimmed = target.trim_matches('/');
    trimmed.split_once('/').unwrap_or((trimmed, ""))
}
