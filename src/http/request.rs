//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Este módulo implementa un parser HTTP/1.1 desde cero, con split manual
//! (sin regex).
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /files/foo.txt HTTP/1.1\r\n
//! Host: localhost:4221\r\n
//! User-Agent: curl/8.4.0\r\n
//! \r\n
//! hello
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD TARGET VERSION`, separados por un espacio
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: bytes opacos, no se reinterpretan

use std::collections::HashMap;
use thiserror::Error;

/// Separador entre la cabecera y el body
pub(crate) const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Métodos HTTP
///
/// Cualquier token que no sea GET o POST se conserva tal cual en `Other`;
/// el router responde 404 para esos métodos.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Obtener un recurso
    GET,

    /// POST - Enviar datos a un recurso
    POST,

    /// Cualquier otro token (PUT, DELETE, HEAD...)
    Other(String),
}

impl Method {
    fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "POST" => Method::POST,
            other => Method::Other(other.to_string()),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::Other(token) => token,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado. Inmutable una vez construido.
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP (GET, POST, ...)
    method: Method,

    /// Target crudo de la request line (ej: "/echo/abc"), siempre empieza con `/`
    target: String,

    /// Versión HTTP tal como vino (ej: "HTTP/1.1")
    version: String,

    /// Headers HTTP, sensibles a mayúsculas; el último duplicado gana
    headers: HashMap<String, String>,

    /// Bytes que siguen a la línea vacía
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Request vacío (o sólo padding)
    #[error("Empty request")]
    EmptyRequest,

    /// La request line no tiene exactamente tres tokens válidos
    #[error("Malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// Header sin el separador `": "`
    #[error("Malformed header line: {0:?}")]
    MalformedHeaderLine(String),

    /// La cabecera no es UTF-8 válido
    #[error("Request head is not valid UTF-8")]
    InvalidEncoding,
}

impl Request {
    /// Parsea un request HTTP desde bytes
    ///
    /// # Retorna
    ///
    /// * `Ok(Request)` - Request parseado exitosamente
    /// * `Err(ParseError)` - Request line o headers malformados
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use minihttp::http::{Method, Request};
    ///
    /// let raw = b"GET /echo/abc HTTP/1.1\r\nHost: x\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), &Method::GET);
    /// assert_eq!(request.target(), "/echo/abc");
    /// assert_eq!(request.version(), "HTTP/1.1");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.iter().all(|b| *b == 0 || b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyRequest);
        }

        let (head, body) = split_head(buffer);
        let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidEncoding)?;

        // `split` siempre produce al menos un elemento
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default();

        let (method, target, version) = Self::parse_request_line(request_line)?;
        let headers = Self::parse_headers(lines)?;

        Ok(Request {
            method,
            target,
            version,
            headers,
            body: body.to_vec(),
        })
    }

    /// Parsea la request line (primera línea del request)
    ///
    /// Formato: `GET /path HTTP/1.1`, separado por espacios simples.
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split(' ').collect();

        let [method, target, version] = parts.as_slice() else {
            return Err(ParseError::MalformedRequestLine(line.to_string()));
        };

        if method.is_empty() || version.is_empty() || !target.starts_with('/') {
            return Err(ParseError::MalformedRequestLine(line.to_string()));
        }

        Ok((
            Method::from_token(method),
            target.to_string(),
            version.to_string(),
        ))
    }

    /// Parsea los headers HTTP hasta la primera línea vacía
    ///
    /// Cada header se divide en la primera aparición de `": "`.
    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.is_empty() {
                break;
            }

            let Some((name, value)) = line.split_once(": ") else {
                return Err(ParseError::MalformedHeaderLine(line.to_string()));
            };
            headers.insert(name.to_string(), value.to_string());
        }

        Ok(headers)
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Obtiene el target crudo del request
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico (comparación exacta)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Separa la cabecera del body en la primera línea vacía.
///
/// Sin terminador, todo el buffer se considera cabecera.
fn split_head(buffer: &[u8]) -> (&[u8], &[u8]) {
    match find_subslice(buffer, HEAD_TERMINATOR) {
        Some(pos) => (&buffer[..pos], &buffer[pos + HEAD_TERMINATOR.len()..]),
        None => (buffer, &[]),
    }
}

pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
