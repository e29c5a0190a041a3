//! # Construcción de Respuestas HTTP
//!
//! Este módulo proporciona una API para construir respuestas HTTP/1.1
//! de forma programática y convertirlas a bytes para enviar al cliente.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 3\r\n
//! \r\n
//! abc
//! ```
//!
//! El body se escribe tal cual, sin `\r\n` final. El builder no verifica
//! que `Content-Length` coincida con el body: eso es responsabilidad de
//! quien arma la respuesta.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use minihttp::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("abc");
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use super::StatusCode;
use serde::Serialize;
use std::collections::HashMap;

/// Representa una respuesta HTTP/1.1 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Texto de razón; por defecto el estándar del código
    reason: String,

    /// Headers HTTP. El orden de serialización no está definido.
    headers: HashMap<String, String>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

/// Cuerpo JSON de las respuestas de error
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl Response {
    /// Crea una nueva respuesta con el código de estado especificado
    ///
    /// La respuesta no tiene headers ni body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason: status.reason_phrase().to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Respuesta por defecto del router: 404 Not Found vacía
    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound)
    }

    /// Reemplaza el texto de razón de la status line
    ///
    /// # Ejemplo
    /// ```
    /// use minihttp::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::NotAcceptable)
    ///     .with_reason("Error uploading file");
    /// assert_eq!(response.reason(), "Error uploading file");
    /// ```
    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = reason.to_string();
        self
    }

    /// Agrega un header a la respuesta
    ///
    /// Si el header ya existe, se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo de la respuesta desde un string
    ///
    /// Automáticamente agrega el header `Content-Length`.
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo de la respuesta desde bytes
    ///
    /// Útil para archivos binarios. También agrega `Content-Length`.
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self.headers
            .insert("Content-Length".to_string(), self.body.len().to_string());
        self
    }

    /// Crea una respuesta de error con mensaje JSON
    ///
    /// Formato del JSON: `{"error":"mensaje"}`
    ///
    /// # Ejemplo
    /// ```
    /// use minihttp::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::BadRequest, "Malformed request line");
    /// assert_eq!(response.body(), br#"{"error":"Malformed request line"}"#);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        // Serializar un struct con un &str no puede fallar
        let body = serde_json::to_string(&ErrorBody { error: message }).unwrap_or_default();
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(&body)
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body: contenido binario, sin terminador
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(64 + self.body.len());

        let status_line = format!("HTTP/1.1 {} {}\r\n", self.status.as_u16(), self.reason);
        result.extend_from_slice(status_line.as_bytes());

        for (name, value) in &self.headers {
            let header_line = format!("{}: {}\r\n", name, value);
            result.extend_from_slice(header_line.as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene el texto de razón
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::not_found()
    }
}
