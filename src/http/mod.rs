//! # Módulo HTTP
//!
//! Este módulo implementa el subconjunto de HTTP/1.1 que usa el servidor,
//! sin librerías de alto nivel:
//!
//! - Parsing de requests (una por conexión)
//! - Construcción de responses
//! - Manejo de status codes
//!
//! No hay keep-alive, chunked transfer encoding ni pipelining: cada
//! conexión lleva exactamente un request y una response.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /echo/abc HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```

pub mod request;
pub mod response;
pub mod status;

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
