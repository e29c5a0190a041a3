//! # minihttp
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo implementado desde cero sobre TCP: un request
//! por conexión, parseado a mano, enrutado a unos pocos comportamientos
//! fijos y respondido con bytes armados a mano.
//!
//! ## Arquitectura
//!
//! - `http`: Parsing de requests, construcción de responses, status codes
//! - `router`: Despacho por (método, primer segmento del target)
//! - `handlers`: `/`, `/echo`, `/user-agent`, `/files`
//! - `files`: Lectura/escritura confinada al directorio configurado
//! - `server`: Listener TCP y manejo de cada conexión
//! - `config`: Argumentos CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use minihttp::config::Config;
//! use minihttp::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config).expect("bind");
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod files;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
