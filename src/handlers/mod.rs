//! # Handlers del Servidor
//!
//! Cada handler recibe el `Request` y el contexto de la ruta (sub-path y
//! acceso a archivos) y retorna una `Response` completa.
//!
//! ## Categorías
//!
//! - **basic**: `/`, `/echo`, `/user-agent`
//! - **files**: descarga y subida de archivos bajo `--directory`

pub mod basic;
pub mod files;

// Re-exportar funciones útiles
pub use basic::*;
pub use files::*;
