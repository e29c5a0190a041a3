//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y variables
//! de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./minihttp --directory /tmp/files --port 4221
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_DIRECTORY=/tmp/files ./minihttp
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Configuración del servidor HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "minihttp")]
#[command(about = "Servidor HTTP/1.1 mínimo: echo, user-agent y archivos estáticos")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = efímero)
    #[arg(short, long, default_value = "4221", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio raíz para `/files`; sin él, esas rutas fallan
    #[arg(short, long, env = "HTTP_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Máximo de bytes (cabecera + body) que se leen por conexión
    #[arg(long = "max-request-bytes", default_value = "1048576", env = "HTTP_MAX_REQUEST_BYTES")]
    pub max_request_bytes: usize,

    /// Timeout de lectura del socket en milisegundos
    #[arg(long = "read-timeout-ms", default_value = "5000", env = "HTTP_READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura del socket en milisegundos
    #[arg(long = "write-timeout-ms", default_value = "5000", env = "HTTP_WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use minihttp::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:4221");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Valida la configuración
    ///
    /// Un directorio inexistente no es un error: `/files` simplemente falla.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_request_bytes == 0 {
            return Err("Max request bytes must be >= 1".to_string());
        }

        if self.read_timeout_ms == 0 {
            return Err("Read timeout must be > 0".to_string());
        }
        if self.write_timeout_ms == 0 {
            return Err("Write timeout must be > 0".to_string());
        }

        if let Some(dir) = &self.directory {
            if dir.exists() && !dir.is_dir() {
                return Err(format!("Directory {} is not a directory", dir.display()));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto (igual a los defaults del CLI)
    fn default() -> Self {
        Self {
            port: 4221,
            host: "0.0.0.0".to_string(),
            directory: None,
            max_request_bytes: 1024 * 1024,
            read_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
        }
    }
}
