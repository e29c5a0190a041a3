//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Implementación del servidor TCP que maneja múltiples conexiones
//! simultáneas usando threads. Cada conexión se procesa en su propio
//! thread y no comparte estado mutable con las demás.

use super::connection::{self, ConnectionSettings};
use crate::config::Config;
use crate::files::FileStore;
use crate::router::Router;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

/// Servidor HTTP/1.1 concurrente
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    settings: ConnectionSettings,
}

impl Server {
    /// Hace bind en `config.address()` y registra las rutas
    pub fn bind(config: &Config) -> io::Result<Self> {
        let listener = TcpListener::bind(config.address())?;

        if config.directory.is_none() {
            warn!("no --directory given: /files requests will fail");
        }
        let files = FileStore::new(config.directory.clone());

        Ok(Self {
            listener,
            router: Arc::new(Router::with_default_routes(files)),
            settings: ConnectionSettings::from(config),
        })
    }

    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Acepta conexiones para siempre, un thread por conexión
    ///
    /// Los errores de accept o de una conexión se registran y el loop sigue.
    pub fn run(&self) -> io::Result<()> {
        info!(address = %self.local_addr()?, "server listening");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let settings = self.settings;

                    let spawned = thread::Builder::new()
                        .name("connection".to_string())
                        .spawn(move || {
                            if let Err(e) = connection::handle_connection(stream, &router, settings) {
                                warn!(error = %e, "connection failed");
                            }
                        });

                    if let Err(e) = spawned {
                        error!(error = %e, "failed to spawn connection thread");
                    }
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }

        Ok(())
    }
}
