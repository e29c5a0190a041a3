//! # Acceso a Archivos Estáticos
//! src/files.rs
//!
//! Lectura y escritura de archivos bajo un directorio raíz configurado
//! (`--directory`). Las rutas relativas se resuelven componente por
//! componente: cualquier intento de salir de la raíz (`..`, rutas
//! absolutas) se rechaza antes de tocar el sistema de archivos.
//!
//! No hay locking: dos uploads simultáneos al mismo archivo compiten y
//! gana el último en escribir.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errores del acceso a archivos
#[derive(Debug, Error)]
pub enum FileError {
    /// El servidor se inició sin `--directory`
    #[error("file root directory is not configured")]
    RootNotConfigured,

    /// La ruta está vacía o escapa del directorio raíz
    #[error("invalid file path: {0:?}")]
    InvalidPath(String),

    /// El archivo no existe
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Cualquier otro error de I/O (permisos, es un directorio, ...)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Acceso confinado a un directorio raíz
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    root: Option<PathBuf>,
}

impl FileStore {
    /// Crea un store; `None` hace que todas las operaciones fallen
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Lee el archivo completo en `relative_path`
    pub fn download(&self, relative_path: &str) -> Result<Vec<u8>, FileError> {
        let path = self.resolve(relative_path)?;

        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FileError::NotFound(path),
            _ => FileError::Io(e),
        })
    }

    /// Escribe `contents` en `relative_path`, creando o truncando el archivo
    ///
    /// No crea directorios intermedios.
    pub fn upload(&self, relative_path: &str, contents: &[u8]) -> Result<(), FileError> {
        let path = self.resolve(relative_path)?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Resuelve una ruta relativa dentro de la raíz
    ///
    /// Se descartan los componentes `.`; `..`, raíces y prefijos se rechazan.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf, FileError> {
        let root = self.root.as_ref().ok_or(FileError::RootNotConfigured)?;

        let mut clean = PathBuf::new();
        for component in Path::new(relative_path).components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(FileError::InvalidPath(relative_path.to_string()));
                }
            }
        }

        if clean.as_os_str().is_empty() {
            return Err(FileError::InvalidPath(relative_path.to_string()));
        }

        Ok(root.join(clean))
    }
}
