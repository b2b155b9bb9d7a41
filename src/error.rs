//! Errores del proceso: arranque, configuración y limpieza por archivo.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fallos al cargar o validar la configuración. Siempre son fatales.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no se pudo leer la configuración `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuración TOML inválida: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("valor inválido para `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Fallos sobre el directorio vigilado. Abortan el arranque.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no se pudo crear el directorio `{path}`: {source}")]
    CreateRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{path}` no es un directorio")]
    NotADirectory { path: PathBuf },

    #[error("no se pudo leer el directorio `{path}`: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no se puede escribir en el directorio `{path}`: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fallos al recorrer la carpeta vigilada en una pasada. Solo anulan esa pasada.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("`{path}` no es un directorio")]
    NotADirectory { path: PathBuf },

    #[error("no se pudo recorrer `{path}`: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Fallos de la reescritura del PDF. El original nunca se modifica.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("no se pudo leer el PDF: {0}")]
    Load(#[source] lopdf::Error),

    #[error("el PDF está cifrado y no se puede reescribir")]
    Encrypted,

    #[error("el PDF no contiene páginas")]
    NoPages,

    #[error("estructura PDF inválida: {0}")]
    Structure(#[from] lopdf::Error),

    #[error("metadata XMP inválida: {0}")]
    Xmp(String),

    #[error("no se pudo guardar el PDF limpio: {0}")]
    Save(String),

    #[error("la verificación del PDF limpio falló: {0}")]
    Verification(String),
}

/// Resultado fallido de procesar un archivo concreto.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{source}")]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    #[error("no se pudo reemplazar el archivo original: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Transform { path, .. } | Self::Replace { path, .. } => path,
        }
    }
}
