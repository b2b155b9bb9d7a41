//! Procesador de carpetas: descubre PDFs y los limpia uno a uno en su lugar.

mod discovery;
mod replace;
mod summary;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{DiscoveryError, ProcessError, StartupError};
use crate::title::{StripOutcome, TitlePolicy, strip_title};
use crate::watch::StopSignal;

pub use discovery::{collect_candidate_files, has_supported_extension};
pub use replace::{TEMP_SUFFIX, temp_sibling};
pub use summary::RunSummary;

use replace::{discard_temp, replace_original};

/// Resultado satisfactorio de procesar un archivo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    /// El original se sustituyó por la copia sin título.
    Stripped,
    /// El título ya estaba vacío y el archivo no se tocó.
    AlreadyBlank,
}

pub struct FolderProcessor {
    root: PathBuf,
    extensions: Vec<String>,
    policy: TitlePolicy,
}

impl FolderProcessor {
    /// Prepara la carpeta vigilada: la crea si falta y comprueba que sea usable.
    pub fn new(config: &Config) -> Result<Self, StartupError> {
        let root = config.watch_folder.clone();
        ensure_watch_root(&root)?;

        Ok(Self {
            root,
            extensions: config.supported_extensions.clone(),
            policy: config.title_policy(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn discover(&self) -> Result<Vec<PathBuf>, DiscoveryError> {
        collect_candidate_files(&self.root, &self.extensions)
    }

    /// Limpia un archivo a través de `<archivo>.tmp` y sustituye el original.
    ///
    /// Ante cualquier fallo el original queda intacto y el temporal se elimina.
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome, ProcessError> {
        let relative = self.relative(path);
        debug!("Procesando archivo: {}", relative.display());

        let temp_path = temp_sibling(path);

        let outcome = match strip_title(path, &temp_path, &self.policy) {
            Ok(outcome) => outcome,
            Err(source) => {
                discard_temp(&temp_path);
                error!("ERROR procesando {}: {}", path.display(), source);
                return Err(ProcessError::Transform {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if outcome == StripOutcome::AlreadyBlank {
            discard_temp(&temp_path);
            debug!("Sin título, se omite: {}", relative.display());
            return Ok(FileOutcome::AlreadyBlank);
        }

        self.commit(&temp_path, path)
    }

    /// Sustituye `path` por la copia limpia ya verificada en `temp_path`.
    fn commit(&self, temp_path: &Path, path: &Path) -> Result<FileOutcome, ProcessError> {
        let relative = self.relative(path);

        if let Err(source) = replace_original(temp_path, path) {
            error!(
                "ERROR: no se pudo reemplazar el archivo original {}: {}",
                relative.display(),
                source
            );
            return Err(ProcessError::Replace {
                path: path.to_path_buf(),
                source,
            });
        }

        info!("Procesado correctamente: {}", relative.display());
        Ok(FileOutcome::Stripped)
    }

    /// Una pasada completa: descubrir y procesar cada archivo de forma independiente.
    pub fn run_once(&self) -> RunSummary {
        let summary = self.run_pass(None);
        info!("Pasada completada: {}", summary);
        summary
    }

    /// Repite pasadas separadas por `interval` hasta que `stop` se active.
    /// Devuelve el número de pasadas completas.
    pub fn run_forever(&self, interval: Duration, stop: &StopSignal) -> usize {
        info!("Iniciando monitoreo continuo...");
        let mut passes = 0;

        loop {
            let summary = self.run_pass(Some(stop));
            if summary.stripped > 0 || summary.has_failures() {
                info!("Pasada completada: {}", summary);
            }
            if !summary.interrupted {
                passes += 1;
            }

            if stop.wait(interval) {
                break;
            }
        }

        info!("Deteniendo monitoreo tras {} pasadas", passes);
        passes
    }

    fn run_pass(&self, stop: Option<&StopSignal>) -> RunSummary {
        let files = match self.discover() {
            Ok(files) => files,
            Err(error) => {
                error!("ERROR recorriendo {}: {}", self.root.display(), error);
                return RunSummary::default();
            }
        };

        if !files.is_empty() {
            debug!("Se encontraron {} archivos PDF para procesar", files.len());
        }

        let mut summary = RunSummary::new(files.len());
        for path in files {
            if stop.is_some_and(StopSignal::is_stopped) {
                summary.interrupted = true;
                break;
            }
            summary.record(self.process_file(&path));
        }

        summary
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

/// Crea la carpeta si no existe y comprueba que se pueda listar y escribir.
fn ensure_watch_root(root: &Path) -> Result<(), StartupError> {
    if !root.exists() {
        fs::create_dir_all(root).map_err(|source| {
            error!("ERROR: no se pudo crear el directorio: {}", root.display());
            StartupError::CreateRoot {
                path: root.to_path_buf(),
                source,
            }
        })?;
        info!("Se creó el directorio: {}", root.display());
    }

    let metadata = fs::metadata(root).map_err(|source| StartupError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        return Err(StartupError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    fs::read_dir(root).map_err(|source| StartupError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;

    ensure_writable(root)
}

/// Nombre del archivo auxiliar con el que se comprueba la escritura en la raíz.
const WRITE_CHECK_FILE: &str = ".pdfblanker-escritura.tmp";

/// Crea y borra un archivo auxiliar en `root`.
fn ensure_writable(root: &Path) -> Result<(), StartupError> {
    let scratch = root.join(WRITE_CHECK_FILE);
    let not_writable = |source: std::io::Error| StartupError::NotWritable {
        path: root.to_path_buf(),
        source,
    };

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&scratch)
        .map_err(not_writable)?;
    fs::remove_file(&scratch).map_err(not_writable)
}

#[cfg(test)]
mod tests;
