//! Búsqueda recursiva de archivos candidatos bajo la carpeta vigilada.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::DiscoveryError;

/// Recorre `root` y devuelve los archivos regulares con extensión admitida.
///
/// Las entradas ilegibles dentro del árbol se registran y se omiten; solo un
/// fallo al abrir la propia raíz se considera error.
pub fn collect_candidate_files(
    root: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) if error.depth() == 0 => {
                return Err(DiscoveryError::Walk {
                    path: root.to_path_buf(),
                    source: error,
                });
            }
            Err(error) => {
                warn!("Entrada omitida durante el recorrido: {}", error);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if has_supported_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Compara la extensión en minúsculas contra la lista admitida.
pub fn has_supported_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let ext = ext.to_lowercase();
    extensions.iter().any(|allowed| *allowed == ext)
}
