//! Archivo temporal hermano y sustitución del original.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Sufijo del archivo temporal que se escribe junto al original.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Ruta temporal estable en el mismo directorio que `path`: `<archivo>.tmp`.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Sustituye `original` por `temp`. Si falla, el temporal se elimina.
pub(crate) fn replace_original(temp: &Path, original: &Path) -> io::Result<()> {
    fs::rename(temp, original).inspect_err(|_| discard_temp(temp))
}

/// Elimina el temporal si quedó en disco.
pub(crate) fn discard_temp(temp: &Path) {
    if !temp.exists() {
        return;
    }

    if let Err(error) = fs::remove_file(temp) {
        warn!(
            "No se pudo eliminar el archivo temporal {}: {}",
            temp.display(),
            error
        );
    }
}
