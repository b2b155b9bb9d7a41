//! Configuración estática: se lee una vez al arrancar y no se recarga.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::title::TitlePolicy;

/// Variable de entorno con la ruta explícita del archivo de configuración.
pub const CONFIG_ENV_VAR: &str = "PDFBLANKER_CONFIG";
/// Archivo buscado en el directorio de trabajo cuando no hay ruta explícita.
pub const DEFAULT_CONFIG_FILE: &str = "pdfblanker.toml";

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Carpeta vigilada de forma recursiva.
    pub watch_folder: PathBuf,
    /// Declarada pero sin uso: los archivos se reescriben en su lugar.
    pub output_folder: PathBuf,
    /// Segundos entre pasadas en modo continuo.
    pub check_interval: u64,
    pub supported_extensions: Vec<String>,
    pub log_file: PathBuf,
    /// Declarada pero sin uso.
    pub create_processed_folder: bool,
    pub pdf_settings: PdfSettings,
    /// Archivo del que se cargó la configuración, si hubo alguno.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdfSettings {
    /// Declarada pero sin uso: se conserva la versión del documento original.
    pub version: String,
    pub remove_title_only: bool,
    pub strip_xmp_title: bool,
    pub preserve_metadata: PreserveMetadata,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreserveMetadata {
    pub author: bool,
    pub subject: bool,
    pub keywords: bool,
    pub creator: bool,
    pub producer: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_folder: PathBuf::from("input_pdfs"),
            output_folder: PathBuf::from("output_pdfs"),
            check_interval: 5,
            supported_extensions: vec!["pdf".to_string()],
            log_file: PathBuf::from("pdf_blanker.log"),
            create_processed_folder: true,
            pdf_settings: PdfSettings::default(),
            source: None,
        }
    }
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            version: "1.4".to_string(),
            remove_title_only: true,
            strip_xmp_title: true,
            preserve_metadata: PreserveMetadata::default(),
        }
    }
}

impl Default for PreserveMetadata {
    fn default() -> Self {
        Self {
            author: true,
            subject: true,
            keywords: true,
            creator: true,
            producer: true,
        }
    }
}

impl Config {
    /// Carga la configuración del proceso según `PDFBLANKER_CONFIG` o el directorio actual.
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = env::current_dir().map_err(|source| ConfigError::Read {
            path: PathBuf::from("."),
            source,
        })?;
        let explicit = env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::load_with(explicit, &cwd)
    }

    /// Una ruta explícita debe existir; sin ella se usa `pdfblanker.toml` si existe,
    /// o los valores por defecto relativos a `cwd`.
    pub fn load_with(explicit: Option<PathBuf>, cwd: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let path = if path.is_relative() { cwd.join(path) } else { path };
            return Self::from_file(&path);
        }

        let candidate = cwd.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            return Self::from_file(&candidate);
        }

        let mut config = Self::default();
        config.resolve_paths(cwd);
        Ok(config)
    }

    /// Lee un archivo TOML y resuelve sus rutas relativas respecto a su carpeta.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Interpreta el TOML, normaliza las extensiones y valida los valores.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize_extensions();
        config.validate()?;
        Ok(config)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.check_interval)
    }

    pub fn title_policy(&self) -> TitlePolicy {
        let settings = &self.pdf_settings;
        if settings.remove_title_only {
            return TitlePolicy {
                strip_xmp_title: settings.strip_xmp_title,
                ..TitlePolicy::default()
            };
        }

        let preserve = settings.preserve_metadata;
        TitlePolicy {
            clear_author: !preserve.author,
            clear_subject: !preserve.subject,
            clear_keywords: !preserve.keywords,
            clear_creator: !preserve.creator,
            clear_producer: !preserve.producer,
            strip_xmp_title: settings.strip_xmp_title,
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.watch_folder,
            &mut self.output_folder,
            &mut self.log_file,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    fn normalize_extensions(&mut self) {
        let mut normalized: Vec<String> = Vec::new();
        for ext in &self.supported_extensions {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }
        self.supported_extensions = normalized;
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.check_interval == 0 {
            return Err(ConfigError::Invalid {
                field: "check_interval",
                reason: "debe ser mayor que cero".to_string(),
            });
        }

        if self.supported_extensions.is_empty() {
            return Err(ConfigError::Invalid {
                field: "supported_extensions",
                reason: "la lista no puede estar vacía".to_string(),
            });
        }

        if self.watch_folder.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "watch_folder",
                reason: "la ruta no puede estar vacía".to_string(),
            });
        }

        if self.log_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "log_file",
                reason: "la ruta no puede estar vacía".to_string(),
            });
        }

        Ok(())
    }
}
