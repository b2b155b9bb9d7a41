//! Registro de eventos: cada línea va a la consola y al archivo de log con marca de tiempo.

use chrono::Local;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filtro usado cuando `RUST_LOG` no está definido.
pub const DEFAULT_DIRECTIVES: &str = "pdfblanker=info";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Marca de tiempo local con el formato `[2024-01-31 18:05:00]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", format_timestamp(Local::now()))
    }
}

fn format_timestamp(now: chrono::DateTime<Local>) -> String {
    format!("[{}]", now.format(TIMESTAMP_FORMAT))
}

/// Instala el suscriptor global con una capa de consola y otra de archivo.
///
/// Si el archivo de log no se puede abrir se continúa solo con la consola y se
/// avisa con un `warn!`.
pub fn init_logging(log_file: &Path) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let (file, open_error) = match open_log_file(log_file) {
        Ok(file) => (Some(file), None),
        Err(error) => (None, Some(error)),
    };

    let file_layer = file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .with_timer(LocalTimestamp)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stdout)
                .with_target(false)
                .with_timer(LocalTimestamp),
        )
        .with(file_layer)
        .try_init()?;

    if let Some(error) = open_error {
        warn!(
            "No se pudo abrir el archivo de log {}: {}; se registrará solo en consola",
            log_file.display(),
            error
        );
    }

    Ok(())
}

/// Abre el log en modo anexar, creando las carpetas intermedias si faltan.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    OpenOptions::new().create(true).append(true).open(path)
}
