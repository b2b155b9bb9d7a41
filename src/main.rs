use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};

use pdfblanker::logging::init_logging;
use pdfblanker::{Config, FolderProcessor, StopSignal};

#[derive(Debug, Parser)]
#[command(name = "pdfblanker", version, about)]
struct Cli {
    /// Ejecuta una sola pasada sobre la carpeta y termina.
    #[arg(long)]
    once: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR FATAL: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.log_file) {
        eprintln!("ERROR FATAL: no se pudo iniciar el registro: {e}");
        return ExitCode::FAILURE;
    }

    match &config.source {
        Some(path) => info!("Configuración cargada desde {}", path.display()),
        None => info!("Usando configuración por defecto"),
    }

    let processor = match FolderProcessor::new(&config) {
        Ok(processor) => processor,
        Err(e) => {
            error!("ERROR FATAL: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.once {
        info!("Procesando una sola pasada sobre {}", processor.root().display());
        processor.run_once();
        return ExitCode::SUCCESS;
    }

    info!("Monitoreando directorio: {}", processor.root().display());
    info!(
        "Intervalo de verificación: {} segundos",
        config.interval().as_secs()
    );
    info!("Presiona Ctrl+C para detener");

    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_stop.stop()) {
        warn!("No se pudo instalar el manejador de Ctrl+C: {e}");
    }

    processor.run_forever(config.interval(), &stop);
    ExitCode::SUCCESS
}
