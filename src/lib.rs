//! Motor de pdfblanker: vigila una carpeta y deja vacío el título de cada PDF,
//! conservando páginas, contenido y el resto de la metadata.

pub mod config;
pub mod error;
pub mod logging;
pub mod processor;
pub mod title;
pub mod watch;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use processor::{FileOutcome, FolderProcessor, RunSummary};
pub use watch::StopSignal;
