//! Resumen acumulado de una pasada sobre la carpeta vigilada.

use std::fmt;

use crate::error::ProcessError;

use super::FileOutcome;

#[derive(Debug, Default)]
pub struct RunSummary {
    pub discovered: usize,
    pub stripped: usize,
    pub already_blank: usize,
    pub failures: Vec<ProcessError>,
    /// La pasada se cortó por una señal de parada antes de terminar.
    pub interrupted: bool,
}

impl RunSummary {
    pub(crate) fn new(discovered: usize) -> Self {
        Self {
            discovered,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, result: Result<FileOutcome, ProcessError>) {
        match result {
            Ok(FileOutcome::Stripped) => self.stripped += 1,
            Ok(FileOutcome::AlreadyBlank) => self.already_blank += 1,
            Err(error) => self.failures.push(error),
        }
    }

    pub fn processed(&self) -> usize {
        self.stripped + self.already_blank + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} encontrados, {} limpiados, {} sin cambios, {} con errores",
            self.discovered,
            self.stripped,
            self.already_blank,
            self.failures.len()
        )?;
        if self.interrupted {
            write!(f, " (interrumpida)")?;
        }
        Ok(())
    }
}
