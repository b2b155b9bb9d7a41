//! Señal de parada para el modo continuo.
//!
//! El bucle espera entre pasadas sobre un canal de `crossbeam-channel`, de modo
//! que `stop()` lo despierta de inmediato en lugar de esperar al siguiente ciclo.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Token de cancelación clonable. Todas las copias comparten el mismo estado.
#[derive(Clone, Debug)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    /// Solicita la parada. No bloquea y puede llamarse varias veces.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let _ = self.wake_tx.try_send(());
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Espera hasta `timeout` o hasta que se pida la parada.
    /// Devuelve `true` si la parada está solicitada.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_stopped() {
            return true;
        }
        let _ = self.wake_rx.recv_timeout(timeout);
        self.is_stopped()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}
