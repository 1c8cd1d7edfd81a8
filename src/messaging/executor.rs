//! Dispatch thread
//!
//! Runs a [`Dispatcher`] over the inbound channel on its own thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context};
use crossbeam_channel::{bounded, Receiver};

use crate::audio_system::registry::error_chain;
use crate::audio_system::{AudioOutput, DispatchStats, Dispatcher, Registry, SoundEffectName};
use crate::error::{AppResult, AudioError};

/// Handle to a running dispatch thread
pub struct DispatchThread {
    handle: JoinHandle<AppResult<DispatchStats>>,
}

impl DispatchThread {
    /// Wait for the thread to drain the channel and stop
    pub fn join(self) -> AppResult<DispatchStats> {
        self.handle
            .join()
            .map_err(|_| anyhow!("Dispatch thread panicked"))?
    }
}

/// Start dispatching `events` on a background thread.
///
/// `make_output` runs on the new thread, so outputs that must stay on one
/// thread (like the rodio stream) work. This returns once the output is
/// open; if opening it fails, the error is returned here and nothing is
/// dispatched. The thread stops once every
/// [`SoundEffectPort`](super::SoundEffectPort) is dropped and the channel is drained.
pub fn spawn_dispatcher<O, F>(
    registry: Arc<Registry>,
    events: Receiver<SoundEffectName>,
    make_output: F,
) -> AppResult<DispatchThread>
where
    O: AudioOutput + 'static,
    F: FnOnce() -> Result<O, AudioError> + Send + 'static,
{
    // Carries the output-open result back before any event is consumed
    let (ready_tx, ready_rx) = bounded::<Result<(), AudioError>>(1);

    let handle = thread::Builder::new()
        .name("sfx-dispatch".to_string())
        .spawn(move || -> AppResult<DispatchStats> {
            tracing::info!("Dispatch thread started");
            let output = match make_output() {
                Ok(output) => {
                    let _ = ready_tx.send(Ok(()));
                    output
                }
                Err(e) => {
                    tracing::error!("Failed to open audio output: {}", error_chain(&e));
                    let _ = ready_tx.send(Err(e));
                    return Err(anyhow!("Failed to open audio output"));
                }
            };

            let stats = Dispatcher::new(registry, output).run(&events);
            tracing::info!("Dispatch thread stopped");
            Ok(stats)
        })
        .context("Failed to start dispatch thread")?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(DispatchThread { handle }),
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(anyhow::Error::new(e).context("Failed to open audio output"))
        }
        // Sender dropped without a result: make_output panicked
        Err(_) => {
            let _ = handle.join();
            Err(anyhow!("Dispatch thread panicked while opening audio output"))
        }
    }
}
