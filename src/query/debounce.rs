//! Delay-and-coalesce stage for rapidly changing input (search keystrokes).
//!
//! Every value restarts the quiescence timer; only the last value seen before
//! the window elapses is emitted. Runs as a background tokio task so callers
//! never juggle timers themselves.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{PagewiseError, Result};

/// Spawns debounce tasks.
pub struct Debouncer;

impl Debouncer {
    /// Start a debounce task with the given quiescence window.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<T>(window: Duration) -> (DebounceInput<T>, DebouncedOutput<T>)
    where
        T: Send + 'static,
    {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_debounce_loop(input_rx, output_tx, window));

        (
            DebounceInput { tx: input_tx },
            DebouncedOutput { rx: output_rx },
        )
    }
}

/// Sending half: raw, un-debounced values go in here.
#[derive(Debug, Clone)]
pub struct DebounceInput<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> DebounceInput<T> {
    pub fn send(&self, value: T) -> Result<()> {
        self.tx.send(value).map_err(|_| PagewiseError::PagerClosed)
    }
}

/// Receiving half: settled values come out here.
#[derive(Debug)]
pub struct DebouncedOutput<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> DebouncedOutput<T> {
    /// Wait for the next settled value. `None` once every input is dropped.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

async fn run_debounce_loop<T>(
    mut input_rx: mpsc::UnboundedReceiver<T>,
    output_tx: mpsc::UnboundedSender<T>,
    window: Duration,
) {
    loop {
        // Block until the first value of a burst arrives
        let Some(mut pending) = input_rx.recv().await else {
            break;
        };

        let mut input_closed = false;
        if !window.is_zero() {
            loop {
                match tokio::time::timeout(window, input_rx.recv()).await {
                    Ok(Some(value)) => pending = value,
                    Ok(None) => {
                        input_closed = true;
                        break;
                    }
                    // Quiescence window elapsed
                    Err(_) => break,
                }
            }
        }

        // Repeats still go out; the consumer owns the current value
        if output_tx.send(pending).is_err() {
            break;
        }

        if input_closed {
            break;
        }
    }
}
