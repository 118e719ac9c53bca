//! Trailing-edge debounce timer.
//!
//! Each [`Debouncer::push`] cancels the pending timer and arms a new one;
//! only a value that survives a full quiet period is delivered. Delivered
//! values carry a generation so a value that fired just before a newer push
//! can still be told apart and dropped by [`Debouncer::accept`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A value whose quiet period elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounced<T> {
    pub generation: u64,
    pub value: T,
}

/// Cancellable trailing-edge timer.
///
/// Must be used inside a tokio runtime. Dropping the debouncer cancels the
/// pending timer.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<Debounced<T>>,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer delivering settled values into `tx`.
    pub fn new(delay: Duration, tx: mpsc::UnboundedSender<Debounced<T>>) -> Self {
        Self {
            delay,
            tx,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the quiet period with a new value.
    pub fn push(&mut self, value: T) {
        self.cancel();
        self.generation += 1;

        let fired = Debounced {
            generation: self.generation,
            value,
        };
        let tx = self.tx.clone();
        let deadline = Instant::now() + self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // Receiver gone means the owner shut down
            let _ = tx.send(fired);
        }));
    }

    /// Cancel the pending timer. Returns true if one was armed.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Unwrap a delivered value if it belongs to the latest push.
    pub fn accept(&mut self, fired: Debounced<T>) -> Option<T> {
        if fired.generation != self.generation {
            return None;
        }
        self.pending = None;
        Some(fired.value)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
