//! Stop signal for cooperative interruption of a running stage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Why a stage was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum StopSignalKind {
    /// No stop was requested.
    #[default]
    None = 0,
    /// The agent process itself is shutting down.
    Terminate = 1,
    /// A user explicitly cancelled the stage.
    Cancel = 2,
    /// The stage exceeded its deadline.
    Timeout = 3,
}

impl StopSignalKind {
    /// Returns true once a stop has been requested.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self != Self::None
    }
}

impl TryFrom<u8> for StopSignalKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Terminate),
            2 => Ok(Self::Cancel),
            3 => Ok(Self::Timeout),
            other => Err(other),
        }
    }
}

impl From<StopSignalKind> for u8 {
    fn from(kind: StopSignalKind) -> Self {
        kind as Self
    }
}

impl fmt::Display for StopSignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Terminate => write!(f, "terminate"),
            Self::Cancel => write!(f, "cancel"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

struct Shared {
    /// Decides the single winning transition away from `None`.
    kind: AtomicU8,
    /// Broadcasts the winning kind to every waiter, past and future.
    notify: watch::Sender<StopSignalKind>,
}

impl Shared {
    fn load(&self) -> StopSignalKind {
        StopSignalKind::try_from(self.kind.load(Ordering::SeqCst)).unwrap_or(StopSignalKind::None)
    }
}

/// Read side of a stop signal, handed to the executor.
///
/// The signal starts as [`StopSignalKind::None`] and moves to exactly one
/// terminal kind. Cloning is cheap and every clone observes the same state.
#[derive(Clone)]
pub struct StopSignal {
    shared: Arc<Shared>,
}

/// Write side of a stop signal, kept by the driver and whatever actors
/// detect shutdown, cancellation or deadline expiry.
///
/// Only the first successful call takes effect; later calls are no-ops.
#[derive(Clone)]
pub struct StopSignalHandler {
    shared: Arc<Shared>,
}

impl StopSignal {
    /// Creates a fresh signal for one stage attempt.
    #[must_use]
    pub fn new() -> (Self, StopSignalHandler) {
        let (notify, _) = watch::channel(StopSignalKind::None);
        let shared = Arc::new(Shared {
            kind: AtomicU8::new(StopSignalKind::None.into()),
            notify,
        });
        (
            Self {
                shared: shared.clone(),
            },
            StopSignalHandler { shared },
        )
    }

    /// Returns the current kind without blocking.
    #[must_use]
    pub fn kind(&self) -> StopSignalKind {
        self.shared.load()
    }

    /// Returns true once a stop has been requested.
    #[must_use]
    pub fn terminated(&self) -> bool {
        self.kind().is_terminal()
    }

    /// Waits until a stop is requested and returns its kind.
    ///
    /// Completes immediately if the signal already fired.
    pub async fn wait(&self) -> StopSignalKind {
        let mut rx = self.shared.notify.subscribe();
        let fired = rx.wait_for(|kind| kind.is_terminal()).await.map(|kind| *kind);
        // The sender lives as long as `self`, so the channel cannot close here.
        fired.unwrap_or_else(|_| self.kind())
    }
}

impl StopSignalHandler {
    /// Requests a stop because the agent is shutting down.
    ///
    /// Returns true if this call set the signal.
    pub fn terminate(&self) -> bool {
        self.fire(StopSignalKind::Terminate)
    }

    /// Requests a stop because a user cancelled the stage.
    ///
    /// Returns true if this call set the signal.
    pub fn cancel(&self) -> bool {
        self.fire(StopSignalKind::Cancel)
    }

    /// Requests a stop because the stage deadline passed.
    ///
    /// Returns true if this call set the signal.
    pub fn timeout(&self) -> bool {
        self.fire(StopSignalKind::Timeout)
    }

    /// Returns the current kind without blocking.
    #[must_use]
    pub fn kind(&self) -> StopSignalKind {
        self.shared.load()
    }

    /// Returns another read side for this signal.
    #[must_use]
    pub fn signal(&self) -> StopSignal {
        StopSignal {
            shared: self.shared.clone(),
        }
    }

    fn fire(&self, kind: StopSignalKind) -> bool {
        let won = self
            .shared
            .kind
            .compare_exchange(
                StopSignalKind::None.into(),
                kind.into(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();

        if won {
            self.shared.notify.send_replace(kind);
            debug!(signal = %kind, "Stop signal fired");
        } else {
            debug!(signal = %kind, current = %self.kind(), "Stop signal already fired, ignoring");
        }
        won
    }
}

impl fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopSignal")
            .field("kind", &self.kind())
            .finish()
    }
}

impl fmt::Debug for StopSignalHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopSignalHandler")
            .field("kind", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[test]
    fn test_signal_starts_none() {
        let (signal, handler) = StopSignal::new();
        assert_eq!(signal.kind(), StopSignalKind::None);
        assert_eq!(handler.kind(), StopSignalKind::None);
        assert!(!signal.terminated());
    }

    #[test]
    fn test_signal_first_wins() {
        let (signal, handler) = StopSignal::new();

        assert!(handler.cancel());
        assert!(!handler.timeout());
        assert!(!handler.terminate());

        assert_eq!(signal.kind(), StopSignalKind::Cancel);
        assert!(signal.terminated());
    }

    #[test]
    fn test_clones_share_state() {
        let (signal, handler) = StopSignal::new();
        let other_signal = handler.signal();
        let other_handler = handler.clone();

        assert!(other_handler.timeout());

        assert_eq!(signal.kind(), StopSignalKind::Timeout);
        assert_eq!(other_signal.kind(), StopSignalKind::Timeout);
    }

    #[test]
    fn test_concurrent_setters_exactly_one_wins() {
        let (signal, handler) = StopSignal::new();
        let winners = Arc::new(AtomicUsize::new(0));

        let threads: Vec<_> = (0..12)
            .map(|i| {
                let handler = handler.clone();
                let winners = winners.clone();
                std::thread::spawn(move || {
                    let won = match i % 3 {
                        0 => handler.terminate(),
                        1 => handler.cancel(),
                        _ => handler.timeout(),
                    };
                    if won {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert!(signal.terminated());
    }

    #[test]
    fn test_waiter_released_when_setter_wins() {
        let (signal, handler) = StopSignal::new();
        let mut waiter = task::spawn(signal.wait());

        assert_pending!(waiter.poll());
        assert!(!waiter.is_woken());

        handler.cancel();

        assert!(waiter.is_woken());
        assert_ready_eq!(waiter.poll(), StopSignalKind::Cancel);
    }

    #[test]
    fn test_losing_setter_does_not_change_waiter_result() {
        let (signal, handler) = StopSignal::new();
        let mut waiter = task::spawn(signal.wait());
        assert_pending!(waiter.poll());

        handler.terminate();
        handler.cancel();

        assert_ready_eq!(waiter.poll(), StopSignalKind::Terminate);
    }

    #[test]
    fn test_wait_after_fired_is_immediate() {
        let (signal, handler) = StopSignal::new();
        handler.timeout();

        let mut waiter = task::spawn(signal.wait());
        assert_ready_eq!(waiter.poll(), StopSignalKind::Timeout);
    }

    #[tokio::test]
    async fn test_multiple_waiters_observe_same_kind() {
        let (signal, handler) = StopSignal::new();

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let signal = signal.clone();
                tokio::spawn(async move { signal.wait().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        handler.terminate();

        let kinds = tokio::time::timeout(Duration::from_secs(1), join_all(waiters))
            .await
            .unwrap();
        for kind in kinds {
            assert_eq!(kind.unwrap(), StopSignalKind::Terminate);
        }
    }

    #[test]
    fn test_kind_u8_encoding() {
        assert_eq!(u8::from(StopSignalKind::Cancel), 2);
        assert_eq!(StopSignalKind::try_from(3), Ok(StopSignalKind::Timeout));
        assert_eq!(StopSignalKind::try_from(9), Err(9));
    }

    #[test]
    fn test_kind_serialize() {
        let json = serde_json::to_string(&StopSignalKind::Terminate).unwrap();
        assert_eq!(json, r#""terminate""#);
        assert!(serde_json::from_str::<StopSignalKind>(r#""pause""#).is_err());
    }
}
