// WHY: Trailing-edge debounce as an explicit component instead of a captured timer
// Only the last schedule() within the window produces an event; older timers are aborted.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

/// Default quiet period after the last edit before a check is dispatched
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(3000);

/// Timer expiry delivered to the owner's event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub generation: u64,
    pub args: T,
}

struct Pending<T> {
    generation: u64,
    args: T,
    handle: JoinHandle<()>,
}

/// Holds at most one pending timer plus the latest scheduled arguments
pub struct Debouncer<T, E> {
    window: Duration,
    events: UnboundedSender<E>,
    wrap: fn(Fired<T>) -> E,
    generation: u64,
    pending: Option<Pending<T>>,
}

impl<T, E> Debouncer<T, E>
where
    T: Clone + Send + 'static,
    E: Send + 'static,
{
    /// `wrap` turns a timer expiry into the owner's event type
    pub fn new(window: Duration, events: UnboundedSender<E>, wrap: fn(Fired<T>) -> E) -> Self {
        Self {
            window,
            events,
            wrap,
            generation: 0,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Restart the window with new arguments, replacing anything pending
    pub fn schedule(&mut self, args: T) {
        self.cancel_pending();
        self.generation += 1;

        let generation = self.generation;
        let window = self.window;
        let events = self.events.clone();
        let wrap = self.wrap;
        let fired_args = args.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Receiver gone means the owner shut down
            let _ = events.send(wrap(Fired {
                generation,
                args: fired_args,
            }));
        });

        self.pending = Some(Pending {
            generation,
            args,
            handle,
        });
    }

    /// Abort the pending timer, returning its arguments
    pub fn cancel_pending(&mut self) -> Option<T> {
        self.pending.take().map(|pending| {
            pending.handle.abort();
            pending.args
        })
    }

    /// Accept an expiry only if it belongs to the current pending timer
    pub fn acknowledge(&mut self, fired: Fired<T>) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.generation == fired.generation => {
                self.pending = None;
                Some(fired.args)
            }
            _ => {
                debug!(generation = fired.generation, "Ignoring superseded debounce timer");
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_args(&self) -> Option<&T> {
        self.pending.as_ref().map(|pending| &pending.args)
    }
}

impl<T, E> Drop for Debouncer<T, E> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn debouncer(window_ms: u64) -> (Debouncer<String, Fired<String>>, mpsc::UnboundedReceiver<Fired<String>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Debouncer::new(Duration::from_millis(window_ms), tx, |fired| fired), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_trailing_call_fires() {
        let (mut debouncer, mut rx) = debouncer(3000);

        debouncer.schedule("first".to_string());
        tokio::time::sleep(Duration::from_millis(1000)).await;
        debouncer.schedule("second".to_string());
        tokio::time::sleep(Duration::from_millis(1000)).await;
        debouncer.schedule("third".to_string());
        assert_eq!(debouncer.pending_args().map(String::as_str), Some("third"));

        let started = tokio::time::Instant::now();
        let fired = rx.recv().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(3000));
        assert_eq!(debouncer.acknowledge(fired).as_deref(), Some("third"));
        assert!(!debouncer.is_pending());

        // Nothing else was queued by the aborted timers
        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending() {
        let (mut debouncer, mut rx) = debouncer(100);

        debouncer.schedule("x".to_string());
        assert_eq!(debouncer.cancel_pending().as_deref(), Some("x"));
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_expiry_is_ignored() {
        let (mut debouncer, _rx) = debouncer(100);

        debouncer.schedule("old".to_string());
        let stale = Fired {
            generation: 1,
            args: "old".to_string(),
        };
        debouncer.schedule("new".to_string());

        assert_eq!(debouncer.acknowledge(stale), None);
        assert!(debouncer.is_pending());
    }
}
