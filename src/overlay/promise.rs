//! Single-fire deferred values.
//!
//! A [`Deferred`] is the write half and a [`ResultPromise`] the read half of a
//! value that is settled exactly once. Settling consumes the [`Deferred`], so a
//! second resolution cannot be expressed.
//!
//! A deferred may also be resolved with another pending [`ResultPromise`]. The
//! outer promise then adopts the inner one's state and completes with whatever
//! the inner one eventually yields. Adoption replaces the outer state instead
//! of nesting it, so long retry chains stay flat.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::overlay::error::{OverlayError, Result};

enum Settlement<T> {
    Fulfilled(T),
    Rejected(OverlayError),
    Chained(ResultPromise<T>),
}

enum State<T> {
    Pending(oneshot::Receiver<Settlement<T>>),
    Ready(Option<Result<T>>),
}

/// Write half of a deferred value.
pub struct Deferred<T> {
    tx: oneshot::Sender<Settlement<T>>,
}

/// Read half of a deferred value.
#[must_use = "a result promise does nothing unless awaited"]
pub struct ResultPromise<T> {
    state: State<T>,
}

/// Create a connected deferred/promise pair.
pub fn deferred<T>() -> (Deferred<T>, ResultPromise<T>) {
    let (tx, rx) = oneshot::channel();
    (
        Deferred { tx },
        ResultPromise {
            state: State::Pending(rx),
        },
    )
}

impl<T> Deferred<T> {
    pub fn resolve(self, value: T) {
        self.settle(Settlement::Fulfilled(value));
    }

    /// Resolve with a promise that is still pending; the reader observes the
    /// chained promise's eventual outcome.
    pub fn resolve_with(self, promise: ResultPromise<T>) {
        self.settle(Settlement::Chained(promise));
    }

    pub fn reject(self, error: OverlayError) {
        self.settle(Settlement::Rejected(error));
    }

    /// Completes once the read half is dropped.
    pub async fn abandoned(&mut self) {
        self.tx.closed().await;
    }

    fn settle(self, settlement: Settlement<T>) {
        // Nobody is listening any more, nothing to deliver to.
        let _ = self.tx.send(settlement);
    }
}

// The settled value is never pinned in place.
impl<T> Unpin for ResultPromise<T> {}

impl<T> Future for ResultPromise<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                State::Ready(outcome) => {
                    return Poll::Ready(outcome.take().unwrap_or(Err(OverlayError::Abandoned)));
                }
                State::Pending(rx) => match Pin::new(rx).poll(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Ok(Settlement::Fulfilled(value))) => {
                        this.state = State::Ready(Some(Ok(value)));
                    }
                    Poll::Ready(Ok(Settlement::Rejected(error))) => {
                        this.state = State::Ready(Some(Err(error)));
                    }
                    Poll::Ready(Ok(Settlement::Chained(next))) => {
                        this.state = next.state;
                    }
                    Poll::Ready(Err(_)) => {
                        this.state = State::Ready(Some(Err(OverlayError::Abandoned)));
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_from_task() {
        let (deferred, promise) = deferred();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            deferred.resolve(42);
        });
        assert_eq!(promise.await, Ok(42));
    }

    #[tokio::test]
    async fn test_chained_resolution_adopts_inner_outcome() {
        let (outer, outer_promise) = deferred();
        let (inner, inner_promise) = deferred();

        outer.resolve_with(inner_promise);
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            inner.resolve("inner");
        });

        assert_eq!(outer_promise.await, Ok("inner"));
    }

    #[tokio::test]
    async fn test_long_chain_stays_flat() {
        let (first, promise) = deferred::<u32>();
        let mut current = first;
        for _ in 0..1_000 {
            let (next, next_promise) = deferred();
            current.resolve_with(next_promise);
            current = next;
        }
        current.resolve(7);
        assert_eq!(promise.await, Ok(7));
    }

    #[tokio::test]
    async fn test_dropped_deferred_is_abandoned() {
        let (deferred, promise) = deferred::<()>();
        drop(deferred);
        assert_eq!(promise.await, Err(OverlayError::Abandoned));
    }

    #[tokio::test]
    async fn test_rejection() {
        let (deferred, promise) = deferred::<()>();
        deferred.reject(OverlayError::Removed);
        assert_eq!(promise.await, Err(OverlayError::Removed));
    }

    #[tokio::test]
    async fn test_abandoned_when_reader_dropped() {
        let (mut deferred, promise) = deferred::<()>();
        let still_listening =
            tokio::time::timeout(std::time::Duration::from_millis(10), deferred.abandoned()).await;
        assert!(still_listening.is_err());
        drop(promise);
        deferred.abandoned().await;
    }
}
