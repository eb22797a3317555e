//! Single-shot result handle for background store operations.

use super::{StoreError, StoreResult};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Resolves exactly once with the outcome of one store operation.
///
/// The operation is already queued when this handle is returned; dropping
/// the handle does not cancel it.
#[must_use = "store operations report their outcome through the returned future"]
pub struct Pending<T> {
    state: PendingState<T>,
}

enum PendingState<T> {
    Waiting(oneshot::Receiver<StoreResult<T>>),
    Closed,
}

impl<T> Pending<T> {
    pub(crate) fn waiting(receiver: oneshot::Receiver<StoreResult<T>>) -> Self {
        Self {
            state: PendingState::Waiting(receiver),
        }
    }

    pub(crate) fn closed() -> Self {
        Self {
            state: PendingState::Closed,
        }
    }
}

impl<T> Future for Pending<T> {
    type Output = StoreResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            PendingState::Waiting(receiver) => Pin::new(receiver)
                .poll(cx)
                .map(|outcome| outcome.unwrap_or(Err(StoreError::ContextClosed))),
            PendingState::Closed => Poll::Ready(Err(StoreError::ContextClosed)),
        }
    }
}
