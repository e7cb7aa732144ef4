//! Spawned work that its owner can abandon.
//!
//! A [`CancellableTask`] runs a future on the Tokio runtime behind an
//! [`Abortable`] wrapper. Cancelling stops the future at its next suspension
//! point; awaiting the task afterwards yields [`TaskCancelled`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::{AbortHandle, Abortable, Aborted};
use tokio::task::{JoinError, JoinHandle};

/// Returned when awaiting a task that was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("task was cancelled before it completed")]
pub struct TaskCancelled;

/// Handle to a spawned, abortable future.
#[derive(Debug)]
pub struct CancellableTask<T> {
    handle: JoinHandle<Result<T, Aborted>>,
    abort: AbortHandle,
}

impl<T> CancellableTask<T>
where
    T: Send + 'static,
{
    /// Spawn `future` on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (abort, registration) = AbortHandle::new_pair();
        let handle = tokio::spawn(Abortable::new(future, registration));
        Self { handle, abort }
    }
}

impl<T> CancellableTask<T> {
    /// Stop the task. Has no effect once it has finished.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.abort.is_aborted()
    }
}

fn settle<T>(joined: Result<Result<T, Aborted>, JoinError>) -> Result<T, TaskCancelled> {
    match joined {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(Aborted)) => Err(TaskCancelled),
        Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
        Err(_) => Err(TaskCancelled),
    }
}

impl<T> Future for CancellableTask<T> {
    type Output = Result<T, TaskCancelled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(settle)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn completed_tasks_yield_their_output() {
        let task = CancellableTask::spawn(async { 21 * 2 });
        assert_eq!(task.await, Ok(42));
    }

    #[tokio::test]
    async fn cancelled_tasks_yield_task_cancelled() {
        let (_keep_open, never) = oneshot::channel::<()>();
        let task = CancellableTask::spawn(async move {
            let _ = never.await;
            "finished"
        });

        task.cancel();

        assert!(task.is_cancelled());
        assert_eq!(task.await, Err(TaskCancelled));
    }

    #[tokio::test]
    async fn cancelling_after_completion_keeps_the_output() {
        let task = CancellableTask::spawn(async { "done" });
        tokio::time::sleep(Duration::from_millis(10)).await;

        task.cancel();

        assert_eq!(task.await, Ok("done"));
    }
}
