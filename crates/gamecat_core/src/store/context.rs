//! Background execution context owning the write connection.

use super::pending::Pending;
use super::StoreResult;
use log::{error, info};
use rusqlite::Connection;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};

type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

/// Dedicated worker thread that runs store jobs one at a time, in order.
pub(crate) struct BackgroundContext {
    sender: Option<mpsc::UnboundedSender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundContext {
    pub(crate) fn spawn(store_name: &str, mut conn: Connection) -> std::io::Result<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let thread_name = format!("gamecat-store-{store_name}");
        let worker = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    job(&mut conn);
                }
                info!("event=store_context_stop module=store status=ok thread={thread_name}");
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Queues `operation` and returns its single-shot result.
    pub(crate) fn execute<T, F>(&self, operation: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let Some(sender) = self.sender.as_ref() else {
            return Pending::closed();
        };

        let (reply, receiver) = oneshot::channel();
        let job: Job = Box::new(move |conn| {
            // Receiver may be gone when the caller dropped its handle.
            let _ = reply.send(operation(conn));
        });

        if sender.send(job).is_err() {
            error!("event=store_execute module=store status=error error_code=context_closed");
            return Pending::closed();
        }
        Pending::waiting(receiver)
    }
}

impl Drop for BackgroundContext {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain queued jobs and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=store_context_stop module=store status=error error_code=worker_panicked");
            }
        }
    }
}
