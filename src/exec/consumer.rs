// src/exec/consumer.rs

//! Single-threaded task consumer loop.

use tokio::sync::mpsc;
use tracing::info;

use crate::sched::Task;

/// Spawn the background consumer loop.
///
/// The returned sender is what the channel backend forwards dispatched
/// tasks into. Tasks are applied to `handler` strictly in the order they
/// were dispatched, so the scheduler's ordering guarantees carry through to
/// handler invocations.
pub fn spawn_consumer<P, F>(mut handler: F) -> mpsc::Sender<Task<P>>
where
    P: Send + 'static,
    F: FnMut(Task<P>) + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Task<P>>(32);

    tokio::spawn(async move {
        info!("consumer loop started");

        while let Some(task) = rx.recv().await {
            handler(task);
        }

        info!("consumer loop finished (channel closed)");
    });

    tx
}
