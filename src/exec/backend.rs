// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! Dequeue completes an instruction before its task is handed over, so the
//! backend owes the scheduler nothing back: no completion events, no
//! cancellation, no per-task bookkeeping. All that is left of the execution
//! concern is delivering tasks to one consumer without reordering them. The
//! trait captures exactly that, which is also why tests can fake it with a
//! recording vector and lose nothing.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::errors::{Error, Result};
use crate::sched::Task;

use super::consumer::spawn_consumer;

/// How the runtime hands dispatched tasks to their consumer.
///
/// Implementations must preserve dispatch order across calls; the
/// scheduler's dependency guarantees assume it. Backpressure is the
/// implementation's business: `run_tasks` may suspend until the consumer
/// has room.
pub trait ExecutorBackend<P>: Send {
    /// Deliver `tasks` for execution, in order.
    fn run_tasks(
        &mut self,
        tasks: Vec<Task<P>>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Default backend: bridges the runtime to the single-threaded consumer
/// loop.
///
/// One bounded channel is the whole implementation. Ordering comes from the
/// channel FIFO, backpressure from its capacity, and there is nothing to
/// cancel because every dispatched task is already complete as far as the
/// queue is concerned.
pub struct ChannelExecutorBackend<P> {
    consumer_tx: mpsc::Sender<Task<P>>,
}

impl<P: Send + 'static> ChannelExecutorBackend<P> {
    /// Spawn a consumer loop applying `handler` to each delivered task and
    /// wire a backend to it.
    pub fn new<F>(handler: F) -> Self
    where
        F: FnMut(Task<P>) + Send + 'static,
    {
        Self {
            consumer_tx: spawn_consumer(handler),
        }
    }

    /// Wire a backend to an already-running consumer channel.
    pub fn from_sender(consumer_tx: mpsc::Sender<Task<P>>) -> Self {
        Self { consumer_tx }
    }
}

impl<P: Send + 'static> ExecutorBackend<P> for ChannelExecutorBackend<P> {
    fn run_tasks(
        &mut self,
        tasks: Vec<Task<P>>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Sends go through an owned sender so the pending future does not
        // keep `self` mutably borrowed while it waits for channel capacity.
        let consumer_tx = self.consumer_tx.clone();

        Box::pin(async move {
            for task in tasks {
                if consumer_tx.send(task).await.is_err() {
                    return Err(Error::msg("consumer loop stopped; task channel closed").into());
                }
            }
            Ok(())
        })
    }
}
