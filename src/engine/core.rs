// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - forwarding dispatched tasks to the executor backend
//! - handling shutdown
//!
//! The core is intended to be extensively tested without any Tokio,
//! channels, or IO.

use crate::engine::event_handlers::{handle_drain_requested, handle_task_submitted, CoreStep};
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::sched::{Rewriter, TaskQueue};
use crate::types::DrainPolicy;

/// Pure core runtime state.
///
/// This owns:
/// - the task queue
/// - the drain policy
/// - runtime options (e.g. `exit_when_drained`)
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime<P> {
    queue: TaskQueue<P>,
    policy: DrainPolicy,
    options: RuntimeOptions,
}

impl<P> CoreRuntime<P> {
    pub fn new(queue: TaskQueue<P>, policy: DrainPolicy, options: RuntimeOptions) -> Self {
        Self {
            queue,
            policy,
            options,
        }
    }

    /// Add a rewriter to the underlying queue.
    pub fn register_rewriter(&mut self, rewriter: Box<dyn Rewriter<P>>) {
        self.queue.register_rewriter(rewriter);
    }

    /// Expose queue emptiness (for tests).
    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Expose the number of pending instructions (for tests).
    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent<P>) -> CoreStep<P> {
        match event {
            RuntimeEvent::TaskSubmitted { task } => {
                handle_task_submitted(&mut self.queue, self.policy, task)
            }
            RuntimeEvent::DrainRequested => {
                handle_drain_requested(&mut self.queue, &self.options)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
