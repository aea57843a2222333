// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::warn;

use crate::engine::RuntimeOptions;
use crate::sched::{Task, TaskQueue};
use crate::types::DrainPolicy;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug)]
pub enum CoreCommand<P> {
    /// Send these tasks to the executor, in order.
    DispatchTasks(Vec<Task<P>>),
    /// Request that the embedding loop exits.
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug)]
pub struct CoreStep<P> {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand<P>>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

/// Handle a producer submission.
///
/// A task with an invalid component set is rejected with a warning; queue
/// state is untouched. Under [`DrainPolicy::Eager`] every submission is
/// followed by a full drain, so runnable work reaches the executor
/// immediately; under [`DrainPolicy::Batched`] tasks accumulate until an
/// explicit drain, leaving the merger its window.
pub fn handle_task_submitted<P>(
    queue: &mut TaskQueue<P>,
    policy: DrainPolicy,
    task: Task<P>,
) -> CoreStep<P> {
    let mut commands = Vec::new();

    if let Err(err) = queue.enqueue(task) {
        warn!(error = %err, "rejecting submitted task");
    } else if policy == DrainPolicy::Eager {
        let runnable = drain_runnable(queue);
        if !runnable.is_empty() {
            commands.push(CoreCommand::DispatchTasks(runnable));
        }
    }

    CoreStep {
        commands,
        keep_running: true,
    }
}

/// Handle an explicit drain request.
pub fn handle_drain_requested<P>(
    queue: &mut TaskQueue<P>,
    options: &RuntimeOptions,
) -> CoreStep<P> {
    let mut commands = Vec::new();

    let runnable = drain_runnable(queue);
    if !runnable.is_empty() {
        commands.push(CoreCommand::DispatchTasks(runnable));
    }

    let mut keep_running = true;
    if options.exit_when_drained && queue.is_empty() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}

/// Pull tasks until the queue reports empty.
///
/// Completion is pre-emptive, so every dequeue may unblock further
/// instructions; the loop ends with an empty graph.
fn drain_runnable<P>(queue: &mut TaskQueue<P>) -> Vec<Task<P>> {
    let mut runnable = Vec::new();
    while let Some(task) = queue.dequeue() {
        runnable.push(task);
    }
    runnable
}
