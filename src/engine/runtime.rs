// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::sched::Task;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drives the task queue in response to `RuntimeEvent`s, and delegates
/// actual task execution to an `ExecutorBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics. This struct handles async IO: reading events from
/// channels and forwarding dispatched tasks to the executor.
pub struct Runtime<P, E: ExecutorBackend<P>> {
    core: CoreRuntime<P>,
    event_rx: mpsc::Receiver<RuntimeEvent<P>>,
    executor: E,
}

impl<P, E: ExecutorBackend<P>> fmt::Debug for Runtime<P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").finish_non_exhaustive()
    }
}

impl<P, E: ExecutorBackend<P>> Runtime<P, E> {
    pub fn new(
        core: CoreRuntime<P>,
        event_rx: mpsc::Receiver<RuntimeEvent<P>>,
        executor: E,
    ) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (dispatch tasks, exit).
    pub async fn run(mut self) -> Result<()> {
        info!("flowdag runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(event = event.kind(), "runtime received event");

            // Feed the event into the pure core and get commands back.
            let step = self.core.step(event);

            // Execute the commands.
            for command in step.commands {
                self.execute_command(command).await?;
            }

            // If the core says to stop, break out of the loop.
            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand<P>) -> Result<()> {
        match command {
            CoreCommand::DispatchTasks(tasks) => {
                self.dispatch(tasks).await?;
            }
            CoreCommand::RequestExit => {
                // The core already returns keep_running=false in this case;
                // the command exists so shells can hook extra teardown.
                info!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, tasks: Vec<Task<P>>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        debug!(count = tasks.len(), "dispatching runnable tasks");

        self.executor.run_tasks(tasks).await
    }
}
