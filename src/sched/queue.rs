// src/sched/queue.rs

//! The public task queue: dependency construction, dispatch, merging.

use std::fmt;

use tracing::{debug, info};

use crate::errors::{FlowdagError, Result};
use crate::sched::graph::{InstrId, InstructionGraph};
use crate::sched::merge::{MergeProposal, Merger, Rewriter};
use crate::sched::ready::ReadyQueue;
use crate::sched::task::Task;

/// Queue construction options.
#[derive(Debug, Clone, Copy)]
pub struct QueueOptions {
    /// Offer the merger a fusion opportunity on every enqueue.
    pub merge_on_enqueue: bool,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            merge_on_enqueue: true,
        }
    }
}

/// Data-flow task queue.
///
/// It is responsible for:
/// - deriving dependency edges from task read/write sets on enqueue
/// - admitting instructions with no unmet dependencies to the ready queue
/// - selecting the next runnable task, favouring higher priorities
/// - releasing dependents the moment a task is handed to the consumer
/// - offering enqueued instructions to the merger
///
/// All operations run on the caller's thread and never block; `dequeue`
/// returns `None` when nothing is runnable.
pub struct TaskQueue<P> {
    graph: InstructionGraph<P>,
    ready: ReadyQueue,
    merger: Merger<P>,
    options: QueueOptions,
}

impl<P> TaskQueue<P> {
    pub fn new() -> Self {
        Self::with_options(QueueOptions::default())
    }

    pub fn with_options(options: QueueOptions) -> Self {
        Self {
            graph: InstructionGraph::new(),
            ready: ReadyQueue::new(),
            merger: Merger::new(),
            options,
        }
    }

    /// Submit a task.
    ///
    /// Builds dependency edges against the latest writer of every component
    /// the task touches, admits the instruction to the ready queue when it
    /// has no unmet dependencies, and offers the merger a fusion window.
    ///
    /// Fails with [`FlowdagError::InvalidComponent`] if any component
    /// identifier is empty; the queue is left untouched in that case.
    pub fn enqueue(&mut self, task: Task<P>) -> Result<()> {
        validate_components(&task)?;

        let priority = task.priority;
        let id = self.graph.insert(task);

        if self.graph.is_eligible(id) {
            self.ready.push(priority, id);
            debug!(id = %id, priority, "instruction admitted to ready queue");
        }

        self.merger.introduce(&self.graph, id);

        if self.options.merge_on_enqueue {
            self.offer_merges(id);
        }

        Ok(())
    }

    /// Select the next runnable task, or `None` when nothing is runnable.
    ///
    /// The selected instruction is completed *before* its task is returned:
    /// dependents are released immediately, and the scheduler takes no
    /// further interest in the task's actual execution. A producer needing
    /// happens-after ordering with a successor must encode it via component
    /// sets.
    pub fn dequeue(&mut self) -> Option<Task<P>> {
        let id = self.ready.pop()?;
        Some(self.complete(id))
    }

    /// Add a rewriter; it participates in merge decisions from now on.
    pub fn register_rewriter(&mut self, rewriter: Box<dyn Rewriter<P>>) {
        self.merger.register(rewriter, &self.graph);
    }

    /// True iff no instruction is currently runnable.
    ///
    /// Every blocked instruction has an eligible ancestor, so an empty
    /// ready queue implies an empty graph.
    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    /// Number of live (pending) instructions.
    pub fn pending(&self) -> usize {
        self.graph.len()
    }

    /// Number of runnable instructions.
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Panic if any structural invariant is broken.
    ///
    /// Checks the edge mirrors, acyclicity, and that the ready queue holds
    /// exactly the eligible instructions. Exposed for tests and diagnostics.
    pub fn assert_invariants(&self) {
        assert!(
            self.graph.is_consistent(),
            "instruction graph inconsistent"
        );

        let mut eligible: Vec<InstrId> = self
            .graph
            .ids()
            .into_iter()
            .filter(|&id| self.graph.is_eligible(id))
            .collect();
        eligible.sort();

        assert_eq!(
            self.ready.queued_ids(),
            eligible,
            "ready queue diverged from the eligible set"
        );
    }

    /// Complete `id`: notify the merger, release dependents, hand back the
    /// task.
    fn complete(&mut self, id: InstrId) -> Task<P> {
        self.merger.forget(id);

        let completion = self.graph.complete(id);
        for unblocked in completion.newly_eligible {
            let priority = self.graph.task(unblocked).priority;
            self.ready.push(priority, unblocked);
            debug!(id = %unblocked, priority, "instruction admitted to ready queue");
        }

        completion.task
    }

    /// Offer the merger fusion opportunities created by instruction `id`.
    ///
    /// Each current writer of `id` is offered as the merge `first`. When a
    /// fusion consumes `id` itself the offer follows the fused instruction,
    /// since the splice may have created fresh writer/reader adjacencies.
    /// Terminates: every fusion removes one instruction from the graph.
    fn offer_merges(&mut self, mut id: InstrId) {
        'searching: loop {
            for writer in self.graph.deps_sorted(id) {
                if let Some(proposal) = self.merger.find_merge(&self.graph, writer) {
                    let consumed_self = proposal.second == id;
                    let merged = self.apply_merge(proposal);
                    if consumed_self {
                        id = merged;
                    }
                    continue 'searching;
                }
            }
            break;
        }
    }

    /// Effect a fusion found by the merger.
    fn apply_merge(&mut self, proposal: MergeProposal<P>) -> InstrId {
        let MergeProposal {
            first,
            second,
            fused,
        } = proposal;

        info!(first = %first, second = %second, "fusing writer/reader instruction pair");

        // Only `first` can be runnable; `second` depends on it by construction.
        debug_assert!(!self.graph.is_eligible(second));
        if self.graph.is_eligible(first) {
            let priority = self.graph.task(first).priority;
            let retired = self.ready.retire(priority, first);
            assert!(retired, "eligible instruction missing from ready queue");
        }

        let priority = fused.priority;
        let merged = self.graph.splice_merge(first, second, fused);

        self.merger.forget(first);
        self.merger.forget(second);
        self.merger.introduce(&self.graph, merged);

        if self.graph.is_eligible(merged) {
            self.ready.push(priority, merged);
            debug!(id = %merged, priority, "instruction admitted to ready queue");
        }

        merged
    }
}

impl<P> Default for TaskQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for TaskQueue<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.graph.len())
            .field("ready", &self.ready.len())
            .field("rewriters", &self.merger.rewriter_count())
            .finish_non_exhaustive()
    }
}

fn validate_components<P>(task: &Task<P>) -> Result<()> {
    for component in task.reads.iter().chain(task.writes.iter()) {
        if component.is_empty() {
            return Err(FlowdagError::InvalidComponent(
                "component identifiers must be non-empty".to_string(),
            ));
        }
    }
    Ok(())
}
