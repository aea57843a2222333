// src/sched/merge.rs

//! Instruction merging: the rewriter contract, interest sets, and candidate
//! discovery.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::sched::graph::{InstrId, InstructionGraph};
use crate::sched::task::Task;

/// External policy object offering fused replacements for compatible task
/// pairs.
///
/// Both methods must be pure: same arguments, same result, no side effects.
/// `maybe_rewrite` receives the writer first and the reader second, and may
/// only return a task whose execution is indistinguishable from executing
/// `first` then `second`. The scheduler cannot check this; scheduling
/// behaviour is undefined if it is violated.
pub trait Rewriter<P>: Send {
    /// Whether this rewriter wants `task` tracked in its interest set.
    fn is_of_interest(&self, task: &Task<P>) -> bool;

    /// Offer a writer/reader pair for fusion.
    fn maybe_rewrite(&self, first: &Task<P>, second: &Task<P>) -> Option<Task<P>>;
}

/// A fusion found by [`Merger::find_merge`], to be effected by the queue.
#[derive(Debug)]
pub struct MergeProposal<P> {
    pub first: InstrId,
    pub second: InstrId,
    pub fused: Task<P>,
}

/// Holds registered rewriters and their interest sets over pending
/// instructions.
pub struct Merger<P> {
    rewriters: Vec<Box<dyn Rewriter<P>>>,
    /// One interest set per rewriter, same index.
    interest: Vec<HashSet<InstrId>>,
}

impl<P> Merger<P> {
    pub fn new() -> Self {
        Self {
            rewriters: Vec::new(),
            interest: Vec::new(),
        }
    }

    /// Register a rewriter; it participates in merge decisions from now on.
    ///
    /// The new interest set is seeded from every instruction already
    /// pending, so merge behaviour does not depend on how registration
    /// interleaves with enqueues. Rewriters are never removed.
    pub fn register(&mut self, rewriter: Box<dyn Rewriter<P>>, graph: &InstructionGraph<P>) {
        let mut interested = HashSet::new();
        for id in graph.ids() {
            if rewriter.is_of_interest(graph.task(id)) {
                interested.insert(id);
            }
        }

        debug!(
            rewriter = self.rewriters.len(),
            seeded = interested.len(),
            "rewriter registered"
        );

        self.rewriters.push(rewriter);
        self.interest.push(interested);
    }

    pub fn rewriter_count(&self) -> usize {
        self.rewriters.len()
    }

    /// Track a newly created instruction in the interest sets that want it.
    pub fn introduce(&mut self, graph: &InstructionGraph<P>, id: InstrId) {
        let task = graph.task(id);
        for (rewriter, interested) in self.rewriters.iter().zip(self.interest.iter_mut()) {
            if rewriter.is_of_interest(task) {
                interested.insert(id);
            }
        }
    }

    /// Drop a completed or superseded instruction from every interest set.
    pub fn forget(&mut self, id: InstrId) {
        for interested in &mut self.interest {
            interested.remove(&id);
        }
    }

    /// Search for a fusion of `first` with one of its dependents.
    ///
    /// Candidates are read-after-write only: dependents of `first`, visited
    /// in id order. For each candidate passing the safety predicate,
    /// rewriters are consulted in registration order; the earliest fused
    /// task wins.
    pub fn find_merge(
        &self,
        graph: &InstructionGraph<P>,
        first: InstrId,
    ) -> Option<MergeProposal<P>> {
        for second in graph.dependents_sorted(first) {
            if !can_merge_raw(graph, first, second) {
                continue;
            }

            for (rewriter, interested) in self.rewriters.iter().zip(self.interest.iter()) {
                if !interested.contains(&first) || !interested.contains(&second) {
                    continue;
                }
                if let Some(fused) = rewriter.maybe_rewrite(graph.task(first), graph.task(second))
                {
                    return Some(MergeProposal {
                        first,
                        second,
                        fused,
                    });
                }
            }
        }

        None
    }

    /// Whether any interest set tracks `id`, for tests and diagnostics.
    pub fn is_tracked(&self, id: InstrId) -> bool {
        self.interest.iter().any(|set| set.contains(&id))
    }
}

impl<P> Default for Merger<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Merger<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merger")
            .field("rewriters", &self.rewriters.len())
            .field("interest", &self.interest)
            .finish()
    }
}

/// Whether fusing `first` into its reader `second` preserves dependency
/// semantics.
///
/// For every other dependent `k` of `first`:
/// - `k`'s reads must not intersect `second`'s writes, and
/// - `k` must not be an ancestor of `second`;
///
/// otherwise the splice would order a sibling read after the fused write,
/// or close a cycle through `second`.
pub fn can_merge_raw<P>(graph: &InstructionGraph<P>, first: InstrId, second: InstrId) -> bool {
    let second_task = graph.task(second);
    let second_deps = graph.deps(second);

    for k in graph.dependents(first) {
        if *k == second {
            continue;
        }

        let k_task = graph.task(*k);
        if k_task
            .reads
            .iter()
            .any(|component| second_task.writes.contains(component))
        {
            return false;
        }
        if second_deps.contains(k) {
            return false;
        }
    }

    true
}
