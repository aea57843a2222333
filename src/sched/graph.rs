// src/sched/graph.rs

//! Mutable instruction graph with latest-writer dependency derivation.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::sched::task::Task;
use crate::sched::ComponentId;

/// Handle to a live instruction in the graph.
///
/// Ids are allocated from a monotonically increasing counter, so ordering by
/// id is ordering by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrId(u64);

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// Internal node structure: the wrapped task plus both edge directions.
#[derive(Debug)]
struct InstrNode<P> {
    task: Task<P>,
    /// Instructions that must complete before this one.
    deps: HashSet<InstrId>,
    /// Instructions waiting on this one.
    dependents: HashSet<InstrId>,
}

/// Result of completing an instruction.
#[derive(Debug)]
pub struct Completion<P> {
    pub task: Task<P>,
    /// Dependents whose dependency sets became empty, in id order.
    pub newly_eligible: Vec<InstrId>,
}

/// Instruction arena plus dependency bookkeeping.
///
/// `deps` and `dependents` are exact mirrors at all times; every mutation
/// goes through helpers that update both sides. The latest-writer map is
/// only consulted during insertion; entries are cleared on completion when
/// still pointing at the completing instruction.
#[derive(Debug)]
pub struct InstructionGraph<P> {
    nodes: HashMap<InstrId, InstrNode<P>>,
    /// Most recent still-pending writer per component.
    latest_writer: HashMap<ComponentId, InstrId>,
    /// Monotonically increasing id source.
    next_id: u64,
}

impl<P> InstructionGraph<P> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            latest_writer: HashMap::new(),
            next_id: 0,
        }
    }

    /// Wrap `task` in a new instruction and wire its dependency edges.
    ///
    /// For every component the task reads or writes, the current latest
    /// writer (if any) becomes a dependency. Written components then adopt
    /// the new instruction as their latest writer; prior writers keep the
    /// dependents they already accumulated.
    pub fn insert(&mut self, task: Task<P>) -> InstrId {
        let id = InstrId(self.next_id);
        self.next_id += 1;

        let mut deps = HashSet::new();
        for component in task.reads.iter().chain(task.writes.iter()) {
            if let Some(&writer) = self.latest_writer.get(component) {
                deps.insert(writer);
            }
        }

        for dep in &deps {
            let writer = self
                .nodes
                .get_mut(dep)
                .expect("latest-writer map points at a live instruction");
            writer.dependents.insert(id);
        }

        for component in &task.writes {
            self.latest_writer.insert(component.clone(), id);
        }

        debug!(
            id = %id,
            deps = deps.len(),
            priority = task.priority,
            "instruction created"
        );

        self.nodes.insert(
            id,
            InstrNode {
                task,
                deps,
                dependents: HashSet::new(),
            },
        );

        id
    }

    pub fn contains(&self, id: InstrId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn task(&self, id: InstrId) -> &Task<P> {
        &self.node(id).task
    }

    /// Whether the instruction has no unmet dependencies.
    pub fn is_eligible(&self, id: InstrId) -> bool {
        self.node(id).deps.is_empty()
    }

    pub fn deps(&self, id: InstrId) -> &HashSet<InstrId> {
        &self.node(id).deps
    }

    pub fn dependents(&self, id: InstrId) -> &HashSet<InstrId> {
        &self.node(id).dependents
    }

    /// Dependencies of `id`, in id order.
    pub fn deps_sorted(&self, id: InstrId) -> Vec<InstrId> {
        let mut deps: Vec<InstrId> = self.node(id).deps.iter().copied().collect();
        deps.sort();
        deps
    }

    /// Dependents of `id`, in id order.
    pub fn dependents_sorted(&self, id: InstrId) -> Vec<InstrId> {
        let mut dependents: Vec<InstrId> = self.node(id).dependents.iter().copied().collect();
        dependents.sort();
        dependents
    }

    /// All live instruction ids, in id order.
    pub fn ids(&self) -> Vec<InstrId> {
        let mut ids: Vec<InstrId> = self.nodes.keys().copied().collect();
        ids.sort();
        ids
    }

    /// The latest still-pending writer of `component`, if any.
    pub fn latest_writer_of(&self, component: &str) -> Option<InstrId> {
        self.latest_writer.get(component).copied()
    }

    /// Remove `id` from the graph, severing its edges.
    ///
    /// Dependents lose their edge to `id`; those left with an empty
    /// dependency set are reported as newly eligible. Latest-writer entries
    /// still pointing at `id` are cleared.
    pub fn complete(&mut self, id: InstrId) -> Completion<P> {
        let node = self
            .nodes
            .remove(&id)
            .expect("completed instruction is live");
        assert!(
            node.deps.is_empty(),
            "completed an instruction with unmet dependencies"
        );

        let mut newly_eligible = Vec::new();
        for dependent in &node.dependents {
            let dep_node = self
                .nodes
                .get_mut(dependent)
                .expect("dependent edges point at live instructions");
            let removed = dep_node.deps.remove(&id);
            assert!(removed, "dependency sets are mutual mirrors");
            if dep_node.deps.is_empty() {
                newly_eligible.push(*dependent);
            }
        }
        newly_eligible.sort();

        for component in &node.task.writes {
            if self.latest_writer.get(component) == Some(&id) {
                self.latest_writer.remove(component);
            }
        }

        debug!(
            id = %id,
            unblocked = newly_eligible.len(),
            "instruction completed"
        );

        Completion {
            task: node.task,
            newly_eligible,
        }
    }

    /// Replace `first` and `second` with a single fused instruction.
    ///
    /// The fused instruction inherits the union of both ancestor sets and
    /// the union of both dependent sets (minus the pair itself), with every
    /// mirror set updated. Latest-writer entries pointing at either original
    /// move to the fused instruction when it still writes the component, and
    /// are dropped otherwise.
    pub fn splice_merge(&mut self, first: InstrId, second: InstrId, fused: Task<P>) -> InstrId {
        let first_node = self.nodes.remove(&first).expect("merge first is live");
        let second_node = self.nodes.remove(&second).expect("merge second is live");

        let id = InstrId(self.next_id);
        self.next_id += 1;

        let mut deps: HashSet<InstrId> = first_node
            .deps
            .union(&second_node.deps)
            .copied()
            .collect();
        deps.remove(&first);
        deps.remove(&second);

        let mut dependents: HashSet<InstrId> = first_node
            .dependents
            .union(&second_node.dependents)
            .copied()
            .collect();
        dependents.remove(&first);
        dependents.remove(&second);

        for ancestor in &deps {
            let node = self
                .nodes
                .get_mut(ancestor)
                .expect("ancestor edges point at live instructions");
            node.dependents.remove(&first);
            node.dependents.remove(&second);
            node.dependents.insert(id);
        }

        for dependent in &dependents {
            let node = self
                .nodes
                .get_mut(dependent)
                .expect("dependent edges point at live instructions");
            node.deps.remove(&first);
            node.deps.remove(&second);
            node.deps.insert(id);
        }

        let stale: Vec<ComponentId> = self
            .latest_writer
            .iter()
            .filter(|(_, writer)| **writer == first || **writer == second)
            .map(|(component, _)| component.clone())
            .collect();
        for component in stale {
            if fused.writes.contains(&component) {
                self.latest_writer.insert(component, id);
            } else {
                self.latest_writer.remove(&component);
            }
        }

        debug!(
            first = %first,
            second = %second,
            merged = %id,
            "instruction pair spliced"
        );

        self.nodes.insert(
            id,
            InstrNode {
                task: fused,
                deps,
                dependents,
            },
        );

        debug_assert!(self.is_consistent(), "merge splice broke the graph");

        id
    }

    /// Check structural invariants: mirror symmetry of the two edge
    /// directions, latest-writer liveness, and acyclicity.
    ///
    /// A `false` here is a programming error; callers should treat it as
    /// fatal rather than attempt recovery.
    pub fn is_consistent(&self) -> bool {
        for (id, node) in &self.nodes {
            for dep in &node.deps {
                match self.nodes.get(dep) {
                    Some(dep_node) if dep_node.dependents.contains(id) => {}
                    _ => return false,
                }
            }
            for dependent in &node.dependents {
                match self.nodes.get(dependent) {
                    Some(dep_node) if dep_node.deps.contains(id) => {}
                    _ => return false,
                }
            }
        }

        for writer in self.latest_writer.values() {
            if !self.nodes.contains_key(writer) {
                return false;
            }
        }

        // Edge direction: dependency -> dependent. A topological sort fails
        // iff the graph has a cycle.
        let mut graph: DiGraphMap<InstrId, ()> = DiGraphMap::new();
        for id in self.nodes.keys() {
            graph.add_node(*id);
        }
        for (id, node) in &self.nodes {
            for dep in &node.deps {
                graph.add_edge(*dep, *id, ());
            }
        }

        toposort(&graph, None).is_ok()
    }

    fn node(&self, id: InstrId) -> &InstrNode<P> {
        self.nodes
            .get(&id)
            .expect("instruction handle refers to a live instruction")
    }
}

impl<P> Default for InstructionGraph<P> {
    fn default() -> Self {
        Self::new()
    }
}
