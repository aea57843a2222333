// src/sched/task.rs

//! Task value type submitted by producers.

use std::collections::HashSet;

use crate::sched::{ComponentId, Priority};

/// A unit of work submitted to the queue.
///
/// The payload is opaque to the scheduler; ordering is derived entirely from
/// the read/write component sets. A task is frozen once enqueued: the
/// scheduler assumes payload, component sets and priority never change.
#[derive(Debug, Clone)]
pub struct Task<P> {
    /// What to execute; handed back verbatim on dequeue.
    pub payload: P,

    /// Components this task reads.
    pub reads: HashSet<ComponentId>,

    /// Components this task writes.
    pub writes: HashSet<ComponentId>,

    /// Scheduling priority.
    pub priority: Priority,
}

impl<P> Task<P> {
    /// A task with no component conflicts.
    pub fn new(payload: P, priority: Priority) -> Self {
        Self {
            payload,
            reads: HashSet::new(),
            writes: HashSet::new(),
            priority,
        }
    }

    /// True if this task declares no reads and no writes.
    pub fn is_independent(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty()
    }
}
