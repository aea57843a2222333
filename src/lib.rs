// src/lib.rs

//! Data-flow task scheduler.
//!
//! Producers submit [`Task`]s carrying an opaque payload, read/write
//! component sets, and an integer priority. The queue derives dependency
//! edges from a latest-writer map, keeps runnable instructions in a
//! priority-partitioned ready queue, lets registered [`Rewriter`]s fuse
//! compatible writer/reader pairs, and hands tasks back to a
//! single-threaded consumer in dependency-respecting order.
//!
//! The scheduler owns ordering, not execution: a task is complete from the
//! queue's point of view the moment [`TaskQueue::dequeue`] returns it.
//! Producers that need happens-after ordering between two tasks encode it
//! through overlapping component sets, never by waiting on execution.

pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod sched;
pub mod types;

pub use sched::{
    ComponentId, InstrId, Priority, PriorityGenerator, QueueOptions, Rewriter, Task, TaskQueue,
};
pub use types::DrainPolicy;
