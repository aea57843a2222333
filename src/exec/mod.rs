// src/exec/mod.rs

//! Task execution layer.
//!
//! The scheduler owns ordering only; execution belongs to the embedding
//! application. This module provides the seam between the two:
//!
//! - [`backend`] provides the `ExecutorBackend` trait and a concrete
//!   `ChannelExecutorBackend` that the runtime uses in production, and which
//!   tests can replace with a fake implementation.
//! - [`consumer`] owns the single-threaded consumer loop that applies a
//!   caller-supplied handler to each task in dispatch order.

pub mod backend;
pub mod consumer;

pub use backend::{ChannelExecutorBackend, ExecutorBackend};
pub use consumer::spawn_consumer;
