// src/config/model.rs

use serde::Deserialize;

use crate::engine::RuntimeOptions;
use crate::sched::QueueOptions;
use crate::types::DrainPolicy;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [queue]
/// drain_policy = "eager"
/// merge_on_enqueue = true
/// exit_when_drained = false
/// channel_capacity = 64
/// ```
///
/// All fields are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Queue and runtime behaviour from `[queue]`.
    #[serde(default)]
    pub queue: QueueSection,
}

/// `[queue]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSection {
    /// `"eager"` or `"batched"`.
    ///
    /// - `"eager"` (default): drain and dispatch after every submission.
    /// - `"batched"`: only drain on an explicit drain request, leaving the
    ///   instruction merger its window.
    #[serde(default)]
    pub drain_policy: DrainPolicy,

    /// Offer the merger a fusion opportunity on every enqueue.
    #[serde(default = "default_merge_on_enqueue")]
    pub merge_on_enqueue: bool,

    /// Stop the runtime once an explicit drain leaves the queue empty
    /// (run-to-completion embeddings).
    #[serde(default)]
    pub exit_when_drained: bool,

    /// Capacity of the runtime event channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_merge_on_enqueue() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            drain_policy: DrainPolicy::default(),
            merge_on_enqueue: default_merge_on_enqueue(),
            exit_when_drained: false,
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Validated configuration; constructed via `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub queue: QueueSection,
}

impl ConfigFile {
    /// Internal constructor used after validation.
    pub(crate) fn new_unchecked(queue: QueueSection) -> Self {
        Self { queue }
    }

    /// Queue construction options derived from this config.
    pub fn queue_options(&self) -> QueueOptions {
        QueueOptions {
            merge_on_enqueue: self.queue.merge_on_enqueue,
        }
    }

    /// Runtime options derived from this config.
    pub fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            exit_when_drained: self.queue.exit_when_drained,
        }
    }
}
