#![allow(dead_code)]

use flowdag::config::{ConfigFile, QueueSection, RawConfigFile};
use flowdag::{DrainPolicy, Priority, Task};

/// Builder for `Task<String>` to simplify test setup.
pub struct TaskBuilder {
    payload: String,
    reads: Vec<String>,
    writes: Vec<String>,
    priority: Priority,
}

impl TaskBuilder {
    pub fn new(payload: &str) -> Self {
        Self {
            payload: payload.to_string(),
            reads: Vec::new(),
            writes: Vec::new(),
            priority: 0,
        }
    }

    pub fn read(mut self, component: &str) -> Self {
        self.reads.push(component.to_string());
        self
    }

    pub fn write(mut self, component: &str) -> Self {
        self.writes.push(component.to_string());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn build(self) -> Task<String> {
        Task {
            payload: self.payload,
            reads: self.reads.into_iter().collect(),
            writes: self.writes.into_iter().collect(),
            priority: self.priority,
        }
    }
}

/// Builder for `ConfigFile`.
pub struct ConfigFileBuilder {
    queue: QueueSection,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            queue: QueueSection::default(),
        }
    }

    pub fn drain_policy(mut self, policy: DrainPolicy) -> Self {
        self.queue.drain_policy = policy;
        self
    }

    pub fn merge_on_enqueue(mut self, val: bool) -> Self {
        self.queue.merge_on_enqueue = val;
        self
    }

    pub fn exit_when_drained(mut self, val: bool) -> Self {
        self.queue.exit_when_drained = val;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.queue.channel_capacity = capacity;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(RawConfigFile { queue: self.queue })
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
