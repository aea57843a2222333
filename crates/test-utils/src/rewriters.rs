use flowdag::{Rewriter, Task};

/// Rewriter that fuses any writer/reader pair it is interested in by
/// joining payloads with `+`.
///
/// The fused task is a sound serialization of the pair: it reads what the
/// pair reads from the outside world (the reader's reads minus what the
/// writer produced), writes what either wrote, and takes the higher
/// priority.
pub struct FuseRewriter {
    prefix: Option<String>,
}

impl FuseRewriter {
    /// Interested in every task.
    pub fn any() -> Self {
        Self { prefix: None }
    }

    /// Interested only in payloads starting with `prefix`.
    pub fn matching(prefix: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
        }
    }
}

impl Rewriter<String> for FuseRewriter {
    fn is_of_interest(&self, task: &Task<String>) -> bool {
        match &self.prefix {
            Some(prefix) => task.payload.starts_with(prefix),
            None => true,
        }
    }

    fn maybe_rewrite(&self, first: &Task<String>, second: &Task<String>) -> Option<Task<String>> {
        let mut reads = first.reads.clone();
        reads.extend(second.reads.difference(&first.writes).cloned());

        let mut writes = first.writes.clone();
        writes.extend(second.writes.iter().cloned());

        Some(Task {
            payload: format!("{}+{}", first.payload, second.payload),
            reads,
            writes,
            priority: first.priority.max(second.priority),
        })
    }
}

/// Rewriter that declares interest in everything but never fuses.
///
/// Useful for asserting that merging is a pure offer: scheduling semantics
/// must not change when this rewriter is registered.
pub struct DeclineRewriter;

impl Rewriter<String> for DeclineRewriter {
    fn is_of_interest(&self, _task: &Task<String>) -> bool {
        true
    }

    fn maybe_rewrite(&self, _first: &Task<String>, _second: &Task<String>) -> Option<Task<String>> {
        None
    }
}
