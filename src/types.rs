use std::str::FromStr;
use serde::Deserialize;

/// When the runtime shell drains runnable tasks out of the queue.
///
/// - `Eager`: drain after every submission (default behaviour). Tasks reach
///   the executor as soon as they become runnable.
/// - `Batched`: only drain on an explicit `DrainRequested` event. Producers
///   that submit several related tasks back-to-back give the instruction
///   merger its window before anything is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainPolicy {
    Eager,
    Batched,
}

impl Default for DrainPolicy {
    fn default() -> Self {
        DrainPolicy::Eager
    }
}

impl FromStr for DrainPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eager" => Ok(DrainPolicy::Eager),
            "batched" => Ok(DrainPolicy::Batched),
            other => Err(format!(
                "invalid drain_policy: {other} (expected \"eager\" or \"batched\")"
            )),
        }
    }
}
