use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use flowdag::errors::Result;
use flowdag::exec::ExecutorBackend;
use flowdag::Task;

/// A fake executor that records the payloads of dispatched tasks without
/// running anything.
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<String>>>,
}

impl FakeExecutor {
    pub fn new(executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self { executed }
    }
}

impl ExecutorBackend<String> for FakeExecutor {
    fn run_tasks(
        &mut self,
        tasks: Vec<Task<String>>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let executed = Arc::clone(&self.executed);

        Box::pin(async move {
            let mut guard = executed.lock().unwrap();
            for task in tasks {
                guard.push(task.payload);
            }
            Ok(())
        })
    }
}
