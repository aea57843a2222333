// tests/runtime_fake_executor.rs

//! The async runtime shell driven end-to-end with a fake executor.

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use flowdag::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use flowdag::exec::{ChannelExecutorBackend, ExecutorBackend};
use flowdag::{DrainPolicy, Task, TaskQueue};
use flowdag_test_utils::builders::TaskBuilder;
use flowdag_test_utils::fake_executor::FakeExecutor;
use flowdag_test_utils::init_tracing;
use flowdag_test_utils::rewriters::FuseRewriter;

type TestResult = Result<(), Box<dyn Error>>;

async fn run_to_completion<E: ExecutorBackend<String>>(
    core: CoreRuntime<String>,
    rt_rx: mpsc::Receiver<RuntimeEvent<String>>,
    executor: E,
) -> TestResult {
    let runtime = Runtime::new(core, rt_rx, executor);

    // Enforce an upper bound on how long the loop may run.
    match timeout(Duration::from_secs(3), runtime.run()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => panic!("runtime did not finish within 3 seconds"),
    }
}

#[tokio::test]
async fn eager_runtime_dispatches_a_dependent_chain_in_order() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent<String>>(16);

    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(executed.clone());

    let options = RuntimeOptions {
        exit_when_drained: true,
    };
    let core = CoreRuntime::new(TaskQueue::new(), DrainPolicy::Eager, options);

    rt_tx
        .send(RuntimeEvent::TaskSubmitted {
            task: TaskBuilder::new("A").write("c").build(),
        })
        .await?;
    rt_tx
        .send(RuntimeEvent::TaskSubmitted {
            task: TaskBuilder::new("B").read("c").build(),
        })
        .await?;
    rt_tx.send(RuntimeEvent::DrainRequested).await?;

    run_to_completion(core, rt_rx, executor).await?;

    let tasks_run = executed.lock().unwrap().clone();
    assert_eq!(tasks_run, vec!["A".to_string(), "B".to_string()]);

    Ok(())
}

#[tokio::test]
async fn batched_runtime_gives_the_merger_its_window() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent<String>>(16);

    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(executed.clone());

    let options = RuntimeOptions {
        exit_when_drained: true,
    };
    let mut core = CoreRuntime::new(TaskQueue::new(), DrainPolicy::Batched, options);
    core.register_rewriter(Box::new(FuseRewriter::any()));

    rt_tx
        .send(RuntimeEvent::TaskSubmitted {
            task: TaskBuilder::new("A").write("c").build(),
        })
        .await?;
    rt_tx
        .send(RuntimeEvent::TaskSubmitted {
            task: TaskBuilder::new("B").read("c").build(),
        })
        .await?;
    rt_tx.send(RuntimeEvent::DrainRequested).await?;

    run_to_completion(core, rt_rx, executor).await?;

    // Nothing was dispatched until the drain, so the pair fused.
    let tasks_run = executed.lock().unwrap().clone();
    assert_eq!(tasks_run, vec!["A+B".to_string()]);

    Ok(())
}

#[tokio::test]
async fn shutdown_event_stops_the_loop_without_dispatching() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent<String>>(16);

    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(executed.clone());

    let options = RuntimeOptions {
        exit_when_drained: false,
    };
    let core = CoreRuntime::new(TaskQueue::new(), DrainPolicy::Batched, options);

    rt_tx
        .send(RuntimeEvent::TaskSubmitted {
            task: TaskBuilder::new("A").write("c").build(),
        })
        .await?;
    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;

    run_to_completion(core, rt_rx, executor).await?;

    assert!(executed.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn invalid_submission_is_rejected_and_the_loop_keeps_going() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent<String>>(16);

    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(executed.clone());

    let options = RuntimeOptions {
        exit_when_drained: true,
    };
    let core = CoreRuntime::new(TaskQueue::new(), DrainPolicy::Eager, options);

    rt_tx
        .send(RuntimeEvent::TaskSubmitted {
            task: TaskBuilder::new("bad").read("").build(),
        })
        .await?;
    rt_tx
        .send(RuntimeEvent::TaskSubmitted {
            task: TaskBuilder::new("good").build(),
        })
        .await?;
    rt_tx.send(RuntimeEvent::DrainRequested).await?;

    run_to_completion(core, rt_rx, executor).await?;

    let tasks_run = executed.lock().unwrap().clone();
    assert_eq!(tasks_run, vec!["good".to_string()]);

    Ok(())
}

#[tokio::test]
async fn channel_backend_delivers_to_a_real_consumer_loop() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent<String>>(16);

    let executed = Arc::new(Mutex::new(Vec::new()));
    let sink = executed.clone();
    let executor = ChannelExecutorBackend::new(move |task: Task<String>| {
        sink.lock().unwrap().push(task.payload);
    });

    let options = RuntimeOptions {
        exit_when_drained: true,
    };
    let core = CoreRuntime::new(TaskQueue::new(), DrainPolicy::Eager, options);

    rt_tx
        .send(RuntimeEvent::TaskSubmitted {
            task: TaskBuilder::new("A").write("c").build(),
        })
        .await?;
    rt_tx
        .send(RuntimeEvent::TaskSubmitted {
            task: TaskBuilder::new("B").read("c").build(),
        })
        .await?;
    rt_tx.send(RuntimeEvent::DrainRequested).await?;

    run_to_completion(core, rt_rx, executor).await?;

    // The handler runs on the spawned consumer loop; poll briefly for the
    // channel to drain.
    for _ in 0..100 {
        if executed.lock().unwrap().len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let tasks_run = executed.lock().unwrap().clone();
    assert_eq!(tasks_run, vec!["A".to_string(), "B".to_string()]);

    Ok(())
}

#[tokio::test]
async fn closing_the_event_channel_ends_the_runtime() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent<String>>(16);

    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(executed.clone());

    let options = RuntimeOptions {
        exit_when_drained: false,
    };
    let core = CoreRuntime::new(TaskQueue::new(), DrainPolicy::Eager, options);

    rt_tx
        .send(RuntimeEvent::TaskSubmitted {
            task: TaskBuilder::new("A").build(),
        })
        .await?;
    drop(rt_tx);

    run_to_completion(core, rt_rx, executor).await?;

    let tasks_run = executed.lock().unwrap().clone();
    assert_eq!(tasks_run, vec!["A".to_string()]);

    Ok(())
}
