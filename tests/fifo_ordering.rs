// tests/fifo_ordering.rs

//! FIFO behaviour for conflict-free tasks at equal priority.

use flowdag::{Task, TaskQueue};
use flowdag_test_utils::builders::TaskBuilder;
use flowdag_test_utils::init_tracing;

#[test]
fn equal_priority_tasks_dequeue_in_submission_order() {
    init_tracing();

    let mut queue = TaskQueue::new();
    queue.enqueue(TaskBuilder::new("t1").build()).unwrap();
    queue.enqueue(TaskBuilder::new("t2").build()).unwrap();

    assert_eq!(queue.dequeue().map(|t| t.payload), Some("t1".to_string()));
    assert_eq!(queue.dequeue().map(|t| t.payload), Some("t2".to_string()));
    assert_eq!(queue.dequeue().map(|t| t.payload), None);
}

#[test]
fn empty_dequeue_returns_none_and_is_not_an_error() {
    init_tracing();

    let mut queue: TaskQueue<String> = TaskQueue::new();
    assert!(queue.is_empty());
    assert!(queue.dequeue().is_none());

    // Polling again after a None is fine.
    assert!(queue.dequeue().is_none());
    assert_eq!(queue.pending(), 0);
}

#[test]
fn long_fifo_run_preserves_order() {
    init_tracing();

    let mut queue = TaskQueue::new();
    for i in 0..50 {
        queue.enqueue(TaskBuilder::new(&format!("t{i}")).build()).unwrap();
    }

    for i in 0..50 {
        assert_eq!(queue.dequeue().map(|t| t.payload), Some(format!("t{i}")));
    }
    assert!(queue.is_empty());
}

#[test]
fn payload_type_is_opaque_to_the_queue() {
    init_tracing();

    // The queue never inspects the payload; any type works.
    let mut queue: TaskQueue<u32> = TaskQueue::new();
    queue.enqueue(Task::new(7, 0)).unwrap();
    queue.enqueue(Task::new(8, 0)).unwrap();

    assert_eq!(queue.dequeue().map(|t| t.payload), Some(7));
    assert_eq!(queue.dequeue().map(|t| t.payload), Some(8));
    assert!(queue.dequeue().is_none());
}

#[test]
fn interleaved_enqueue_dequeue_stays_fifo() {
    init_tracing();

    let mut queue = TaskQueue::new();
    queue.enqueue(TaskBuilder::new("a").build()).unwrap();
    queue.enqueue(TaskBuilder::new("b").build()).unwrap();

    assert_eq!(queue.dequeue().map(|t| t.payload), Some("a".to_string()));

    queue.enqueue(TaskBuilder::new("c").build()).unwrap();

    assert_eq!(queue.dequeue().map(|t| t.payload), Some("b".to_string()));
    assert_eq!(queue.dequeue().map(|t| t.payload), Some("c".to_string()));
    assert!(queue.is_empty());
}
