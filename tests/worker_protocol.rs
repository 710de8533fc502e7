//! The worker loop driven by hand from rank 0.

use std::thread;

use strassen_tree::strassen::operands;
use strassen_tree::wire::{Packet, Task, TaskResult};
use strassen_tree::{
    leaf, Communicator, EngineConfig, LocalUniverse, Matrix, StrassenError, Worker, WorkerState,
};

#[test]
fn test_worker_answers_tasks_until_sentinel() {
    let config = EngineConfig::new(5, 4).unwrap();
    let mut endpoints = LocalUniverse::endpoints(2).unwrap();
    let worker_end = endpoints.pop().unwrap();
    let root = endpoints.pop().unwrap();

    let a = Matrix::random(16, 31);
    let b = Matrix::random(16, 32);
    let (qa, qb) = (a.split(), b.split());

    let handle = thread::spawn(move || Worker::new(&worker_end, config).run());

    for product in [0, 3, 6] {
        let task = Task::new(&a, &b, product, 0).unwrap();
        root.send(1, &Packet::Task(task)).unwrap();

        let reply = match root.receive_from(1).unwrap() {
            Packet::Result(result) => result.into_matrix(8).unwrap(),
            other => panic!("expected a result, got {:?}", other),
        };
        let (left, right) = operands(&qa, &qb, product).unwrap();
        assert_eq!(reply, leaf::cubic(&left, &right), "product {}", product);
    }

    root.send(1, &Packet::Terminate).unwrap();
    let report = handle.join().unwrap().unwrap();
    assert_eq!(report.rank, 1);
    assert_eq!(report.tasks, 3);
    assert_eq!(report.state, WorkerState::Terminated);
}

#[test]
fn test_sentinel_before_any_task() {
    let mut endpoints = LocalUniverse::endpoints(3).unwrap();
    let worker_end = endpoints.pop().unwrap();
    let root = endpoints.remove(0);

    root.send(2, &Packet::Terminate).unwrap();
    let report = Worker::new(&worker_end, EngineConfig::default()).run().unwrap();
    assert_eq!(report.tasks, 0);
    assert_eq!(report.state, WorkerState::Terminated);
}

#[test]
fn test_stray_result_is_protocol_error() {
    let mut endpoints = LocalUniverse::endpoints(2).unwrap();
    let worker_end = endpoints.pop().unwrap();
    let root = endpoints.pop().unwrap();

    let stray = TaskResult::from_matrix(&Matrix::zeros(2)).unwrap();
    root.send(1, &Packet::Result(stray)).unwrap();

    let result = Worker::new(&worker_end, EngineConfig::default()).run();
    assert!(matches!(result, Err(StrassenError::ProtocolError { .. })));
}

#[test]
fn test_malformed_task_is_protocol_error() {
    let mut endpoints = LocalUniverse::endpoints(2).unwrap();
    let worker_end = endpoints.pop().unwrap();
    let root = endpoints.pop().unwrap();

    let mut task = Task::new(&Matrix::zeros(4), &Matrix::zeros(4), 0, 0).unwrap();
    task.a.truncate(3);
    // bypass the encoder-side shape so the worker sees the bad payload
    let bytes = bincode::serialize(&Packet::Task(task)).unwrap();
    root.send_bytes(1, bytes).unwrap();

    let result = Worker::new(&worker_end, EngineConfig::default()).run();
    assert!(matches!(result, Err(StrassenError::ProtocolError { .. })));
}
