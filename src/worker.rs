//! The message-driven loop every non-root rank runs.
//!
//! ```text
//!            task                      decoded           product
//!   WAIT ──────────▶ RECEIVE_TASK ──────────▶ COMPUTE ──────────▶ SEND_RESULT
//!    ▲  │                                                              │
//!    │  │ terminate                                                    │
//!    │  ▼                                                              │
//!    │ TERMINATED                                                      │
//!    └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! While in COMPUTE the worker runs the full [`Engine`], so it may delegate
//! further down its own subtree before answering. Nothing survives from one
//! task to the next.

use log::{debug, trace};

use crate::comm::Communicator;
use crate::config::EngineConfig;
use crate::engine::{kind, Engine};
use crate::error::{protocol_error, Result};
use crate::matrix::Matrix;
use crate::wire::{Packet, Task, TaskOperands, TaskResult};

/// Observable worker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Wait,
    ReceiveTask,
    Compute,
    SendResult,
    Terminated,
}

/// What a worker did before it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub rank: usize,
    pub tasks: usize,
    pub state: WorkerState,
}

enum Phase {
    Wait,
    ReceiveTask { source: usize, task: Task },
    Compute { source: usize, operands: TaskOperands },
    SendResult { source: usize, result: Matrix },
    Terminated,
}

impl Phase {
    fn state(&self) -> WorkerState {
        match self {
            Phase::Wait => WorkerState::Wait,
            Phase::ReceiveTask { .. } => WorkerState::ReceiveTask,
            Phase::Compute { .. } => WorkerState::Compute,
            Phase::SendResult { .. } => WorkerState::SendResult,
            Phase::Terminated => WorkerState::Terminated,
        }
    }
}

/// A rank serving tasks until it receives the termination sentinel.
pub struct Worker<'c, C: Communicator> {
    engine: Engine<'c, C>,
}

impl<'c, C: Communicator> Worker<'c, C> {
    pub fn new(comm: &'c C, config: EngineConfig) -> Self {
        Worker {
            engine: Engine::new(comm, config),
        }
    }

    /// Serves tasks until terminated.
    ///
    /// # Errors
    ///
    /// A result packet while waiting for work is a protocol error; transport
    /// and engine errors are propagated. The worker stops on the first error.
    pub fn run(&self) -> Result<WorkerReport> {
        let rank = self.engine.rank();
        let mut tasks = 0;
        let mut phase = Phase::Wait;

        loop {
            trace!("rank {} in {:?}", rank, phase.state());
            phase = match phase {
                Phase::Wait => match self.engine.comm().receive_any()? {
                    (_, Packet::Terminate) => Phase::Terminated,
                    (source, Packet::Task(task)) => Phase::ReceiveTask { source, task },
                    (source, other) => {
                        return Err(protocol_error(format!(
                            "rank {} waiting for work got a {} packet from rank {}",
                            rank,
                            kind(&other),
                            source
                        )))
                    }
                },
                Phase::ReceiveTask { source, task } => {
                    let operands = task.into_operands()?;
                    debug!(
                        "rank {} received product {} of {}x{} at level {} from rank {}",
                        rank,
                        operands.product,
                        operands.a.size(),
                        operands.a.size(),
                        operands.level,
                        source
                    );
                    Phase::Compute { source, operands }
                }
                Phase::Compute { source, operands } => Phase::SendResult {
                    source,
                    result: self.engine.execute(operands)?,
                },
                Phase::SendResult { source, result } => {
                    self.engine
                        .comm()
                        .send(source, &Packet::Result(TaskResult::from_matrix(&result)?))?;
                    debug!(
                        "rank {} sent {}x{} result to rank {}",
                        rank,
                        result.size(),
                        result.size(),
                        source
                    );
                    tasks += 1;
                    Phase::Wait
                }
                Phase::Terminated => {
                    debug!("rank {} terminated after {} tasks", rank, tasks);
                    return Ok(WorkerReport {
                        rank,
                        tasks,
                        state: WorkerState::Terminated,
                    });
                }
            };
        }
    }
}
