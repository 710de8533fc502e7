//! Rank 0: the top-level call into the engine and the shutdown broadcast.

use std::thread;

use log::{debug, info};

use crate::comm::{Communicator, LocalUniverse};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{communication_error, validation_error, Result};
use crate::matrix::Matrix;
use crate::wire::Packet;
use crate::worker::{Worker, WorkerReport};

/// Rank of the coordinator.
pub const ROOT_RANK: usize = 0;

/// Checks that `n` is a power of two and at least 2.
pub fn validate_dimension(n: usize) -> Result<()> {
    if n < 2 || !n.is_power_of_two() {
        return Err(validation_error(format!(
            "matrix size must be a power of 2 and >= 2, got {}",
            n
        )));
    }
    Ok(())
}

/// Drives one multiplication from the root rank.
pub struct Coordinator<'c, C: Communicator> {
    engine: Engine<'c, C>,
}

impl<'c, C: Communicator> Coordinator<'c, C> {
    /// # Errors
    ///
    /// Fails when `comm` is not the root rank or `config` is invalid.
    pub fn new(comm: &'c C, config: EngineConfig) -> Result<Self> {
        if comm.rank() != ROOT_RANK {
            return Err(validation_error(format!(
                "coordinator must run on rank {}, not rank {}",
                ROOT_RANK,
                comm.rank()
            )));
        }
        config.validate()?;
        Ok(Coordinator {
            engine: Engine::new(comm, config),
        })
    }

    /// Computes `a · b` at level 0, then terminates every worker.
    ///
    /// Workers are terminated even when the multiplication fails, so a
    /// local universe can always be joined.
    pub fn multiply(&self, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        let product = validate_dimension(a.size()).and_then(|_| self.engine.multiply(a, b, 0));
        let shutdown = self.shutdown();
        let product = product?;
        shutdown?;
        Ok(product)
    }

    /// Sends one termination sentinel to each of ranks 1..P.
    ///
    /// Every rank is attempted; the first failure is returned.
    pub fn shutdown(&self) -> Result<()> {
        let comm = self.engine.comm();
        let mut first_error = None;
        for rank in (ROOT_RANK + 1)..comm.size() {
            if let Err(e) = comm.send(rank, &Packet::Terminate) {
                first_error.get_or_insert(e);
            }
        }
        debug!("terminated {} workers", comm.size().saturating_sub(1));
        first_error.map_or(Ok(()), Err)
    }
}

/// Outcome of [`run_local`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRun {
    pub product: Matrix,
    /// Reports of ranks 1..P, ordered by rank.
    pub workers: Vec<WorkerReport>,
}

/// Multiplies `a · b` on `procs` in-process ranks, one thread per rank.
///
/// The dimension is validated before any rank starts.
pub fn run_local(config: EngineConfig, procs: usize, a: &Matrix, b: &Matrix) -> Result<LocalRun> {
    validate_dimension(a.size())?;
    config.validate()?;

    let mut endpoints = LocalUniverse::endpoints(procs)?.into_iter();
    let root = endpoints
        .next()
        .ok_or_else(|| communication_error(ROOT_RANK, "universe has no root rank"))?;

    info!(
        "multiplying {}x{} on {} local ranks (max tree height {}, leaf threshold {})",
        a.size(),
        a.size(),
        procs,
        config.max_tree_height,
        config.leaf_threshold
    );

    thread::scope(|scope| {
        let handles: Vec<_> = endpoints
            .map(|endpoint| {
                let rank = endpoint.rank();
                let handle = scope.spawn(move || Worker::new(&endpoint, config).run());
                (rank, handle)
            })
            .collect();

        let product = Coordinator::new(&root, config).and_then(|c| c.multiply(a, b));

        let mut workers = Vec::with_capacity(handles.len());
        for (rank, handle) in handles {
            let report = handle
                .join()
                .map_err(|_| communication_error(rank, "worker thread panicked"))??;
            workers.push(report);
        }

        Ok(LocalRun {
            product: product?,
            workers,
        })
    })
}
