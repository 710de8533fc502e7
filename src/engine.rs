//! The distribution engine.
//!
//! [`Engine::multiply`] is the single recursive entry point. At every node it
//! either bottoms out in a leaf, or splits its operands and obtains the seven
//! Strassen products. Products are computed locally through
//! [`Engine::product`], or, when [`should_delegate`] holds, shipped to the
//! node's child ranks as [`Task`] packets and collected back in product order.
//!
//! Level accounting: a product computed on the node's own rank is multiplied
//! at level `L + 1`. A delegated product is sent with the node's level `L`
//! and the child runs it through the helper at `L + 1`, so its operands are
//! multiplied at level `L + 2`.

use log::{debug, trace};

use crate::comm::Communicator;
use crate::config::EngineConfig;
use crate::error::{protocol_error, validation_error, Result};
use crate::leaf;
use crate::matrix::{Matrix, Quadrants};
use crate::strassen::{self, PRODUCTS};
use crate::tree::{child_rank, should_delegate};
use crate::wire::{Packet, Task, TaskOperands};

/// Runs the recursion for one rank.
pub struct Engine<'c, C: Communicator> {
    comm: &'c C,
    config: EngineConfig,
}

impl<'c, C: Communicator> Engine<'c, C> {
    pub fn new(comm: &'c C, config: EngineConfig) -> Self {
        Engine { comm, config }
    }

    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    pub fn total(&self) -> usize {
        self.comm.size()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn comm(&self) -> &'c C {
        self.comm
    }

    /// Multiplies two n×n matrices, n a power of two.
    ///
    /// # Errors
    ///
    /// Validation errors for mismatched or non-power-of-two operands;
    /// protocol and communication errors from delegated products.
    pub fn multiply(&self, a: &Matrix, b: &Matrix, level: usize) -> Result<Matrix> {
        let n = a.size();
        if b.size() != n {
            return Err(validation_error(format!(
                "operands are {}x{} and {}x{}",
                n,
                n,
                b.size(),
                b.size()
            )));
        }
        if !n.is_power_of_two() {
            return Err(validation_error(format!(
                "matrix size {} is not a power of two",
                n
            )));
        }

        if n == 1 {
            return Ok(leaf::scalar(a, b));
        }

        if n <= self.config.leaf_threshold {
            return Ok(leaf::cubic(a, b));
        }

        let (qa, qb) = (a.split(), b.split());

        let products = if should_delegate(&self.config, n, level, self.total(), self.rank()) {
            self.delegate(a, b, &qa, &qb, level)?
        } else {
            (0..PRODUCTS)
                .map(|i| self.product(&qa, &qb, i, level))
                .collect::<Result<Vec<_>>>()?
        };

        strassen::recombine(&products)
    }

    /// Computes product `index` of a node at `level` on this rank.
    pub fn product(
        &self,
        a: &Quadrants,
        b: &Quadrants,
        index: usize,
        level: usize,
    ) -> Result<Matrix> {
        trace!(
            "rank {} computing product {} locally at level {}",
            self.rank(),
            index,
            level
        );
        let (left, right) = strassen::operands(a, b, index)?;
        self.multiply(&left, &right, level + 1)
    }

    /// Runs a task received from a parent rank, one level below the
    /// delegating node.
    pub fn execute(&self, task: TaskOperands) -> Result<Matrix> {
        let TaskOperands {
            a,
            b,
            product,
            level,
        } = task;
        let (qa, qb) = (a.split(), b.split());
        self.product(&qa, &qb, product, level + 1)
    }

    fn delegate(
        &self,
        a: &Matrix,
        b: &Matrix,
        qa: &Quadrants,
        qb: &Quadrants,
        level: usize,
    ) -> Result<Vec<Matrix>> {
        let (rank, total) = (self.rank(), self.total());
        let children: Vec<Option<usize>> = (0..PRODUCTS)
            .map(|i| child_rank(rank, i, total))
            .collect();

        // every child gets its task before any result is awaited
        for (i, child) in children.iter().enumerate() {
            if let Some(child) = *child {
                debug!(
                    "rank {} delegating product {} of {}x{} at level {} to rank {}",
                    rank,
                    i,
                    a.size(),
                    a.size(),
                    level,
                    child
                );
                self.comm.send(child, &Packet::Task(Task::new(a, b, i, level)?))?;
            }
        }

        let k = a.size() / 2;
        children
            .iter()
            .enumerate()
            .map(|(i, child)| match *child {
                Some(child) => self.collect(child, k),
                None => self.product(qa, qb, i, level),
            })
            .collect()
    }

    fn collect(&self, child: usize, k: usize) -> Result<Matrix> {
        match self.comm.receive_from(child)? {
            Packet::Result(result) => {
                debug!("rank {} received {}x{} result from rank {}", self.rank(), k, k, child);
                result.into_matrix(k)
            }
            other => Err(protocol_error(format!(
                "rank {} expected a result from rank {}, got a {} packet",
                self.rank(),
                child,
                kind(&other)
            ))),
        }
    }
}

pub(crate) fn kind(packet: &Packet) -> &'static str {
    match packet {
        Packet::Task(_) => "task",
        Packet::Result(_) => "result",
        Packet::Terminate => "terminate",
    }
}
