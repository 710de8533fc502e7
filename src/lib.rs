//! Strassen matrix multiplication distributed over a static tree of ranks.
//!
//! Rank `r` may hand each of the seven Strassen sub-products of a node to
//! its candidate children `7r + 1 ..= 7r + 7`; a child runs the same engine
//! and may delegate further. Ranks only talk through a [`comm::Communicator`].
//!
//! ```no_run
//! use strassen_tree::{run_local, EngineConfig, Matrix};
//!
//! let a = Matrix::random(256, 123);
//! let b = Matrix::random(256, 456);
//! let run = run_local(EngineConfig::default(), 8, &a, &b)?;
//! assert_eq!(run.product.size(), 256);
//! # Ok::<(), strassen_tree::StrassenError>(())
//! ```

pub mod comm;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod leaf;
pub mod matrix;
pub mod strassen;
pub mod tree;
pub mod verify;
pub mod wire;
pub mod worker;

pub use comm::{Communicator, LocalComm, LocalUniverse};
pub use config::EngineConfig;
pub use coordinator::{run_local, validate_dimension, Coordinator, LocalRun, ROOT_RANK};
pub use engine::Engine;
pub use error::{Result, StrassenError};
pub use matrix::{Matrix, Quadrants};
pub use verify::{verify, Verification};
pub use worker::{Worker, WorkerReport, WorkerState};

#[cfg(feature = "mpi")]
pub use comm::MpiComm;

/// Default number of recursion levels at which products may be delegated.
pub const MAX_TREE_HEIGHT: usize = 5;
/// Default dimension at or below which the cubic leaf takes over.
pub const MIN_SIZE_THRESHOLD: usize = 64;
/// Cubic cut-off of the sequential reference Strassen.
pub const ORACLE_THRESHOLD: usize = 32;
