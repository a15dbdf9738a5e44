//! Partitions an undirected graph into a target number of roughly
//! equal-sized, connected parts while keeping the number of edges that
//! cross part boundaries small.
//!
//! The pipeline has two stages. [`region_growing`] builds an initial
//! assignment by growing one region per part from spread-out seed
//! vertices under a size-balance tolerance. [`refine`] then runs a
//! Fiduccia-Mattheyses local search that repeatedly applies the
//! highest-gain vertex move that neither violates the balance bounds nor
//! disconnects the source part, and keeps the best assignment seen.
//!
//! ```rust
//! use partitioner::{refine, region_growing, Graph};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! # fn main() -> Result<(), partitioner::Error> {
//! let graph = common::instances::cycle_graph(8);
//! let mut graph = Graph::from_petgraph(&graph);
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let (mut partition, balanced) = region_growing(&mut graph, 2, 0.25, &mut rng)?;
//! assert!(balanced);
//! let summary = refine(&mut graph, &mut partition, 50)?;
//! assert!(summary.best_cut <= summary.initial_cut);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod connectivity;
pub mod graph;
pub mod partition;
pub mod refinement;
pub mod region_growing;

use thiserror::Error;

pub use graph::{Graph, PartId, VertexId};
pub use partition::Partition;
pub use refinement::{refine, RefineSummary};
pub use region_growing::region_growing;

#[derive(Error, Debug)]
pub enum Error {
    #[error("number of parts must be at least 1")]
    NoParts,
    #[error("cannot split {vertices} vertices into {parts} parts")]
    TooManyParts { parts: usize, vertices: usize },
    #[error("accuracy must lie in (0, 1], got {0}")]
    InvalidAccuracy(f64),
    #[error("part {part} lost connectivity after moving vertex {vertex}")]
    IntegrityViolation { part: PartId, vertex: VertexId },
}
