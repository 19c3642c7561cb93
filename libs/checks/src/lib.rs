//! Topology Assembler and the pluggable Validation Check Registry/Engine.
//! `graph` builds the in-memory topology; `registry` defines the `Check`
//! sum type and fixes run order; `checks` holds the registered checks;
//! `engine` runs the pipeline and computes the reachability matrix.

pub mod checks;
pub mod engine;
pub mod graph;
mod net;
pub mod registry;

pub use engine::{aggregate, reachability_matrix, run_registry, CheckEvent, DEFAULT_CHECK_BUDGET};
pub use graph::{assemble, EdgeData, NodeData, TopologyGraph};
pub use registry::{default_registry, Check};
