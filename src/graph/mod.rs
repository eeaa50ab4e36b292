//! Entity graph construction.
//!
//! - [`GraphBuilder`] scans a document and declares every annotated entity (first pass), then
//!   records bare mentions of declared names as implicit occurrences (second pass).
//! - [`EntityGraph`] is the per-parse store of [`Entity`](crate::properties::Entity) records
//!   and owns the relation linker ([`EntityGraph::link`]).
//!
//! Relation targets may be referenced before they are declared: the linker creates a
//! placeholder record which the later declaration fills in.

pub mod builder;
pub mod linker;

pub use builder::GraphBuilder;
pub use linker::EntityGraph;
