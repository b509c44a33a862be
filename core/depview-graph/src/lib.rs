pub mod builder;
pub mod error;
pub mod graph;
pub mod render;

#[cfg(test)]
mod fixture;

pub use builder::{IndexBuilder, MarkupIndex, MISSING_TAG, PUNCT_RELATION};
pub use error::GraphError;
pub use graph::{DependencyGraph, ROOT};
