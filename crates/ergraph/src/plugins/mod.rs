//! Plugin implementations
//!
//! Each plugin covers one concern of the pipeline and builds on the core
//! traits: extractors for entity and enum files, the ER graph with its
//! renderers, and the orchestrator tying them together.

pub mod entity;
pub mod enumeration;
pub mod er;
pub mod orchestrator;

pub use entity::*;
pub use enumeration::*;
pub use er::*;
pub use orchestrator::*;
