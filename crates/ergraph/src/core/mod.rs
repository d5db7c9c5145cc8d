//! Core abstractions for schema extraction
//!
//! Shared building blocks used by every plugin: source masking, declaration
//! scanning, type normalization, diagnostics and the extractor, database and
//! renderer traits.

mod chumsky_utils;
mod database;
mod declarations;
mod diagnostic;
mod error;
mod extractor;
pub mod logging;
mod normalize;
mod renderer;
mod source;

pub use chumsky_utils::*;
pub use database::*;
pub use declarations::*;
pub use diagnostic::*;
pub use error::*;
pub use extractor::*;
pub use logging::*;
pub use normalize::*;
pub use renderer::*;
pub use source::*;
