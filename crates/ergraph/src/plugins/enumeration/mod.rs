//! Enumeration plugin
//!
//! Extracts enum names and member identifiers from enum declaration files.

mod extractor;

pub use extractor::{EnumExtractor, ENUM_FILE_SUFFIX};
