//! Entity plugin
//!
//! Extracts entities, their fields and relationship edges from decorated
//! model classes.

mod chumsky_parser;
mod config;
mod extractor;

pub use chumsky_parser::{
    is_type_thunk, leading_string_literal, option_is_true, parse_relationship_args,
    ParsedRelationship,
};
pub use config::{ExtractorConfig, MarkerRole};
pub use extractor::{EntityExtractor, ENTITY_FILE_SUFFIX};
