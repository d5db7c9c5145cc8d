//! Core extractor trait for model source files
//!
//! An extractor turns the text of one source file into a schema item. It
//! never fails: input that does not match the expected shape yields `None`
//! plus diagnostics explaining what was skipped.

use super::Diagnostics;

/// Core trait for per-file extractors
///
/// # Example
/// ```
/// use ergraph::core::{Diagnostics, Extractor};
/// use ergraph::plugins::enumeration::EnumExtractor;
///
/// let extractor = EnumExtractor::new();
/// let mut diagnostics = Diagnostics::new();
/// let def = extractor
///     .extract("export enum StatusEnum { OPEN = 'OPEN' }", &mut diagnostics)
///     .unwrap();
/// assert_eq!(def.name, "StatusEnum");
/// ```
pub trait Extractor: Send + Sync {
    /// The schema item produced from one file
    type Output: Send;

    /// Extract a schema item from the full text of one file
    fn extract(&self, source: &str, diagnostics: &mut Diagnostics) -> Option<Self::Output>;

    /// Get the name of this extractor
    fn name(&self) -> &'static str;

    /// File-name suffix this extractor is responsible for
    fn file_suffix(&self) -> &str;

    /// Check whether a file name belongs to this extractor
    fn can_extract(&self, file_name: &str) -> bool {
        file_name.ends_with(self.file_suffix())
    }
}
