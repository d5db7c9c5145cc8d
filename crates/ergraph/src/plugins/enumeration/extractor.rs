//! Enum extractor
//!
//! The enum name comes from the first top-level enum declaration. Members are
//! every `IDENT = 'literal'` assignment in the file, in source order, with no
//! scope tracking: assignments outside the enum body are collected too.

use chumsky::prelude::*;
use tracing::{debug, span, Level};

use crate::core::{
    identifier, optional_whitespace, parse_prefix, sanitize_identifier, scan_declarations,
    string_literal, Declaration, DiagnosticKind, Diagnostics, Extractor, MaskedSource,
};
use crate::plugins::er::EnumDef;

pub const ENUM_FILE_SUFFIX: &str = ".enum.ts";

/// Extracts enum definitions from enum declaration files
#[derive(Debug, Clone)]
pub struct EnumExtractor {
    suffix: String,
}

impl EnumExtractor {
    pub fn new() -> Self {
        Self {
            suffix: ENUM_FILE_SUFFIX.to_string(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// `IDENT = 'value'` with a non-empty value
    fn member_parser<'src>() -> impl Parser<'src, &'src str, String> {
        identifier()
            .then_ignore(optional_whitespace())
            .then_ignore(just('='))
            .then_ignore(optional_whitespace())
            .then_ignore(string_literal().filter(|value: &&str| !value.is_empty()))
    }

    fn members(source: &MaskedSource<'_>) -> Vec<String> {
        let code = source.code();
        let text = source.commentless();
        let mut members = Vec::new();
        let mut previous_is_word = false;
        let mut resume_at = 0;

        for (i, c) in code.char_indices() {
            let is_word = c.is_alphanumeric() || c == '_' || c == '$';
            if is_word && !previous_is_word && i >= resume_at {
                if let Some((name, consumed)) = parse_prefix(Self::member_parser(), &text[i..]) {
                    members.push(sanitize_identifier(&name));
                    resume_at = i + consumed;
                }
            }
            previous_is_word = is_word;
        }

        members
    }
}

impl Default for EnumExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for EnumExtractor {
    type Output = EnumDef;

    fn extract(&self, text: &str, diagnostics: &mut Diagnostics) -> Option<EnumDef> {
        let extract_span = span!(Level::DEBUG, "extract_enum", input_len = text.len());
        let _enter = extract_span.enter();

        let source = MaskedSource::new(text);
        let Some(name) = scan_declarations(source.code())
            .into_iter()
            .find_map(|declaration| match declaration {
                Declaration::Enum(decl) => Some(decl.name),
                Declaration::Class(_) => None,
            })
        else {
            debug!("no enum declaration");
            diagnostics.push(DiagnosticKind::NotAnEnum);
            return None;
        };

        let members = Self::members(&source);
        debug!(name = %name, members = members.len(), "Extracted enum");
        Some(EnumDef::new(name).with_members(members))
    }

    fn name(&self) -> &'static str {
        "enum"
    }

    fn file_suffix(&self) -> &str {
        &self.suffix
    }
}
