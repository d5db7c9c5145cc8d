//! Declaration scanning over masked source
//!
//! A deliberately small grammar for the subset of TypeScript that model files
//! use: decorators, class and enum headers with their bodies, and decorated
//! property declarations. It is not a TypeScript parser. Anything it does not
//! recognize is skipped statement by statement.
//!
//! All functions take the `code` view of a [`MaskedSource`](super::MaskedSource)
//! and report byte ranges, which are valid in every view of the same source.

use chumsky::prelude::*;
use std::ops::Range;
use tracing::trace;

use super::chumsky_utils::{
    balanced_parens, dotted_name, identifier, optional_whitespace, parse_prefix,
    whitespace_required,
};

/// Keywords that may precede `class` or `enum` at the top level
const DECLARATION_MODIFIERS: &[&str] = &["export", "default", "abstract", "declare", "const"];

/// Keywords that may precede a property name inside a class body
const PROPERTY_MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "readonly",
    "declare",
    "override",
    "static",
    "accessor",
];

/// A decorator application such as `@Column({ nullable: true })`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    /// Full (possibly dotted) decorator name
    pub name: String,
    pub span: Range<usize>,
    /// The argument list including its parentheses, if present
    pub args: Option<Range<usize>>,
}

impl Decorator {
    /// Last segment of the name (`typeorm.Column` -> `Column`)
    pub fn base_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Slice the argument list out of any view of the source
    pub fn args_in<'s>(&self, text: &'s str) -> Option<&'s str> {
        self.args.clone().map(|range| &text[range])
    }
}

/// A class declaration with the decorators applied to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub decorators: Vec<Decorator>,
    /// Identifiers named in the `extends` clause, in order
    pub heritage: Vec<String>,
    pub span: Range<usize>,
    /// Contents between the body braces
    pub body: Range<usize>,
}

impl ClassDecl {
    pub fn has_decorator(&self, names: &[String]) -> Option<&Decorator> {
        self.decorators
            .iter()
            .find(|d| names.iter().any(|n| n == d.base_name()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: String,
    pub span: Range<usize>,
    pub body: Range<usize>,
}

/// A top-level declaration of interest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Class(ClassDecl),
    Enum(EnumDecl),
}

/// A property declaration head: `name?: <type>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    /// Declared with a `?` marker
    pub optional: bool,
    /// The type annotation, up to the end of the statement
    pub type_span: Range<usize>,
}

/// One class-body member with the decorators preceding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub decorators: Vec<Decorator>,
    pub span: Range<usize>,
    /// `None` for methods, accessors, constructors and unrecognized members
    pub property: Option<PropertyDecl>,
}

/// Scan the top level of a file for class and enum declarations
pub fn scan_declarations(code: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut pending: Vec<Decorator> = Vec::new();
    let mut pos = 0;

    while let Some(start) = skip_whitespace(code, pos, code.len()) {
        if code[start..].starts_with('@') {
            match parse_decorator(code, start) {
                Some(decorator) => {
                    pos = decorator.span.end;
                    pending.push(decorator);
                }
                None => {
                    pending.clear();
                    pos = start + 1;
                }
            }
            continue;
        }

        match parse_prefix(text::ident(), &code[start..]) {
            Some((word, consumed)) if DECLARATION_MODIFIERS.contains(&word) => {
                pos = start + consumed;
                continue;
            }
            Some(("class", _)) => {
                if let Some(class) = parse_class(code, start, std::mem::take(&mut pending)) {
                    trace!(name = %class.name, "found class");
                    pos = class.span.end;
                    declarations.push(Declaration::Class(class));
                    continue;
                }
            }
            Some(("enum", _)) => {
                if let Some(decl) = parse_enum(code, start) {
                    trace!(name = %decl.name, "found enum");
                    pos = decl.span.end;
                    declarations.push(Declaration::Enum(decl));
                    continue;
                }
            }
            _ => {}
        }

        pending.clear();
        pos = statement_end(code, start, code.len()).max(start + 1);
    }

    declarations
}

/// Scan a class body for members, attaching decorators to the member they precede
pub fn scan_members(code: &str, body: Range<usize>) -> Vec<Member> {
    let mut members = Vec::new();
    let mut pending: Vec<Decorator> = Vec::new();
    let mut pos = body.start;

    while let Some(start) = skip_whitespace(code, pos, body.end) {
        if code[start..].starts_with('@') {
            match parse_decorator(code, start) {
                Some(decorator) if decorator.span.end <= body.end => {
                    pos = decorator.span.end;
                    pending.push(decorator);
                }
                _ => pos = start + 1,
            }
            continue;
        }

        let end = statement_end(code, start, body.end).max(start + 1);
        let property = parse_property(&code[start..end]).map(|(name, optional, consumed)| {
            PropertyDecl {
                name,
                optional,
                type_span: start + consumed..end,
            }
        });
        members.push(Member {
            decorators: std::mem::take(&mut pending),
            span: start..end,
            property,
        });
        pos = end;
    }

    if !pending.is_empty() {
        members.push(Member {
            decorators: pending,
            span: body.end..body.end,
            property: None,
        });
    }

    members
}

/// Parse a decorator starting at `at` (which must point at `@`)
pub fn parse_decorator(code: &str, at: usize) -> Option<Decorator> {
    let head = just('@').ignore_then(dotted_name());
    let (name, consumed) = parse_prefix(head, &code[at..])?;
    let name_end = at + consumed;

    let rest = &code[name_end..];
    let args_start = name_end + (rest.len() - rest.trim_start().len());
    let args = parse_prefix(balanced_parens(), &code[args_start..])
        .map(|((), len)| args_start..args_start + len);
    let end = args.as_ref().map_or(name_end, |range| range.end);

    Some(Decorator {
        name,
        span: at..end,
        args,
    })
}

/// Extract the type expression of a property from `text`.
///
/// `code` is used to locate an initializer (`= ...`) outside of brackets; the
/// returned slice comes from `text`, which should be a view of the same source.
pub fn type_expression<'s>(code: &str, text: &'s str, span: Range<usize>) -> &'s str {
    let bytes = code.as_bytes();
    let mut depth = 0usize;
    let mut end = span.end;
    for i in span.clone() {
        match bytes[i] {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' if i == 0 || bytes[i - 1] != b'=' => {
                depth = depth.saturating_sub(1)
            }
            b'=' if depth == 0 && bytes.get(i + 1) != Some(&b'>') => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    text[span.start..end].trim().trim_end_matches(';').trim_end()
}

fn parse_class(code: &str, start: usize, decorators: Vec<Decorator>) -> Option<ClassDecl> {
    let header = just("class")
        .ignore_then(whitespace_required())
        .ignore_then(identifier());
    let (name, consumed) = parse_prefix(header, &code[start..])?;
    let after_name = start + consumed;
    let open = find_body_open(code, after_name)?;
    let close = find_matching_brace(code, open)?;

    Some(ClassDecl {
        name,
        decorators,
        heritage: heritage_names(&code[after_name..open]),
        span: start..close + 1,
        body: open + 1..close,
    })
}

fn parse_enum(code: &str, start: usize) -> Option<EnumDecl> {
    let header = just("enum")
        .ignore_then(whitespace_required())
        .ignore_then(identifier());
    let (name, consumed) = parse_prefix(header, &code[start..])?;
    let open = find_body_open(code, start + consumed)?;
    let close = find_matching_brace(code, open)?;

    Some(EnumDecl {
        name,
        span: start..close + 1,
        body: open + 1..close,
    })
}

/// Parse `modifiers* name [?|!] :` and report the consumed length
fn parse_property(statement: &str) -> Option<(String, bool, usize)> {
    let modifier = text::ident()
        .then_ignore(whitespace_required())
        .filter(|word: &&str| PROPERTY_MODIFIERS.contains(word));
    let head = modifier
        .repeated()
        .ignore_then(identifier())
        .then(one_of("?!").or_not())
        .then_ignore(optional_whitespace())
        .then_ignore(just(':'));

    let ((name, marker), consumed) = parse_prefix(head, statement)?;
    Some((name, marker == Some('?'), consumed))
}

fn heritage_names(header: &str) -> Vec<String> {
    let mut words = header
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .filter(|w| !w.is_empty());
    if !words.any(|w| w == "extends") {
        return Vec::new();
    }
    words
        .take_while(|w| *w != "implements")
        .map(str::to_string)
        .collect()
}

fn skip_whitespace(code: &str, pos: usize, limit: usize) -> Option<usize> {
    code[pos..limit]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| pos + i)
}

/// Find the end of the statement starting at `start`.
///
/// A statement ends after a `;`, or at a newline, when no bracket is open and
/// the text does not visibly continue on the next line. Reaching a closing
/// bracket that was not opened inside the statement also ends it.
fn statement_end(code: &str, start: usize, limit: usize) -> usize {
    let bytes = code.as_bytes();
    let mut depth = 0usize;
    for i in start..limit {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            }
            b';' if depth == 0 => return i + 1,
            b'\n' if depth == 0 && !continues_after(code, start, i, limit) => return i,
            _ => {}
        }
    }
    limit
}

fn continues_after(code: &str, start: usize, newline: usize, limit: usize) -> bool {
    let before = code[start..newline].trim_end();
    if before.is_empty()
        || before.ends_with("=>")
        || before.ends_with(['|', '&', ',', ':', '=', '(', '<', '?', '.'])
    {
        return true;
    }
    let after = code[newline..limit].trim_start();
    after.starts_with(['|', '&', '.', '=', '?', ':', '{'])
}

fn find_body_open(code: &str, from: usize) -> Option<usize> {
    let bytes = code.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match b {
            b'{' if depth == 0 => return Some(i),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' if depth > 0 => depth -= 1,
            b';' | b'}' if depth == 0 => return None,
            _ => {}
        }
    }
    None
}

fn find_matching_brace(code: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in code.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
