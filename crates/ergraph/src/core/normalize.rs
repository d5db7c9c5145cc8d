//! Type normalization for diagram output
//!
//! Mermaid ER attribute types must be a single word, so every raw TypeScript
//! type expression is mapped to a canonical token drawn from `[A-Za-z0-9_]`.
//! The mapping is total and idempotent: feeding a canonical token back in
//! returns it unchanged.

/// Token used whenever sanitizing leaves nothing behind
pub const UNKNOWN_TOKEN: &str = "unknown";

/// Fixed mappings for primitives, their array forms, and the canonical tokens
/// themselves (so canonical output maps onto itself).
const PRIMITIVES: &[(&str, &str)] = &[
    ("string", "string"),
    ("String", "string"),
    ("number", "number"),
    ("Number", "number"),
    ("boolean", "boolean"),
    ("Boolean", "boolean"),
    ("bigint", "bigint"),
    ("Date", "Date"),
    ("string[]", "string_array"),
    ("number[]", "number_array"),
    ("boolean[]", "boolean_array"),
    ("bigint[]", "bigint_array"),
    ("Date[]", "Date_array"),
    ("string_array", "string_array"),
    ("number_array", "number_array"),
    ("boolean_array", "boolean_array"),
    ("bigint_array", "bigint_array"),
    ("Date_array", "Date_array"),
];

/// Which normalization rule produced a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRule {
    Primitive,
    EnumSuffix,
    Array,
    /// Braces, parentheses or generics collapsed to `enum`, `Date` or `object`
    Complex,
    /// Qualified or intersection types collapsed to `embedded`
    Embedded,
    /// A custom capitalized type name kept as-is
    Reference,
    /// Illegal characters stripped (possibly down to `unknown`)
    Sanitized,
}

/// Result of normalizing a raw type expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedType {
    pub token: String,
    pub rule: TypeRule,
    /// The raw type carried a `| null`, `| undefined` or `?` marker
    pub nullable: bool,
}

impl NormalizedType {
    /// True when the token is a generic stand-in rather than the declared type
    pub fn is_fallback(&self) -> bool {
        matches!(
            self.rule,
            TypeRule::Complex | TypeRule::Embedded | TypeRule::Sanitized
        )
    }
}

/// Map a raw type expression to its canonical diagram token
///
/// # Example
/// ```rust
/// use ergraph::normalize_type;
///
/// assert_eq!(normalize_type("string | null"), "string");
/// assert_eq!(normalize_type("PaySlip[]"), "PaySlip_array");
/// assert_eq!(normalize_type("{ lat: number }"), "object");
/// ```
pub fn normalize_type(raw: &str) -> String {
    normalize_type_detailed(raw).token
}

/// Like [`normalize_type`], but also reports which rule fired
pub fn normalize_type_detailed(raw: &str) -> NormalizedType {
    let without_comment = match raw.find("//") {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let trimmed = without_comment
        .trim()
        .trim_end_matches([';', ','])
        .trim_end();
    let (ty, nullable) = strip_nullish(trimmed);
    let (token, rule) = classify(ty);
    NormalizedType {
        token,
        rule,
        nullable,
    }
}

fn classify(ty: &str) -> (String, TypeRule) {
    if let Some((_, canonical)) = PRIMITIVES.iter().find(|(raw, _)| *raw == ty) {
        return (canonical.to_string(), TypeRule::Primitive);
    }

    if ty.ends_with("Enum") {
        return (sanitize_identifier(ty), TypeRule::EnumSuffix);
    }

    if let Some(base) = ty.strip_suffix("[]") {
        let inner = normalize_type(base);
        return (format!("{}_array", inner), TypeRule::Array);
    }

    if ty.contains(['{', '}', '(', ')', '<', '>']) {
        let token = if ty.to_lowercase().contains("enum") {
            "enum"
        } else if mentions_date(ty) {
            "Date"
        } else {
            "object"
        };
        return (token.to_string(), TypeRule::Complex);
    }

    if ty.contains(['.', '&']) {
        return ("embedded".to_string(), TypeRule::Embedded);
    }

    if ty.starts_with(|c: char| c.is_ascii_uppercase()) && is_canonical_identifier(ty) {
        return (ty.to_string(), TypeRule::Reference);
    }

    let sanitized = sanitize_identifier(ty);
    match PRIMITIVES.iter().find(|(raw, _)| *raw == sanitized) {
        Some((_, canonical)) => (canonical.to_string(), TypeRule::Sanitized),
        None => (sanitized, TypeRule::Sanitized),
    }
}

/// Strip trailing `| null`, `| undefined` and `?` markers
fn strip_nullish(mut ty: &str) -> (&str, bool) {
    let mut stripped = false;
    loop {
        ty = ty.trim_end();
        if let Some(rest) = ty.strip_suffix('?') {
            ty = rest;
            stripped = true;
            continue;
        }
        let union_tail = ["null", "undefined"].iter().find_map(|kw| {
            ty.strip_suffix(kw)
                .and_then(|rest| rest.trim_end().strip_suffix('|'))
        });
        match union_tail {
            Some(rest) => {
                ty = rest;
                stripped = true;
            }
            None => break,
        }
    }
    (ty.trim(), stripped)
}

fn mentions_date(ty: &str) -> bool {
    ty.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == "Date" || word == "date")
}

/// Restrict an identifier to `[A-Za-z0-9_]` without leading, trailing or
/// repeated underscores. An empty result becomes [`UNKNOWN_TOKEN`].
pub fn sanitize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c.is_ascii_alphanumeric() { c } else { '_' };
        if c == '_' && (out.is_empty() || out.ends_with('_')) {
            continue;
        }
        out.push(c);
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        UNKNOWN_TOKEN.to_string()
    } else {
        out
    }
}

/// True when `s` is already in sanitized form
pub fn is_canonical_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives() {
        assert_eq!(normalize_type("string"), "string");
        assert_eq!(normalize_type("number"), "number");
        assert_eq!(normalize_type("boolean"), "boolean");
        assert_eq!(normalize_type("Date"), "Date");
        assert_eq!(normalize_type("string[]"), "string_array");
        assert_eq!(normalize_type("number[]"), "number_array");
    }

    #[test]
    fn test_strips_comment_and_null_union() {
        assert_eq!(normalize_type("string; // title"), "string");
        assert_eq!(normalize_type("Date | null"), "Date");
        assert_eq!(normalize_type("number | undefined | null"), "number");
        assert_eq!(normalize_type("string?"), "string");
    }

    #[test]
    fn test_nullable_flag() {
        assert!(normalize_type_detailed("string | null").nullable);
        assert!(!normalize_type_detailed("string").nullable);
    }

    #[test]
    fn test_enum_suffix_kept() {
        assert_eq!(normalize_type("LeaveTypeEnum"), "LeaveTypeEnum");
        assert_eq!(
            normalize_type_detailed("LeaveTypeEnum").rule,
            TypeRule::EnumSuffix
        );
    }

    #[test]
    fn test_arrays_of_references() {
        assert_eq!(normalize_type("PaySlip[]"), "PaySlip_array");
        assert_eq!(normalize_type("LeaveTypeEnum[]"), "LeaveTypeEnum_array");
        assert_eq!(normalize_type("string[][]"), "string_array_array");
    }

    #[test]
    fn test_complex_types() {
        assert_eq!(normalize_type("{ lat: number; lng: number }"), "object");
        assert_eq!(normalize_type("Record<string, StatusEnum>"), "enum");
        assert_eq!(normalize_type("Promise<Date>"), "Date");
        assert_eq!(normalize_type("Promise<UpdateDto>"), "object");
    }

    #[test]
    fn test_embedded_types() {
        assert_eq!(normalize_type("Cache.Entry"), "embedded");
        assert_eq!(normalize_type("Base & Stamp"), "embedded");
    }

    #[test]
    fn test_reference_kept() {
        let normalized = normalize_type_detailed("EmployeeCache");
        assert_eq!(normalized.token, "EmployeeCache");
        assert_eq!(normalized.rule, TypeRule::Reference);
        assert!(!normalized.is_fallback());
    }

    #[test]
    fn test_sanitized_fallback() {
        assert_eq!(normalize_type("'ANNUAL' | 'SICK'"), "ANNUAL_SICK");
        assert_eq!(normalize_type("any"), "any");
        assert_eq!(normalize_type(""), UNKNOWN_TOKEN);
        assert_eq!(normalize_type("'' | ''"), UNKNOWN_TOKEN);
    }

    #[test]
    fn test_idempotent_on_samples() {
        let samples = [
            "string",
            "string[]",
            "Foo__Bar",
            "(A | B)[]",
            "Map<string, number>",
            "  _weird$$name_ ",
            "Cache.Entry[]",
            "date",
            "String!",
        ];
        for sample in samples {
            let once = normalize_type(sample);
            assert_eq!(normalize_type(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("leave-request"), "leave_request");
        assert_eq!(sanitize_identifier("__v"), "v");
        assert_eq!(sanitize_identifier("a  b"), "a_b");
        assert_eq!(sanitize_identifier("$$"), UNKNOWN_TOKEN);
    }

    #[test]
    fn test_is_canonical_identifier() {
        assert!(is_canonical_identifier("Foo_Bar1"));
        assert!(!is_canonical_identifier("Foo__Bar"));
        assert!(!is_canonical_identifier("_Foo"));
        assert!(!is_canonical_identifier(""));
    }
}
