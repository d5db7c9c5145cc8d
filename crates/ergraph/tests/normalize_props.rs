//! Property tests for type normalization

use ergraph::{is_canonical_identifier, normalize_type, sanitize_identifier};
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalized_tokens_are_canonical(raw in "\\PC{0,40}") {
        let token = normalize_type(&raw);
        prop_assert!(is_canonical_identifier(&token), "{:?} -> {:?}", raw, token);
    }

    #[test]
    fn normalization_is_idempotent(raw in "\\PC{0,40}") {
        let once = normalize_type(&raw);
        prop_assert_eq!(normalize_type(&once), once.clone());
    }

    #[test]
    fn typescript_like_types_are_idempotent(
        base in "[A-Za-z][A-Za-z0-9]{0,12}",
        array in any::<bool>(),
        nullable in any::<bool>(),
    ) {
        let mut raw = base;
        if array {
            raw.push_str("[]");
        }
        if nullable {
            raw.push_str(" | null");
        }
        let once = normalize_type(&raw);
        prop_assert!(is_canonical_identifier(&once));
        prop_assert_eq!(normalize_type(&once), once.clone());
    }

    #[test]
    fn sanitize_is_idempotent(raw in "\\PC{0,40}") {
        let once = sanitize_identifier(&raw);
        prop_assert!(is_canonical_identifier(&once));
        prop_assert_eq!(sanitize_identifier(&once), once.clone());
    }
}
