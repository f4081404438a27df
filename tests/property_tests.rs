/// Property-based tests using proptest
/// Tests invariants of the lookup helpers for all inputs
mod common;

use common::matches_region;
use proptest::prelude::*;
use regnum_api::models::ListQuery;
use regnum_api::store::{is_valid_region, prefix_like_pattern};

/// Returns true when every `%` or `_` between the outer wildcards is escaped.
fn inner_wildcards_escaped(pattern: &str) -> bool {
    let inner = &pattern[1..pattern.len() - 1];
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if chars.next().is_none() {
                    return false;
                }
            }
            '%' | '_' => return false,
            _ => {}
        }
    }
    true
}

// Property: region validation should never panic
proptest! {
    #[test]
    fn region_validation_never_panics(region in "\\PC*") {
        let _ = is_valid_region(&region);
    }

    #[test]
    fn short_alphanumeric_regions_are_valid(region in "[A-Z0-9]{1,8}") {
        prop_assert!(is_valid_region(&region));
    }

    #[test]
    fn regions_with_regex_syntax_are_rejected(
        head in "[0-9]{0,3}",
        meta in "[.*+?()\\[\\]|^$\\\\ ]",
        tail in "[0-9]{0,3}"
    ) {
        let region = format!("{}{}{}", head, meta, tail);
        prop_assert!(!is_valid_region(&region));
    }
}

// Property: LIKE patterns wrap the input and escape its wildcards
proptest! {
    #[test]
    fn prefix_pattern_is_wrapped_and_escaped(prefix in "\\PC*") {
        let pattern = prefix_like_pattern(&prefix);
        prop_assert!(pattern.starts_with('%'));
        prop_assert!(pattern.ends_with('%'));
        prop_assert!(inner_wildcards_escaped(&pattern));
    }

    #[test]
    fn plain_prefix_is_kept_verbatim(prefix in "[A-Z0-9]{0,12}") {
        prop_assert_eq!(prefix_like_pattern(&prefix), format!("%{}%", prefix));
    }
}

// Property: region matching should never panic and finds region suffixes
#[test]
fn region_matching_examples() {
    assert!(matches_region("A123BC150", "150"));
    assert!(matches_region("A123BC77", "BC77"));
    assert!(!matches_region("123150", "150"));
    assert!(!matches_region("A123BC77", "150"));
}

proptest! {
    #[test]
    fn region_matching_never_panics(number in "\\PC*", region in "\\PC*") {
        let _ = matches_region(&number, &region);
    }

    #[test]
    fn numbers_ending_in_region_match(
        letter in "[A-Z]",
        body in "[0-9]{3}[A-Z]{2}",
        region in "[0-9]{2,3}"
    ) {
        let number = format!("{}{}{}", letter, body, region);
        prop_assert!(matches_region(&number, &region));
    }

    #[test]
    fn numbers_without_letters_never_match(number in "[0-9]{1,12}", region in "[0-9]{1,3}") {
        prop_assert!(!matches_region(&number, &region));
    }
}

// Property: a list query selects a mode only with exactly one non-blank parameter
proptest! {
    #[test]
    fn list_query_needs_exactly_one_parameter(
        id in proptest::option::of("[0-9]{1,5}"),
        prefix in proptest::option::of("[A-Z]{1,3}"),
        region in proptest::option::of("[0-9]{2,3}")
    ) {
        let provided = [&id, &prefix, &region].iter().filter(|v| v.is_some()).count();
        let query = ListQuery { id, prefix, region };
        prop_assert_eq!(query.mode().is_some(), provided == 1);
    }
}
