//! Shared validation predicates for URL path segments.
//!
//! Room names and page slugs both travel as single path segments, so they are
//! trimmed, non-empty identifiers composed of ASCII letters, digits, hyphens
//! and underscores.

/// Return `true` when `value` can stand alone as one URL path segment.
pub(crate) fn is_valid_segment(value: &str) -> bool {
    is_trimmed_non_empty(value) && has_allowed_segment_chars(value)
}

fn is_trimmed_non_empty(value: &str) -> bool {
    !value.is_empty() && value.trim() == value
}

fn has_allowed_segment_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("intro", true)]
    #[case("teamA", true)]
    #[case("getting_started-2", true)]
    #[case("", false)]
    #[case(" intro", false)]
    #[case("a/b", false)]
    #[case("caf%C3%A9", false)]
    fn validates_segments(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_valid_segment(value), expected);
    }
}
