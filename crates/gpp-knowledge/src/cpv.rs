//! CPV code matching
//!
//! A criterion code matches a notice code when the two are equal, or when the
//! notice code starts with the criterion code once its trailing zeros are
//! stripped. `39100000` therefore covers every `391xxxxx` code.

/// Notice codes covered by at least one criterion code, in notice order
///
/// Scanning stops at the first criterion code that covers a notice code.
/// Repeated notice codes are kept.
#[must_use]
pub fn matching_codes<N, C>(notice_codes: &[N], criterion_codes: &[C]) -> Vec<String>
where
    N: AsRef<str>,
    C: AsRef<str>,
{
    notice_codes
        .iter()
        .map(AsRef::as_ref)
        .filter(|code| {
            criterion_codes
                .iter()
                .any(|criterion| covers(criterion.as_ref(), code))
        })
        .map(str::to_string)
        .collect()
}

/// Whether any notice code is covered
#[must_use]
pub fn has_match<N, C>(notice_codes: &[N], criterion_codes: &[C]) -> bool
where
    N: AsRef<str>,
    C: AsRef<str>,
{
    notice_codes.iter().any(|code| {
        criterion_codes
            .iter()
            .any(|criterion| covers(criterion.as_ref(), code.as_ref()))
    })
}

fn covers(criterion: &str, code: &str) -> bool {
    if criterion == code {
        return true;
    }
    let stem = criterion.trim_end_matches('0');
    !stem.is_empty() && code.starts_with(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn exact_code_matches_itself() {
        assert_eq!(matching_codes(&["39100000"], &["39100000"]), vec!["39100000"]);
    }

    #[test]
    fn trailing_zeros_make_an_ancestor() {
        assert_eq!(
            matching_codes(&["39144444", "45233293"], &["39100000", "45233293"]),
            vec!["39144444", "45233293"]
        );
    }

    #[test]
    fn descendant_does_not_cover_ancestor() {
        assert!(matching_codes(&["39100000"], &["39144444"]).is_empty());
    }

    #[test]
    fn unrelated_codes_do_not_match() {
        assert!(!has_match(&["45000000"], &["39100000"]));
    }

    #[test]
    fn all_zero_code_only_matches_exactly() {
        assert!(matching_codes(&["39100000"], &["00000000"]).is_empty());
        assert_eq!(matching_codes(&["00000000"], &["00000000"]), vec!["00000000"]);
    }

    #[test]
    fn repeated_notice_codes_are_kept() {
        assert_eq!(
            matching_codes(&["39110000", "39110000"], &["39100000", "39110000"]),
            vec!["39110000", "39110000"]
        );
    }

    #[test]
    fn empty_inputs_never_match() {
        let none: [&str; 0] = [];
        assert!(matching_codes(&none, &["39100000"]).is_empty());
        assert!(!has_match(&["39100000"], &none));
    }

    fn code() -> impl Strategy<Value = String> {
        prop_oneof!["[0-9]{8}", "[1-9]{2}0{6}", "[1-9]{3}0{5}"]
    }

    proptest! {
        #[test]
        fn result_is_subsequence_of_notice_codes(
            notice in prop::collection::vec(code(), 0..8),
            criteria in prop::collection::vec(code(), 0..8),
        ) {
            let matched = matching_codes(&notice, &criteria);
            let mut rest = notice.iter();
            for code in &matched {
                prop_assert!(rest.any(|n| n == code));
            }
        }

        #[test]
        fn has_match_agrees_with_matching_codes(
            notice in prop::collection::vec(code(), 0..8),
            criteria in prop::collection::vec(code(), 0..8),
        ) {
            prop_assert_eq!(
                has_match(&notice, &criteria),
                !matching_codes(&notice, &criteria).is_empty()
            );
        }
    }
}
