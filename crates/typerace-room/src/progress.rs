//! Progress tracking: per-character correctness of a typed prefix.
//!
//! All functions here are pure. Positions and lengths count `char`s so
//! that every Hangul syllable or accented letter scores as one character.

use typerace_protocol::TypingError;

/// Truncates `input` to the length of `target`.
///
/// Characters past the end of the target can never be validated, so they
/// are dropped before scoring and before the input is stored.
pub fn cap_input(target: &str, input: &str) -> String {
    input.chars().take(target.chars().count()).collect()
}

/// Lists every position where `input` differs from `target`, in order.
///
/// Only positions `< min(len(input), len(target))` are considered.
pub fn compute_errors(target: &str, input: &str) -> Vec<TypingError> {
    target
        .chars()
        .zip(input.chars())
        .enumerate()
        .filter(|(_, (expected, actual))| expected != actual)
        .map(|(position, (expected, actual))| TypingError {
            position,
            expected,
            actual,
        })
        .collect()
}

/// `min(100, round(len(input) / len(target) * 100))`. An empty target
/// yields 0.
pub fn progress_percent(target: &str, input: &str) -> u8 {
    let target_len = target.chars().count();
    if target_len == 0 {
        return 0;
    }
    let ratio = input.chars().count() as f64 / target_len as f64;
    (ratio * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(errors: &[TypingError]) -> Vec<usize> {
        errors.iter().map(|e| e.position).collect()
    }

    #[test]
    fn test_exact_prefix_has_no_errors() {
        assert!(compute_errors("abc", "").is_empty());
        assert!(compute_errors("abc", "ab").is_empty());
        assert!(compute_errors("abc", "abc").is_empty());
    }

    #[test]
    fn test_mismatch_reports_expected_and_actual() {
        let errors = compute_errors("abc", "abd");
        assert_eq!(
            errors,
            vec![TypingError {
                position: 2,
                expected: 'c',
                actual: 'd',
            }]
        );
    }

    #[test]
    fn test_errors_are_exactly_the_mismatched_indices() {
        let target = "the quick brown fox";
        let inputs = ["tha", "xhe quick", "the quack brawn", "THE", "the quick brown fox"];
        for input in inputs {
            let expected: Vec<usize> = target
                .chars()
                .zip(input.chars())
                .enumerate()
                .filter(|(_, (t, i))| t != i)
                .map(|(i, _)| i)
                .collect();
            let errors = compute_errors(target, input);
            assert_eq!(positions(&errors), expected, "input {input:?}");
            assert!(errors.iter().all(|e| e.position < input.chars().count()));
        }
    }

    #[test]
    fn test_input_past_target_is_not_scored() {
        let errors = compute_errors("ab", "abXYZ");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_positions_count_chars_not_bytes() {
        let errors = compute_errors("가나다", "가너다");
        assert_eq!(
            errors,
            vec![TypingError {
                position: 1,
                expected: '나',
                actual: '너',
            }]
        );
    }

    #[test]
    fn test_compute_errors_is_idempotent() {
        let a = compute_errors("hello world", "hellp wurld");
        let b = compute_errors("hello world", "hellp wurld");
        assert_eq!(a, b);
    }

    #[test]
    fn test_cap_input_truncates_to_target_length() {
        assert_eq!(cap_input("abc", "abcdef"), "abc");
        assert_eq!(cap_input("abc", "ab"), "ab");
        assert_eq!(cap_input("가나", "가나다라"), "가나");
    }

    #[test]
    fn test_progress_percent_rounds() {
        assert_eq!(progress_percent("abc", ""), 0);
        assert_eq!(progress_percent("abc", "a"), 33);
        assert_eq!(progress_percent("abc", "ab"), 67);
        assert_eq!(progress_percent("abc", "abc"), 100);
    }

    #[test]
    fn test_progress_percent_is_capped_at_100() {
        assert_eq!(progress_percent("abc", "abcdef"), 100);
    }

    #[test]
    fn test_progress_percent_empty_target() {
        assert_eq!(progress_percent("", "abc"), 0);
    }

    #[test]
    fn test_progress_is_monotonic_when_appending() {
        let target = "A journey of a thousand miles begins with a single step";
        let mut input = String::new();
        let mut last = progress_percent(target, &input);
        for c in "A jurney of a thousand miles begins with a single step and more".chars() {
            input.push(c);
            let now = progress_percent(target, &input);
            assert!(now >= last, "{now} < {last} at {input:?}");
            last = now;
        }
        assert_eq!(last, 100);
    }
}
