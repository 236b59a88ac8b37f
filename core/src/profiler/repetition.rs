//! Sliding-window repetition and repeated-substring discovery.
use std::collections::{HashMap, HashSet};

use crate::constants::{MAX_PATTERN_WINDOW, MAX_PROFILE_PATTERNS, MAX_REPETITION_WINDOW, MIN_WINDOW};
use crate::utils::unit_clamp;

/// Fraction of windows (lengths 4..=min(64, len/10)) whose content was
/// already seen at an earlier position. 0 when the input is too short to window.
pub fn repetition_score(data: &[u8]) -> f64 {
    let max_window = MAX_REPETITION_WINDOW.min(data.len() / 10);
    if max_window < MIN_WINDOW {
        return 0.0;
    }

    let mut examined = 0u64;
    let mut repeated = 0u64;
    let mut seen: HashSet<&[u8]> = HashSet::with_capacity(data.len());

    for window in MIN_WINDOW..=max_window {
        seen.clear();
        for slice in data.windows(window) {
            examined += 1;
            if !seen.insert(slice) {
                repeated += 1;
            }
        }
    }

    if examined == 0 {
        0.0
    } else {
        unit_clamp(repeated as f64 / examined as f64)
    }
}

/// Substrings of length 4..=32 occurring more than twice, in the order they
/// first cross that threshold, at most `MAX_PROFILE_PATTERNS`.
///
/// Non-UTF-8 input is scanned up to its longest valid prefix.
pub fn repeated_substrings(data: &[u8]) -> Vec<String> {
    let text = match std::str::from_utf8(data) {
        Ok(t) => t,
        Err(e) => match std::str::from_utf8(&data[..e.valid_up_to()]) {
            Ok(t) => t,
            Err(_) => return Vec::new(),
        },
    };

    let mut patterns = Vec::new();
    let mut counts: HashMap<&str, u32> = HashMap::new();

    for window in MIN_WINDOW..=MAX_PATTERN_WINDOW {
        if window > text.len() {
            break;
        }
        counts.clear();
        for start in 0..=text.len() - window {
            let Some(candidate) = text.get(start..start + window) else {
                continue;
            };
            let count = counts.entry(candidate).or_insert(0);
            *count += 1;
            if *count == 3 {
                patterns.push(candidate.to_owned());
                if patterns.len() == MAX_PROFILE_PATTERNS {
                    return patterns;
                }
            }
        }
    }
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_has_no_repetition() {
        assert_eq!(repetition_score(b"abcdefghijk"), 0.0);
    }

    #[test]
    fn constant_input_is_nearly_all_repeated() {
        let data = vec![b'a'; 1000];
        assert!(repetition_score(&data) > 0.95);
    }

    #[test]
    fn patterns_require_three_occurrences() {
        let found = repeated_substrings(b"abcdXabcdYabcd");
        assert_eq!(found.first().map(String::as_str), Some("abcd"));

        let none = repeated_substrings(b"abcdXabcd");
        assert!(none.is_empty());
    }

    #[test]
    fn patterns_are_capped() {
        let text = "the quick brown fox jumps over the lazy dog. ".repeat(20);
        assert!(repeated_substrings(text.as_bytes()).len() <= MAX_PROFILE_PATTERNS);
    }

    #[test]
    fn multibyte_boundaries_are_skipped() {
        let text = "héllo wörld ".repeat(5);
        for p in repeated_substrings(text.as_bytes()) {
            assert!(text.contains(&p));
        }
    }
}
