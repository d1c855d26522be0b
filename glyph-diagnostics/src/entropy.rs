//! Shannon-entropy heuristic shared by Phase A's hardcoded-credential
//! detector and the error-message redaction pass (§7 ADDED). Kept here,
//! not in the analyzer, so both consumers use the exact same threshold.

use std::collections::HashMap;

/// Bits of entropy per character, estimated from the character frequency
/// distribution of `s`.
pub fn shannon_entropy_bits_per_char(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0u32;
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// A substring "looks like" a credential when it is long enough and dense
/// enough in information content. On its own this is necessary but not
/// sufficient — Phase A additionally requires the assignment target name to
/// match `/password|token|key|secret/i` before it fires (every disjunct of
/// a detector's precondition must hold; see the zero-false-positive rule).
pub fn is_high_entropy_token(s: &str) -> bool {
    s.len() >= 8 && shannon_entropy_bits_per_char(s) >= 3.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_entropy_strings_do_not_qualify() {
        assert!(!is_high_entropy_token("aaaaaaaa"));
        assert!(!is_high_entropy_token("short"));
    }

    #[test]
    fn high_entropy_strings_qualify() {
        assert!(is_high_entropy_token("aK9$mQ2x!z7Lp"));
    }

    #[test]
    fn entropy_of_empty_string_is_zero() {
        assert_eq!(shannon_entropy_bits_per_char(""), 0.0);
    }
}
