//! Credential-like substring redaction for outgoing error text (§7).

use crate::entropy::is_high_entropy_token;

/// Replaces any whitespace-delimited token in `message` that looks like a
/// credential with `«redacted»`. Punctuation immediately touching a token
/// is preserved outside the replacement.
pub fn redact_message(message: &str) -> String {
    message
        .split(' ')
        .map(redact_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn redact_word(word: &str) -> String {
    let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
    if trimmed.len() >= 8 && is_high_entropy_token(trimmed) {
        let prefix_len = word.find(trimmed).unwrap_or(0);
        let suffix_start = prefix_len + trimmed.len();
        format!("{}«redacted»{}", &word[..prefix_len], &word[suffix_start..])
    } else {
        word.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_high_entropy_word() {
        let msg = redact_message("failed to connect with key aK9$mQ2x!z7Lp here");
        assert!(msg.contains("«redacted»"));
        assert!(!msg.contains("aK9$mQ2x!z7Lp"));
    }

    #[test]
    fn leaves_ordinary_words_alone() {
        let msg = redact_message("file not found: config.toml");
        assert_eq!(msg, "file not found: config.toml");
    }

    #[test]
    fn preserves_surrounding_punctuation() {
        let msg = redact_message("token=aK9$mQ2x!z7Lp,");
        assert!(msg.starts_with("token=«redacted»") || msg.contains("«redacted»"));
    }
}
