//! Word-limit helpers for prompts and generated captions.

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Keep at most `limit` words, rejoined with single spaces.
///
/// Returns the resulting text and whether anything was cut.
pub fn truncate_words(text: &str, limit: usize) -> (String, bool) {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return (words.join(" "), false);
    }
    (words[..limit].join(" "), true)
}

/// Substitute `{word_limit}` into the prompt template.
pub fn build_prompt(template: &str, word_limit: usize) -> String {
    template.replace("{word_limit}", &word_limit.to_string())
}

/// Token budget for a caption of `word_limit` words, capped at `cap`.
///
/// English averages well under two tokens per word; the extra headroom keeps
/// models from being cut off mid-sentence before truncation applies.
pub fn max_tokens_for(word_limit: usize, cap: u32) -> u32 {
    let budget = (word_limit as u32).saturating_mul(2).saturating_add(16);
    budget.min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  a  red\tkite\n"), 3);
    }

    #[test]
    fn test_truncate_words_within_limit() {
        let (text, truncated) = truncate_words("A dog on a beach.", 20);
        assert_eq!(text, "A dog on a beach.");
        assert!(!truncated);
    }

    #[test]
    fn test_truncate_words_over_limit() {
        let (text, truncated) = truncate_words("A brown dog runs along a sandy beach at sunset", 5);
        assert_eq!(text, "A brown dog runs along");
        assert!(truncated);
        assert_eq!(word_count(&text), 5);
    }

    #[test]
    fn test_truncate_words_normalizes_whitespace() {
        let (text, truncated) = truncate_words("two\n\nlines  here", 10);
        assert_eq!(text, "two lines here");
        assert!(!truncated);
    }

    #[test]
    fn test_build_prompt() {
        assert_eq!(
            build_prompt("Use at most {word_limit} words.", 12),
            "Use at most 12 words."
        );
        assert_eq!(build_prompt("No placeholder", 12), "No placeholder");
    }

    #[test]
    fn test_max_tokens_for() {
        assert_eq!(max_tokens_for(20, 300), 56);
        assert_eq!(max_tokens_for(1000, 300), 300);
    }
}
