//! Semantic fingerprinting for verdict deduplication.
//!
//! Two paraphrases with the same bag of significant words collide on
//! purpose: that is the dedup policy, not a bug.

/// Stopwords dropped before fingerprinting/canonicalization.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "of", "and", "or", "to", "in", "on", "for", "with",
    "at", "by", "from", "is", "are", "was", "were", "be", "been", "being",
];

fn significant_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .filter(|t| !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Order-independent digest of the significant tokens, used as the cache
/// key. Empty output means "no fingerprint": the cache must be bypassed.
pub fn fingerprint(text: &str) -> String {
    let mut tokens = significant_tokens(text);
    tokens.sort_unstable();
    tokens.join("|")
}

/// Same token bag joined with spaces; human-inspectable canonical form
/// attached to claims during enrichment.
pub fn canonical_form(text: &str) -> String {
    let mut tokens = significant_tokens(text);
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commutative_over_token_order() {
        assert_eq!(fingerprint("the cat sat"), fingerprint("sat cat"));
        assert_eq!(fingerprint("the cat sat"), "cat|sat");
    }

    #[test]
    fn deterministic() {
        let a = fingerprint("Company X profits rose 50% in 2024.");
        let b = fingerprint("Company X profits rose 50% in 2024.");
        assert_eq!(a, b);
    }

    #[test]
    fn empty_and_stopword_only_yield_empty() {
        assert_eq!(fingerprint(""), "");
        assert_eq!(fingerprint("the of and"), "");
        assert_eq!(fingerprint("  !!  "), "");
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert_eq!(fingerprint("Cats, DOGS!"), fingerprint("dogs cats"));
    }

    #[test]
    fn canonical_form_is_space_joined() {
        assert_eq!(canonical_form("The cat sat on the mat"), "cat mat sat");
    }
}
