//! Text cleanup and heuristic language detection.
//!
//! Stands in for a real language-ID model; the pipeline only needs a
//! cleaned text and a coarse source-language code for translation routing
//! and the language metric.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::LanguageAnalysis;

lazy_static! {
    static ref HTML_TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref URL_RE: Regex = Regex::new(r"(?i)https?://\S+").unwrap();
    static ref EMOJI_RE: Regex = Regex::new(r"[\x{10000}-\x{10FFFF}]").unwrap();
    static ref WS_RE: Regex = Regex::new(r"\s+").unwrap();
}

pub fn clean_text(raw: &str) -> String {
    let text = HTML_TAG_RE.replace_all(raw, " ");
    let text = URL_RE.replace_all(&text, " ");
    let text = EMOJI_RE.replace_all(&text, "");
    WS_RE.replace_all(text.trim(), " ").trim().to_string()
}

fn detect(clean: &str) -> (String, f64) {
    if clean.is_empty() {
        return ("und".to_string(), 0.0);
    }

    let latin = clean.chars().filter(|c| c.is_ascii_alphabetic()).count();
    let devanagari = clean
        .chars()
        .filter(|c| ('\u{0900}'..='\u{097F}').contains(c))
        .count();
    let total = latin + devanagari;
    if total == 0 {
        return ("und".to_string(), 0.1);
    }

    let latin_ratio = latin as f64 / total as f64;
    if latin_ratio > 0.7 {
        return ("en".to_string(), latin_ratio.min(0.9));
    }
    if devanagari as f64 / total as f64 > 0.7 {
        // Many Indian languages share Devanagari; treated as "hi" here.
        return ("hi".to_string(), 0.8);
    }
    ("und".to_string(), 0.3)
}

/// Clean the raw text and attach a coarse language guess.
pub fn analyze(raw: &str) -> LanguageAnalysis {
    let clean = clean_text(raw);
    let (mut language, mut confidence) = detect(&clean);

    // Low-confidence fallback: longish Latin-script text leans English.
    if confidence < 0.3 && !clean.is_empty() {
        let latin = clean.chars().filter(|c| c.is_ascii_alphabetic()).count();
        if latin > 5 {
            language = "en".to_string();
            confidence = 0.35;
        }
    }

    LanguageAnalysis { clean_text: clean, language, confidence }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_html_and_urls() {
        let out = clean_text("<b>Big</b> news at https://example.com/x now");
        assert_eq!(out, "Big news at now");
    }

    #[test]
    fn detects_english() {
        let a = analyze("The quick brown fox jumps over the lazy dog.");
        assert_eq!(a.language, "en");
        assert!(a.confidence > 0.5);
    }

    #[test]
    fn detects_devanagari_as_hi() {
        let a = analyze("यह एक परीक्षण वाक्य है");
        assert_eq!(a.language, "hi");
    }

    #[test]
    fn empty_input_is_undetermined() {
        let a = analyze("   ");
        assert_eq!(a.language, "und");
        assert_eq!(a.clean_text, "");
        assert_eq!(a.confidence, 0.0);
    }
}
