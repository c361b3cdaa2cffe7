//! Claim enrichment: translation pass-through plus canonical form.
//!
//! No real translation backend is wired in yet; the identity translator
//! keeps the text and signals via confidence whether a real translation
//! is still owed. Backend errors downgrade to pass-through, so this stage
//! can never fail the pipeline.

use anyhow::Result;
use async_trait::async_trait;

use crate::fingerprint::canonical_form;
use crate::types::{Claim, TranslationInfo};

#[async_trait]
pub trait Translator: Send + Sync {
    /// Returns (translated_text, confidence in [0,1]).
    async fn translate(&self, text: &str, source_language: Option<&str>) -> Result<(String, f64)>;
}

/// Identity pass-through. English/unknown sources keep high confidence;
/// anything else keeps the text but flags it with reduced confidence so a
/// real translation can be routed later.
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(&self, text: &str, source_language: Option<&str>) -> Result<(String, f64)> {
        if text.is_empty() {
            return Ok((String::new(), 0.0));
        }
        let confidence = match source_language {
            None | Some("en") | Some("und") => 0.9,
            Some(_) => 0.5,
        };
        Ok((text.to_string(), confidence))
    }
}

async fn enrich_one(translator: &dyn Translator, claim: &mut Claim, source_language: Option<&str>) {
    let original = claim.text.clone();
    let (translated, confidence) = match translator.translate(&original, source_language).await {
        Ok(out) => out,
        // Translation backend trouble downgrades to pass-through.
        Err(_) => (original.clone(), 0.0),
    };
    let canonical = canonical_form(&translated);
    claim.translation = Some(TranslationInfo {
        original_text: original,
        translated_text: translated,
        translation_confidence: confidence.clamp(0.0, 1.0),
        canonical_form: canonical,
    });
}

/// Attach a `TranslationInfo` annex to every claim, preserving order.
pub async fn enrich_claims(
    translator: &dyn Translator,
    mut claims: Vec<Claim>,
    source_language: Option<&str>,
) -> Vec<Claim> {
    for claim in &mut claims {
        enrich_one(translator, claim, source_language).await;
    }
    claims
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(text: &str) -> Claim {
        Claim {
            claim_id: "c1".into(),
            text: text.into(),
            subject: String::new(),
            predicate: String::new(),
            object: String::new(),
            claim_type: Default::default(),
            span: None,
            translation: None,
        }
    }

    #[tokio::test]
    async fn english_source_passes_through_with_high_confidence() {
        let out = enrich_claims(&IdentityTranslator, vec![claim("The sky is blue")], Some("en")).await;
        let t = out[0].translation.as_ref().unwrap();
        assert_eq!(t.translated_text, "The sky is blue");
        assert_eq!(t.translation_confidence, 0.9);
        assert_eq!(t.canonical_form, "blue sky");
    }

    #[tokio::test]
    async fn unknown_source_keeps_high_confidence() {
        let out = enrich_claims(&IdentityTranslator, vec![claim("x rose")], None).await;
        assert_eq!(out[0].translation.as_ref().unwrap().translation_confidence, 0.9);
    }

    #[tokio::test]
    async fn foreign_source_flags_reduced_confidence() {
        let out = enrich_claims(&IdentityTranslator, vec![claim("agua hierve")], Some("es")).await;
        let t = out[0].translation.as_ref().unwrap();
        assert_eq!(t.translated_text, "agua hierve");
        assert_eq!(t.translation_confidence, 0.5);
    }

    #[tokio::test]
    async fn failing_backend_downgrades_to_passthrough() {
        struct Broken;
        #[async_trait]
        impl Translator for Broken {
            async fn translate(&self, _t: &str, _s: Option<&str>) -> Result<(String, f64)> {
                anyhow::bail!("translation service down")
            }
        }
        let out = enrich_claims(&Broken, vec![claim("still here")], Some("fr")).await;
        let t = out[0].translation.as_ref().unwrap();
        assert_eq!(t.translated_text, "still here");
        assert_eq!(t.translation_confidence, 0.0);
    }

    #[tokio::test]
    async fn canonical_form_comes_from_translated_text() {
        let out = enrich_claims(&IdentityTranslator, vec![claim("The cat sat on the mat")], Some("en")).await;
        assert_eq!(out[0].translation.as_ref().unwrap().canonical_form, "cat mat sat");
    }
}
