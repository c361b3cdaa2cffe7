use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned to a claim by the extraction oracle. Anything the
/// oracle invents outside the known set deserializes to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Causal,
    Descriptive,
    Statistical,
    Event,
    #[serde(other)]
    #[default]
    Other,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Causal => "causal",
            ClaimType::Descriptive => "descriptive",
            ClaimType::Statistical => "statistical",
            ClaimType::Event => "event",
            ClaimType::Other => "other",
        }
    }
}

/// Translation annex attached to a claim during enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationInfo {
    pub original_text: String,
    pub translated_text: String,
    pub translation_confidence: f64,
    /// Stopword-filtered, sorted bag-of-words form of the translated text.
    /// For human inspection; the cache key is the fingerprint, not this.
    pub canonical_form: String,
}

/// One atomic factual claim extracted from the input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique within a pipeline run; backfilled by the extractor if the
    /// oracle omits it.
    #[serde(default)]
    pub claim_id: String,
    pub text: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub predicate: String,
    #[serde(default)]
    pub object: String,
    #[serde(rename = "type", default)]
    pub claim_type: ClaimType,
    /// Character span (start, end) in the source text, when the oracle
    /// reports one.
    #[serde(default)]
    pub span: Option<(usize, usize)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<TranslationInfo>,
}

/// One evidence candidate from a retrieval backend. Immutable once built;
/// `final_score` is filled in by fusion scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub snippet: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub source_credibility: f64,
    pub semantic_score: f64,
    pub recency_score: f64,
    #[serde(default)]
    pub final_score: f64,
}

/// Ranked evidence list for a single claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimEvidence {
    pub claim_id: String,
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StanceLabel {
    Support,
    Refute,
    #[serde(other)]
    #[default]
    Neutral,
}

impl StanceLabel {
    /// Signed weight used by veracity aggregation.
    pub fn weight(&self) -> f64 {
        match self {
            StanceLabel::Support => 1.0,
            StanceLabel::Refute => -1.0,
            StanceLabel::Neutral => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceResult {
    pub stance: StanceLabel,
    pub confidence: f64,
}

impl StanceResult {
    pub fn neutral() -> Self {
        Self { stance: StanceLabel::Neutral, confidence: 0.0 }
    }
}

/// Stance result keyed to the (claim, evidence) pair it was computed for.
/// The aggregator looks stances up by key instead of slicing a flat list,
/// so a stage that filters or reorders cannot silently misalign results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StancePair {
    pub claim_id: String,
    pub evidence_id: String,
    #[serde(flatten)]
    pub result: StanceResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Likely True")]
    LikelyTrue,
    #[serde(rename = "Likely False")]
    LikelyFalse,
    #[serde(rename = "Unverified")]
    Unverified,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::LikelyTrue => "Likely True",
            Verdict::LikelyFalse => "Likely False",
            Verdict::Unverified => "Unverified",
        }
    }
}

/// Final per-claim verdict produced by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VeracityResult {
    pub claim_id: String,
    pub verdict: Verdict,
    pub score: f64,
    pub confidence: f64,
    pub explanation: String,
    pub evidence_used: Vec<Evidence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PayloadContent {
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

/// Upstream language analysis; filled in by the pipeline when the
/// ingestion side did not provide one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageAnalysis {
    pub clean_text: String,
    pub language: String,
    pub confidence: f64,
}

/// Normalized unit of work, the shape every ingestion connector produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelinePayload {
    pub platform: String,
    #[serde(default)]
    pub content: PayloadContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_analysis: Option<LanguageAnalysis>,
}

impl PipelinePayload {
    pub fn from_text(platform: &str, text: &str) -> Self {
        Self {
            platform: platform.to_string(),
            content: PayloadContent { raw_text: text.to_string(), media: Vec::new() },
            language_analysis: None,
        }
    }
}

/// Terminal value of a verification run; also the cached unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub payload: PipelinePayload,
    pub claims: Vec<Claim>,
    pub evidence: Vec<ClaimEvidence>,
    /// Flat stance list in claim-major, evidence-minor order. Its length
    /// equals the total evidence count across claims.
    pub stances: Vec<StanceResult>,
    pub veracity: Vec<VeracityResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Started,
    Success,
    Failure,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<PipelineResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
