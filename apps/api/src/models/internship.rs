use serde::{Deserialize, Serialize};

/// Input of the external matching flow. Field names are the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    /// Full extracted CV text. The only source of truth for the flow.
    pub resume: String,
}

/// One internship record exactly as the matching flow returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub company: String,
    pub role: String,
    pub cv_match_reason: String,
    pub skills_required: String,
    pub location: String,
    pub direct_career_link: String,
}

/// Output of the external matching flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub results: Vec<MatchRecord>,
}

/// A record plus display augmentations.
///
/// The augmentations stay `None` unless a real source fills them; no value is
/// ever synthesized for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(flatten)]
    pub record: MatchRecord,
    /// 0 – 100, from a `MatchScorer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl From<MatchRecord> for MatchResult {
    fn from(record: MatchRecord) -> Self {
        Self {
            record,
            match_score: None,
            salary_range: None,
            duration: None,
        }
    }
}
