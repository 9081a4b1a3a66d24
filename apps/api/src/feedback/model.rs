use serde::{Deserialize, Serialize};

/// A scored review category with its free-text feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub score: i64,
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Good,
    Improve,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub tip: String,
}

impl AtsSuggestion {
    pub fn improve(tip: impl Into<String>) -> Self {
        Self {
            kind: SuggestionKind::Improve,
            tip: tip.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsScore {
    pub score: i64,
    pub suggestions: Vec<AtsSuggestion>,
}

/// The canonical feedback record every rendering surface consumes.
///
/// Scores are always defined integers and list fields are always present,
/// so consumers never need to guard against missing values. Field names on
/// the wire match the records already stored by the web client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFeedback {
    #[serde(rename = "overallScore")]
    pub overall_score: i64,
    #[serde(rename = "toneAndStyle")]
    pub tone_and_style: CategoryScore,
    pub content: CategoryScore,
    pub structure: CategoryScore,
    pub skills: CategoryScore,
    #[serde(rename = "ATS")]
    pub ats: AtsScore,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub key_concerns: Vec<String>,
    pub job_match_percentage: i64,
}
