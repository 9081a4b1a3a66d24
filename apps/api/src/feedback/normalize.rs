//! Feedback Normalizer: maps raw AI feedback onto the canonical record.
//!
//! Each output field is derived independently with its own default:
//!
//! | Output                 | Derived from               | Default |
//! |------------------------|----------------------------|---------|
//! | overallScore           | extract_score(overall_score) | 0     |
//! | toneAndStyle.score     | overall_rating × 20        | 50      |
//! | toneAndStyle.feedback  | summary                    | ""      |
//! | content.score          | job_match_percentage       | 15      |
//! | content.feedback       | strengths joined ", "      | ""      |
//! | structure.score        | ats_compatibility × 10     | 60      |
//! | skills.score           | job_match_percentage       | 15      |
//! | skills.feedback        | missing_keywords joined    | ""      |
//! | ATS.score              | ats_compatibility × 10     | 60      |
//! | ATS.suggestions        | recommendations → improve  | []      |
//!
//! Nothing here fails: malformed input degrades to the defaults.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::feedback::model::{
    AtsScore, AtsSuggestion, CategoryScore, NormalizedFeedback, SuggestionKind,
};
use crate::feedback::raw::{self, RawFeedback};
use crate::feedback::score::{extract_score, round_score};

/// 5-point rating → 100-point scale.
pub const RATING_SCALE: f64 = 20.0;
/// 10-point compatibility → 100-point scale.
pub const COMPATIBILITY_SCALE: f64 = 10.0;

pub const DEFAULT_TONE_SCORE: i64 = 50;
pub const DEFAULT_MATCH_SCORE: i64 = 15;
pub const DEFAULT_ATS_SCORE: i64 = 60;
pub const STRUCTURE_FEEDBACK: &str = "Resume structure and ATS compatibility";

/// Key whose presence marks a record that is already canonical.
const CANONICAL_MARKER: &str = "overallScore";

/// Normalizes a parsed feedback payload.
///
/// Returns `None` when there is no feedback yet (absent, `null`, or another
/// JSON-falsy value). A record carrying a non-null `overallScore` is already
/// canonical and is read back as stored, never re-derived.
pub fn normalize(raw: Option<&Value>) -> Option<NormalizedFeedback> {
    let raw = raw.filter(|value| is_truthy(value))?;

    match raw.as_object() {
        Some(map) if map.get(CANONICAL_MARKER).is_some_and(|v| !v.is_null()) => {
            debug!("feedback already canonical");
            Some(read_canonical(map))
        }
        Some(_) => Some(normalize_raw(&RawFeedback::from_value(raw))),
        None => {
            warn!("feedback payload is not an object, using defaults");
            Some(normalize_raw(&RawFeedback::default()))
        }
    }
}

/// Derives the canonical record from typed raw feedback.
///
/// Defaults apply only to absent fields. A present 0 stays 0, so stored
/// feedback scored 0 renders as 0, not as the default (50, 15 or 60).
pub fn normalize_raw(raw: &RawFeedback) -> NormalizedFeedback {
    let match_score = raw.job_match_percentage.unwrap_or(DEFAULT_MATCH_SCORE);
    let ats_score = raw
        .ats_compatibility
        .map(|c| round_score(c * COMPATIBILITY_SCALE))
        .unwrap_or(DEFAULT_ATS_SCORE);

    NormalizedFeedback {
        overall_score: extract_score(raw.overall_score.as_ref()),
        tone_and_style: CategoryScore {
            score: raw
                .overall_rating
                .map(|r| round_score(r * RATING_SCALE))
                .unwrap_or(DEFAULT_TONE_SCORE),
            feedback: raw.summary.clone().unwrap_or_default(),
        },
        content: CategoryScore {
            score: match_score,
            feedback: joined(raw.strengths.as_deref()),
        },
        structure: CategoryScore {
            score: ats_score,
            feedback: STRUCTURE_FEEDBACK.to_string(),
        },
        skills: CategoryScore {
            score: match_score,
            feedback: joined(raw.missing_keywords.as_deref()),
        },
        ats: AtsScore {
            score: ats_score,
            suggestions: raw
                .recommendations
                .iter()
                .flatten()
                .map(AtsSuggestion::improve)
                .collect(),
        },
        strengths: raw.strengths.clone().unwrap_or_default(),
        weaknesses: raw.weaknesses.clone().unwrap_or_default(),
        recommendations: raw.recommendations.clone().unwrap_or_default(),
        missing_keywords: raw.missing_keywords.clone().unwrap_or_default(),
        key_concerns: raw.key_concerns.clone().unwrap_or_default(),
        job_match_percentage: raw.job_match_percentage.unwrap_or(0),
    }
}

fn joined(items: Option<&[String]>) -> String {
    items.map(|items| items.join(", ")).unwrap_or_default()
}

/// Falsy in the JavaScript sense: null, false, 0 and "".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical reader
// ────────────────────────────────────────────────────────────────────────────

/// Reads an already-canonical record. Sections missing from it take the
/// same defaults a raw record would get.
fn read_canonical(map: &Map<String, Value>) -> NormalizedFeedback {
    let ats = map.get("ATS").and_then(Value::as_object);

    NormalizedFeedback {
        overall_score: extract_score(
            map.get(CANONICAL_MARKER)
                .and_then(raw::raw_score)
                .as_ref(),
        ),
        tone_and_style: read_category(map, "toneAndStyle", DEFAULT_TONE_SCORE, ""),
        content: read_category(map, "content", DEFAULT_MATCH_SCORE, ""),
        structure: read_category(map, "structure", DEFAULT_ATS_SCORE, STRUCTURE_FEEDBACK),
        skills: read_category(map, "skills", DEFAULT_MATCH_SCORE, ""),
        ats: AtsScore {
            score: ats
                .and_then(|a| raw::integer(a, "score"))
                .unwrap_or(DEFAULT_ATS_SCORE),
            suggestions: ats.map(read_suggestions).unwrap_or_default(),
        },
        strengths: raw::string_list(map, "strengths").unwrap_or_default(),
        weaknesses: raw::string_list(map, "weaknesses").unwrap_or_default(),
        recommendations: raw::string_list(map, "recommendations").unwrap_or_default(),
        missing_keywords: raw::string_list(map, "missing_keywords").unwrap_or_default(),
        key_concerns: raw::string_list(map, "key_concerns").unwrap_or_default(),
        job_match_percentage: raw::integer(map, "job_match_percentage").unwrap_or(0),
    }
}

fn read_category(
    map: &Map<String, Value>,
    key: &str,
    default_score: i64,
    default_feedback: &str,
) -> CategoryScore {
    let section = map.get(key).and_then(Value::as_object);
    CategoryScore {
        score: section
            .and_then(|s| raw::integer(s, "score"))
            .unwrap_or(default_score),
        feedback: section
            .and_then(|s| raw::text(s, "feedback"))
            .unwrap_or_else(|| default_feedback.to_string()),
    }
}

fn read_suggestions(ats: &Map<String, Value>) -> Vec<AtsSuggestion> {
    let Some(items) = ats.get("suggestions").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let kind = match item.get("type").and_then(Value::as_str)? {
                "good" => SuggestionKind::Good,
                "improve" => SuggestionKind::Improve,
                other => {
                    debug!(kind = other, "skipping ATS suggestion of unknown type");
                    return None;
                }
            };
            let tip = item.get("tip").and_then(Value::as_str)?.to_string();
            Some(AtsSuggestion { kind, tip })
        })
        .collect()
}
