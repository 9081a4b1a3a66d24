//! Raw feedback as returned by the AI scoring service.
//!
//! The upstream schema is not fixed: any field may be missing, and a field
//! may arrive with an unexpected JSON type. Every field is therefore an
//! explicit `Option`, and a value of the wrong type reads as `None` so the
//! normalizer's defaults apply.

use serde_json::{Map, Value};

use crate::feedback::score::round_score;

/// An overall score as sent upstream: a bare number or text such as `"30/100"`.
/// Integral JSON numbers stay exact; only fractions go through `f64`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawScore {
    Integer(i64),
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedback {
    pub overall_score: Option<RawScore>,
    /// 0–5 rating.
    pub overall_rating: Option<f64>,
    pub summary: Option<String>,
    pub job_match_percentage: Option<i64>,
    /// 0–10 compatibility.
    pub ats_compatibility: Option<f64>,
    pub strengths: Option<Vec<String>>,
    pub weaknesses: Option<Vec<String>>,
    pub recommendations: Option<Vec<String>>,
    pub missing_keywords: Option<Vec<String>>,
    pub key_concerns: Option<Vec<String>>,
}

impl RawFeedback {
    /// Reads each field independently from a parsed JSON value.
    /// Anything that is not an object yields the empty record.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        Self {
            overall_score: map.get("overall_score").and_then(raw_score),
            overall_rating: number(map, "overall_rating"),
            summary: text(map, "summary"),
            job_match_percentage: integer(map, "job_match_percentage"),
            ats_compatibility: number(map, "ats_compatibility"),
            strengths: string_list(map, "strengths"),
            weaknesses: string_list(map, "weaknesses"),
            recommendations: string_list(map, "recommendations"),
            missing_keywords: string_list(map, "missing_keywords"),
            key_concerns: string_list(map, "key_concerns"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field readers, shared with the canonical reader in `normalize`
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn raw_score(value: &Value) -> Option<RawScore> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(RawScore::Integer)
            .or_else(|| n.as_f64().map(RawScore::Number)),
        Value::String(s) => Some(RawScore::Text(s.clone())),
        _ => None,
    }
}

pub(crate) fn number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

/// A whole-number field. Integers are read exactly; fractions are rounded.
pub(crate) fn integer(map: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = map.get(key)?;
    value.as_i64().or_else(|| value.as_f64().map(round_score))
}

pub(crate) fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Non-string items are dropped; a non-array value reads as absent.
pub(crate) fn string_list(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items = map.get(key)?.as_array()?;
    let strings: Vec<String> = items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_owned))
        .collect();

    if strings.len() != items.len() {
        tracing::debug!(
            field = key,
            dropped = items.len() - strings.len(),
            "dropped non-string items from feedback list"
        );
    }
    Some(strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_every_field() {
        let raw = RawFeedback::from_value(&json!({
            "overall_score": "73/100",
            "overall_rating": 4,
            "summary": "Solid",
            "job_match_percentage": 64,
            "ats_compatibility": 7.5,
            "strengths": ["Clear layout"],
            "weaknesses": ["No metrics"],
            "recommendations": ["Add metrics"],
            "missing_keywords": ["Kubernetes"],
            "key_concerns": ["Gap in 2021"]
        }));

        assert_eq!(raw.overall_score, Some(RawScore::Text("73/100".to_string())));
        assert_eq!(raw.overall_rating, Some(4.0));
        assert_eq!(raw.summary.as_deref(), Some("Solid"));
        assert_eq!(raw.job_match_percentage, Some(64));
        assert_eq!(raw.ats_compatibility, Some(7.5));
        assert_eq!(raw.strengths, Some(vec!["Clear layout".to_string()]));
        assert_eq!(raw.key_concerns, Some(vec!["Gap in 2021".to_string()]));
    }

    #[test]
    fn test_wrong_types_read_as_absent() {
        let raw = RawFeedback::from_value(&json!({
            "overall_score": true,
            "overall_rating": "four",
            "summary": 12,
            "strengths": "Clear layout"
        }));

        assert_eq!(raw, RawFeedback::default());
    }

    #[test]
    fn test_non_string_list_items_are_dropped() {
        let raw = RawFeedback::from_value(&json!({
            "recommendations": ["Add metrics", 3, null, "Trim summary"]
        }));

        assert_eq!(
            raw.recommendations,
            Some(vec!["Add metrics".to_string(), "Trim summary".to_string()])
        );
    }

    #[test]
    fn test_integers_stay_exact() {
        let big = 9_007_199_254_740_993_i64;
        let raw = RawFeedback::from_value(&json!({
            "overall_score": big,
            "job_match_percentage": 64.6
        }));

        assert_eq!(raw.overall_score, Some(RawScore::Integer(big)));
        assert_eq!(raw.job_match_percentage, Some(65));
        assert_eq!(
            raw_score(&json!(72.5)),
            Some(RawScore::Number(72.5))
        );
    }

    #[test]
    fn test_non_object_is_empty_record() {
        assert_eq!(RawFeedback::from_value(&json!([1, 2])), RawFeedback::default());
        assert_eq!(RawFeedback::from_value(&json!("text")), RawFeedback::default());
    }
}
