//! Presentation Adapter: groups the canonical record for each review panel.

use serde::Serialize;

use crate::feedback::model::{AtsSuggestion, NormalizedFeedback};

pub const PENDING_ANALYSIS: &str = "Loading your resume analysis...";
pub const NO_DETAILS: &str = "No details available";

/// Colour bucket for a score: above 70 is Good, 50–70 is Warning, below 50 is Poor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Good,
    Warning,
    Poor,
}

impl ScoreTier {
    pub fn from_score(score: i64) -> Self {
        if score > 70 {
            ScoreTier::Good
        } else if score > 49 {
            ScoreTier::Warning
        } else {
            ScoreTier::Poor
        }
    }
}

/// A rendered panel, or its placeholder while no analysis exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready(T),
    Pending { message: String },
}

impl<T> Panel<T> {
    fn pending(message: &str) -> Self {
        Panel::Pending {
            message: message.to_string(),
        }
    }

    #[cfg(test)]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(view) => Some(view),
            Panel::Pending { .. } => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Summary
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCategory {
    pub title: &'static str,
    pub score: i64,
    pub tier: ScoreTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub overall_score: i64,
    pub overall_tier: ScoreTier,
    pub categories: Vec<SummaryCategory>,
}

pub fn summary_view(feedback: Option<&NormalizedFeedback>) -> Panel<SummaryView> {
    let Some(fb) = feedback else {
        return Panel::pending(PENDING_ANALYSIS);
    };

    let categories = [
        ("Tone & Style", fb.tone_and_style.score),
        ("Content", fb.content.score),
        ("Structure", fb.structure.score),
        ("Skills", fb.skills.score),
    ]
    .into_iter()
    .map(|(title, score)| SummaryCategory {
        title,
        score,
        tier: ScoreTier::from_score(score),
    })
    .collect();

    Panel::Ready(SummaryView {
        overall_score: fb.overall_score,
        overall_tier: ScoreTier::from_score(fb.overall_score),
        categories,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// ATS
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtsView {
    pub score: i64,
    pub tier: ScoreTier,
    pub suggestions: Vec<AtsSuggestion>,
}

pub fn ats_view(feedback: Option<&NormalizedFeedback>) -> Panel<AtsView> {
    let Some(fb) = feedback else {
        return Panel::pending(PENDING_ANALYSIS);
    };

    Panel::Ready(AtsView {
        score: fb.ats.score,
        tier: ScoreTier::from_score(fb.ats.score),
        suggestions: fb.ats.suggestions.clone(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Details
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKey {
    Strengths,
    Weaknesses,
    KeyConcerns,
    MissingKeywords,
    Recommendations,
}

impl DetailKey {
    /// Panel order.
    pub const ALL: [DetailKey; 5] = [
        DetailKey::Strengths,
        DetailKey::Weaknesses,
        DetailKey::KeyConcerns,
        DetailKey::MissingKeywords,
        DetailKey::Recommendations,
    ];

    pub fn title(self) -> &'static str {
        match self {
            DetailKey::Strengths => "Strengths",
            DetailKey::Weaknesses => "Areas for Improvement",
            DetailKey::KeyConcerns => "Key Concerns",
            DetailKey::MissingKeywords => "Missing Keywords",
            DetailKey::Recommendations => "Recommendations",
        }
    }

    pub fn layout(self) -> SectionLayout {
        match self {
            DetailKey::MissingKeywords => SectionLayout::Chips,
            _ => SectionLayout::List,
        }
    }

    fn items(self, fb: &NormalizedFeedback) -> &[String] {
        match self {
            DetailKey::Strengths => &fb.strengths,
            DetailKey::Weaknesses => &fb.weaknesses,
            DetailKey::KeyConcerns => &fb.key_concerns,
            DetailKey::MissingKeywords => &fb.missing_keywords,
            DetailKey::Recommendations => &fb.recommendations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLayout {
    List,
    Chips,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailSection {
    pub key: DetailKey,
    pub title: &'static str,
    pub layout: SectionLayout,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsView {
    pub sections: Vec<DetailSection>,
}

/// Empty lists are left out entirely rather than rendered as empty sections.
pub fn details_view(feedback: Option<&NormalizedFeedback>) -> Panel<DetailsView> {
    let Some(fb) = feedback else {
        return Panel::pending(NO_DETAILS);
    };

    let sections = DetailKey::ALL
        .into_iter()
        .filter_map(|key| {
            let items = key.items(fb);
            (!items.is_empty()).then(|| DetailSection {
                key,
                title: key.title(),
                layout: key.layout(),
                items: items.to_vec(),
            })
        })
        .collect();

    Panel::Ready(DetailsView { sections })
}

/// All three panels for one review page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewViews {
    pub summary: Panel<SummaryView>,
    pub ats: Panel<AtsView>,
    pub details: Panel<DetailsView>,
}

pub fn review_views(feedback: Option<&NormalizedFeedback>) -> ReviewViews {
    ReviewViews {
        summary: summary_view(feedback),
        ats: ats_view(feedback),
        details: details_view(feedback),
    }
}
