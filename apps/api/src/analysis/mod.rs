//! Resume analysis: asks the external AI service for raw feedback.
//!
//! The returned JSON is stored as-is; shaping it for display is the job of
//! `feedback::normalize`. `AppState` holds an `Arc<dyn FeedbackService>` so
//! handlers and tests never depend on the concrete backend.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

pub mod client;
pub mod prompts;

use client::{parse_json_object, AnthropicClient, LlmError};

/// Upper bound on resume text sent to the model.
const MAX_RESUME_CHARS: usize = 20_000;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("PDF contains no extractable text")]
    EmptyResume,

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// What the analyzer needs to know about one application.
pub struct AnalysisRequest<'a> {
    pub company_name: &'a str,
    pub job_title: &'a str,
    pub job_description: &'a str,
    pub pdf: Bytes,
}

#[async_trait]
pub trait FeedbackService: Send + Sync {
    /// Returns the raw feedback object for a resume.
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<Value, AnalysisError>;
}

/// Extracts the resume text locally, then asks Claude for a review.
pub struct LlmFeedbackService {
    client: AnthropicClient,
}

impl LlmFeedbackService {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedbackService for LlmFeedbackService {
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<Value, AnalysisError> {
        let resume_text = extract_resume_text(request.pdf).await?;
        info!(chars = resume_text.len(), "Extracted resume text");

        let prompt = prompts::build_review_prompt(
            request.company_name,
            request.job_title,
            request.job_description,
            &resume_text,
        );
        let output = self.client.complete(prompts::REVIEW_SYSTEM, &prompt).await?;
        Ok(parse_json_object(&output)?)
    }
}

/// PDF parsing is CPU-bound, so it runs on the blocking pool.
pub async fn extract_resume_text(pdf: Bytes) -> Result<String, AnalysisError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| AnalysisError::Pdf(e.to_string()))?
        .map_err(|e| AnalysisError::Pdf(e.to_string()))?;

    let text = collapse_whitespace(&text);
    if text.is_empty() {
        return Err(AnalysisError::EmptyResume);
    }
    Ok(truncate_chars(text, MAX_RESUME_CHARS))
}

/// Joins non-blank lines and squeezes runs of spaces left by PDF layout.
fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
    text
}
