// Prompt constants for resume analysis.

/// System prompt. Enforces JSON-only output.
pub const REVIEW_SYSTEM: &str = "You are an experienced technical recruiter and \
    applicant tracking system expert. You review resumes against a target job. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Review prompt. Replace `{company_name}`, `{job_title}`,
/// `{job_description}` and `{resume_text}` before sending.
pub const REVIEW_PROMPT_TEMPLATE: &str = r#"Review the resume below for the following application.

Company: {company_name}
Job title: {job_title}
Job description:
{job_description}

Return a JSON object with this schema:
{
  "overall_score": "72/100",
  "overall_rating": 3.5,
  "summary": "One or two sentences on tone, style and overall impression.",
  "job_match_percentage": 65,
  "ats_compatibility": 7,
  "strengths": ["..."],
  "weaknesses": ["..."],
  "recommendations": ["..."],
  "missing_keywords": ["..."],
  "key_concerns": ["..."]
}

Scales:
- overall_score: out of 100, written as "N/100"
- overall_rating: 0 to 5
- job_match_percentage: 0 to 100
- ats_compatibility: 0 to 10

Each list holds short, specific items. Use an empty list when there is nothing to say.

Resume:
{resume_text}"#;

pub fn build_review_prompt(
    company_name: &str,
    job_title: &str,
    job_description: &str,
    resume_text: &str,
) -> String {
    fill_template(
        REVIEW_PROMPT_TEMPLATE,
        &[
            ("company_name", company_name),
            ("job_title", job_title),
            ("job_description", job_description),
            ("resume_text", resume_text),
        ],
    )
}

/// Substitutes `{name}` placeholders in one pass over the template, so
/// braces inside substituted values are copied verbatim. Unknown `{...}`
/// runs (the JSON schema) are left as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let value = tail.find('}').and_then(|close| {
            values
                .iter()
                .find(|(name, _)| *name == &tail[..close])
                .map(|(_, value)| (close, *value))
        });
        match value {
            Some((close, value)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_placeholders_are_filled() {
        let prompt = build_review_prompt("Acme", "Backend Engineer", "Rust, Postgres", "Jane Doe");
        assert!(prompt.contains("Company: Acme"));
        assert!(prompt.contains("Job title: Backend Engineer"));
        assert!(prompt.contains("Rust, Postgres"));
        assert!(prompt.ends_with("Jane Doe"));
        assert!(!prompt.contains("{resume_text}"));
        assert!(!prompt.contains("{company_name}"));
        assert!(prompt.contains("\"overall_score\": \"72/100\""));
    }

    #[test]
    fn test_placeholders_inside_values_are_not_expanded() {
        let prompt = build_review_prompt(
            "{job_title}",
            "Engineer",
            "Paste {resume_text} here",
            "Jane Doe",
        );
        assert!(prompt.contains("Company: {job_title}"));
        assert!(prompt.contains("Paste {resume_text} here"));
        assert_eq!(prompt.matches("Jane Doe").count(), 1);
    }
}
