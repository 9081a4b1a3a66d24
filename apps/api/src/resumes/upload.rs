//! Resume upload: multipart parsing, file checks, storage and analysis.

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::AnalysisRequest;
use crate::errors::AppError;
use crate::resumes::record::{preview_blob_path, resume_blob_path, save_record, ResumeRecord};
use crate::state::AppState;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub file: Option<UploadedFile>,
    pub preview: Option<UploadedFile>,
}

fn too_large_message(max_mb: usize) -> String {
    format!("File is too large! Maximum size is {max_mb} MB.")
}

fn multipart_error(e: MultipartError, max_mb: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(too_large_message(max_mb))
    } else {
        AppError::Validation(format!("File upload failed. Please try again. ({e})"))
    }
}

/// Reads the upload form. Unknown fields are ignored.
pub async fn read_upload_form(
    mut multipart: Multipart,
    max_mb: usize,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_mb))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "company_name" | "job_title" | "job_description" => {
                let value = field.text().await.map_err(|e| multipart_error(e, max_mb))?;
                let value = value.trim().to_string();
                match name.as_str() {
                    "company_name" => form.company_name = value,
                    "job_title" => form.job_title = value,
                    _ => form.job_description = value,
                }
            }
            "file" | "preview" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| multipart_error(e, max_mb))?;
                let upload = UploadedFile {
                    file_name,
                    content_type,
                    data,
                };
                if name == "file" {
                    form.file = Some(upload);
                } else {
                    form.preview = Some(upload);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Accepts a single PDF no larger than `max_bytes`.
pub fn validate_resume_file(
    file: Option<&UploadedFile>,
    max_bytes: usize,
    max_mb: usize,
) -> Result<&UploadedFile, AppError> {
    let file = file
        .filter(|f| !f.data.is_empty())
        .ok_or_else(|| AppError::Validation("Please upload a PDF file first!".to_string()))?;

    let declared_pdf = file.content_type == "application/pdf"
        || file.file_name.to_ascii_lowercase().ends_with(".pdf");
    if !declared_pdf || !file.data.starts_with(PDF_MAGIC) {
        return Err(AppError::UnsupportedMediaType(
            "Only PDF files are allowed!".to_string(),
        ));
    }

    if file.data.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(too_large_message(max_mb)));
    }
    Ok(file)
}

/// File extension for an accepted preview image type.
pub fn preview_extension(content_type: &str) -> Result<&'static str, AppError> {
    match content_type {
        "image/png" => Ok("png"),
        "image/jpeg" => Ok("jpg"),
        "image/webp" => Ok("webp"),
        other => Err(AppError::UnsupportedMediaType(format!(
            "Preview must be a PNG, JPEG or WebP image, got '{other}'"
        ))),
    }
}

/// Content type to serve a stored blob with, from its extension.
pub fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Stores the files, runs the analysis and persists the record.
///
/// A failed analysis stores the record with no feedback, which reads as pending.
pub async fn create_resume(
    state: &AppState,
    owner: &str,
    form: UploadForm,
) -> Result<ResumeRecord, AppError> {
    let max_mb = state.config.max_upload_mb;
    let file = validate_resume_file(form.file.as_ref(), state.config.max_upload_bytes(), max_mb)?;
    let preview_ext = form
        .preview
        .as_ref()
        .map(|p| preview_extension(&p.content_type))
        .transpose()?;

    let id = Uuid::new_v4();
    let resume_path = resume_blob_path(owner, id);
    state
        .blobs
        .write(&resume_path, file.data.clone(), "application/pdf")
        .await?;

    let image_path = match (form.preview.as_ref(), preview_ext) {
        (Some(preview), Some(ext)) => {
            let path = preview_blob_path(owner, id, ext);
            state
                .blobs
                .write(&path, preview.data.clone(), &preview.content_type)
                .await?;
            Some(path)
        }
        _ => None,
    };

    let analysis = state
        .feedback_service
        .analyze(AnalysisRequest {
            company_name: &form.company_name,
            job_title: &form.job_title,
            job_description: &form.job_description,
            pdf: file.data.clone(),
        })
        .await;
    let feedback = match analysis {
        Ok(raw) => Some(raw),
        Err(e) => {
            warn!("analysis failed for resume {id}, storing as pending: {e}");
            None
        }
    };

    let record = ResumeRecord {
        id,
        company_name: form.company_name,
        job_title: form.job_title,
        job_description: form.job_description,
        resume_path,
        image_path,
        feedback,
        created_at: Utc::now(),
    };
    save_record(state.kv.as_ref(), owner, &record).await?;

    info!(
        "Stored resume {id} for {owner} ({} bytes, analyzed: {})",
        file.data.len(),
        record.feedback.is_some()
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str, content_type: &str, data: &'static [u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = validate_resume_file(None, 1024, 1).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("upload a PDF")));

        let empty = pdf("cv.pdf", "application/pdf", b"");
        assert!(matches!(
            validate_resume_file(Some(&empty), 1024, 1),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_non_pdf_rejected() {
        let docx = pdf("cv.docx", "application/msword", b"PK\x03\x04");
        assert!(matches!(
            validate_resume_file(Some(&docx), 1024, 1),
            Err(AppError::UnsupportedMediaType(_))
        ));

        // right name, wrong bytes
        let fake = pdf("cv.pdf", "application/pdf", b"hello");
        assert!(matches!(
            validate_resume_file(Some(&fake), 1024, 1),
            Err(AppError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn test_extension_alone_is_enough_declaration() {
        let file = pdf("CV.PDF", "application/octet-stream", b"%PDF-1.7 ...");
        assert!(validate_resume_file(Some(&file), 1024, 1).is_ok());
    }

    #[test]
    fn test_oversized_pdf_rejected() {
        let file = pdf("cv.pdf", "application/pdf", b"%PDF-1.7 0123456789");
        let err = validate_resume_file(Some(&file), 10, 1).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(msg) if msg.contains("Maximum size is 1 MB")));
    }

    #[test]
    fn test_preview_types() {
        assert_eq!(preview_extension("image/png").unwrap(), "png");
        assert_eq!(preview_extension("image/jpeg").unwrap(), "jpg");
        assert!(preview_extension("image/gif").is_err());
    }

    #[test]
    fn test_content_type_for_paths() {
        assert_eq!(content_type_for("resumes/a/1/resume.pdf"), "application/pdf");
        assert_eq!(content_type_for("resumes/a/1/preview.jpg"), "image/jpeg");
        assert_eq!(content_type_for("resumes/a/1/blob"), "application/octet-stream");
    }
}
