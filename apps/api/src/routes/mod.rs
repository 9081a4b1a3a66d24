pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth;
use crate::resumes::handlers;
use crate::state::AppState;

/// Room for the text fields and an optional preview image next to the PDF.
const FORM_OVERHEAD_BYTES: usize = 4 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes() + FORM_OVERHEAD_BYTES;

    let protected = Router::new()
        .route(
            "/api/v1/resumes",
            post(handlers::handle_upload)
                .get(handlers::handle_list)
                .delete(handlers::handle_wipe),
        )
        .route("/api/v1/resumes/:id", get(handlers::handle_get))
        .route("/api/v1/resumes/:id/file", get(handlers::handle_get_file))
        .route(
            "/api/v1/resumes/:id/preview",
            get(handlers::handle_get_preview),
        )
        .route("/api/v1/auth/sign-out", post(auth::handle_sign_out))
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/v1/auth/session", get(auth::handle_session_status))
        .route(
            "/api/v1/feedback/normalize",
            post(handlers::handle_normalize),
        )
        .merge(protected)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::state::testing::{sample_raw_feedback, test_state};

    const BOUNDARY: &str = "resumind-test-boundary";
    const FAKE_PDF: &[u8] = b"%PDF-1.4\n% test resume\n%%EOF";

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn sign_in(app: &Router, username: &str) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::post("/api/v1/auth/sign-in")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "username": username }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    fn multipart_body(file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in [
            ("company_name", "Acme"),
            ("job_title", "Backend Engineer"),
            ("job_description", "Rust and Postgres"),
        ] {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, content_type, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(token: &str, body: Vec<u8>) -> Request<Body> {
        Request::post("/api/v1/resumes")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str, token: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(None));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], json!("ok"));
    }

    #[tokio::test]
    async fn test_normalize_endpoint_end_to_end() {
        let app = build_router(test_state(None));
        let response = app
            .oneshot(
                Request::post("/api/v1/feedback/normalize")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "overall_score": "42/100",
                            "strengths": ["Clear layout"],
                            "recommendations": ["Add metrics"]
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["feedback"]["overallScore"], json!(42));
        assert_eq!(body["feedback"]["content"]["feedback"], json!("Clear layout"));
        assert_eq!(
            body["feedback"]["ATS"]["suggestions"],
            json!([{"type": "improve", "tip": "Add metrics"}])
        );
        let section_keys: Vec<_> = body["views"]["details"]["sections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["key"].clone())
            .collect();
        assert_eq!(section_keys, vec![json!("strengths"), json!("recommendations")]);
    }

    #[tokio::test]
    async fn test_normalize_endpoint_null_is_pending() {
        let app = build_router(test_state(None));
        let response = app
            .oneshot(
                Request::post("/api/v1/feedback/normalize")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("null"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["feedback"], Value::Null);
        assert_eq!(body["views"]["summary"]["state"], json!("pending"));
        assert_eq!(
            body["views"]["details"]["message"],
            json!("No details available")
        );
    }

    #[tokio::test]
    async fn test_resume_routes_require_session() {
        let app = build_router(test_state(None));

        let missing = app
            .clone()
            .oneshot(Request::get("/api/v1/resumes").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let bogus = app
            .oneshot(get_request("/api/v1/resumes", "not-a-session"))
            .await
            .unwrap();
        assert_eq!(bogus.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_status_and_sign_out() {
        let app = build_router(test_state(None));
        let token = sign_in(&app, "amy").await;

        let status = app
            .clone()
            .oneshot(get_request("/api/v1/auth/session", &token))
            .await
            .unwrap();
        assert_eq!(body_json(status).await["authenticated"], json!(true));

        let signed_out = app
            .clone()
            .oneshot(
                Request::post("/api/v1/auth/sign-out")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(signed_out.status(), StatusCode::NO_CONTENT);

        let status = app
            .oneshot(get_request("/api/v1/auth/session", &token))
            .await
            .unwrap();
        assert_eq!(body_json(status).await["authenticated"], json!(false));
    }

    #[tokio::test]
    async fn test_sign_in_rejects_bad_username() {
        let app = build_router(test_state(None));
        let response = app
            .oneshot(
                Request::post("/api/v1/auth/sign-in")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({"username": "a:b"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["code"],
            json!("VALIDATION_ERROR")
        );
    }

    #[tokio::test]
    async fn test_upload_then_review_flow() {
        let app = build_router(test_state(Some(sample_raw_feedback())));
        let token = sign_in(&app, "amy").await;

        let body = multipart_body(Some(("cv.pdf", "application/pdf", FAKE_PDF)));
        let response = app
            .clone()
            .oneshot(upload_request(&token, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let id = created["resume"]["id"].as_str().unwrap().to_string();
        assert_eq!(created["feedback"]["overallScore"], json!(42));

        let review = app
            .clone()
            .oneshot(get_request(&format!("/api/v1/resumes/{id}"), &token))
            .await
            .unwrap();
        assert_eq!(review.status(), StatusCode::OK);
        let review = body_json(review).await;
        assert_eq!(review["resume"]["company_name"], json!("Acme"));
        assert_eq!(review["feedback"]["toneAndStyle"]["score"], json!(80));
        assert_eq!(review["feedback"]["ATS"]["score"], json!(70));
        assert_eq!(review["views"]["summary"]["state"], json!("ready"));
        assert_eq!(review["views"]["ats"]["tier"], json!("warning"));

        let list = app
            .clone()
            .oneshot(get_request("/api/v1/resumes", &token))
            .await
            .unwrap();
        let cards = body_json(list).await;
        assert_eq!(cards.as_array().unwrap().len(), 1);
        assert_eq!(cards[0]["overall_score"], json!(42));

        let file = app
            .oneshot(get_request(&format!("/api/v1/resumes/{id}/file"), &token))
            .await
            .unwrap();
        assert_eq!(file.status(), StatusCode::OK);
        assert_eq!(
            file.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        let bytes = to_bytes(file.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], FAKE_PDF);
    }

    #[tokio::test]
    async fn test_failed_analysis_stores_pending_record() {
        let app = build_router(test_state(None));
        let token = sign_in(&app, "amy").await;

        let body = multipart_body(Some(("cv.pdf", "application/pdf", FAKE_PDF)));
        let response = app.oneshot(upload_request(&token, body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        assert_eq!(created["feedback"], Value::Null);
        assert_eq!(created["views"]["ats"]["state"], json!("pending"));
        assert_eq!(
            created["views"]["summary"]["message"],
            json!("Loading your resume analysis...")
        );
    }

    #[tokio::test]
    async fn test_upload_validation_errors() {
        let app = build_router(test_state(Some(sample_raw_feedback())));
        let token = sign_in(&app, "amy").await;

        let no_file = app
            .clone()
            .oneshot(upload_request(&token, multipart_body(None)))
            .await
            .unwrap();
        assert_eq!(no_file.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(no_file).await["error"]["message"],
            json!("Please upload a PDF file first!")
        );

        let not_pdf = app
            .oneshot(upload_request(
                &token,
                multipart_body(Some(("cv.txt", "text/plain", &b"plain text"[..]))),
            ))
            .await
            .unwrap();
        assert_eq!(not_pdf.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(
            body_json(not_pdf).await["error"]["message"],
            json!("Only PDF files are allowed!")
        );
    }

    #[tokio::test]
    async fn test_records_are_scoped_to_owner() {
        let app = build_router(test_state(Some(sample_raw_feedback())));
        let amy = sign_in(&app, "amy").await;
        let bob = sign_in(&app, "bob").await;

        let body = multipart_body(Some(("cv.pdf", "application/pdf", FAKE_PDF)));
        let created = app.clone().oneshot(upload_request(&amy, body)).await.unwrap();
        let id = body_json(created).await["resume"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let other = app
            .oneshot(get_request(&format!("/api/v1/resumes/{id}"), &bob))
            .await
            .unwrap();
        assert_eq!(other.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wipe_removes_records_and_files() {
        let state = test_state(Some(sample_raw_feedback()));
        let blobs = state.blobs.clone();
        let app = build_router(state);
        let token = sign_in(&app, "amy").await;

        for _ in 0..2 {
            let body = multipart_body(Some(("cv.pdf", "application/pdf", FAKE_PDF)));
            let response = app.clone().oneshot(upload_request(&token, body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let cards = body_json(
            app.clone()
                .oneshot(get_request("/api/v1/resumes", &token))
                .await
                .unwrap(),
        )
        .await;
        let id = cards[0]["id"].as_str().unwrap().to_string();

        let wiped = app
            .clone()
            .oneshot(
                Request::delete("/api/v1/resumes")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(wiped).await["deleted"], json!(2));

        let cards = body_json(
            app.oneshot(get_request("/api/v1/resumes", &token))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(cards, json!([]));
        let path = format!("resumes/amy/{id}/resume.pdf");
        assert!(blobs.read(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wipe_removes_unreadable_records() {
        let state = test_state(None);
        let kv = state.kv.clone();
        let app = build_router(state);
        let token = sign_in(&app, "amy").await;

        kv.set("resume:amy:legacy", r#"{"feedback": {}}"#).await.unwrap();
        kv.set("resume:bob:legacy", r#"{"feedback": {}}"#).await.unwrap();

        let wiped = app
            .oneshot(
                Request::delete("/api/v1/resumes")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wiped.status(), StatusCode::OK);
        assert_eq!(body_json(wiped).await["deleted"], json!(1));

        assert!(kv.list("resume:amy:*").await.unwrap().is_empty());
        assert_eq!(kv.list("resume:bob:*").await.unwrap(), vec!["resume:bob:legacy"]);
    }
}
