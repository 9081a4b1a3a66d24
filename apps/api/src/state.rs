use std::sync::Arc;

use crate::analysis::FeedbackService;
use crate::config::Config;
use crate::platform::{AuthProvider, BlobStore, KvStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub kv: Arc<dyn KvStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub auth: Arc<dyn AuthProvider>,
    /// Pluggable analyzer. Default: LlmFeedbackService.
    pub feedback_service: Arc<dyn FeedbackService>,
    pub config: Config,
}
