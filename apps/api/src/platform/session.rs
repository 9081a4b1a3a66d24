use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{AuthProvider, KvStore, Session, StorageError};

/// Sessions kept in the `KvStore` under `session:{token}`.
pub struct KvSessionAuth {
    kv: Arc<dyn KvStore>,
}

impl KvSessionAuth {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }
}

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

#[async_trait]
impl AuthProvider for KvSessionAuth {
    async fn session(&self, token: &str) -> Result<Option<Session>, StorageError> {
        let Some(stored) = self.kv.get(&session_key(token)).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&stored)?))
    }

    async fn sign_in(&self, username: &str) -> Result<Session, StorageError> {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        self.kv
            .set(&session_key(&session.token), &serde_json::to_string(&session)?)
            .await?;

        info!("Signed in {username}");
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<(), StorageError> {
        self.kv.delete(&session_key(token)).await
    }
}
