//! Storage and auth capabilities the service consumes.
//!
//! Handlers only see these traits. `AppState` carries them as `Arc<dyn _>`,
//! wired at startup to Redis + S3 or to the in-memory stand-ins.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;
pub mod redis_kv;
pub mod s3_blob;
pub mod session;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// String-keyed key-value store.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Keys matching a glob pattern where `*` matches any run of characters,
    /// returned in sorted order.
    async fn list(&self, pattern: &str) -> Result<Vec<String>, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Path-keyed binary store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn read(&self, path: &str) -> Result<Option<Bytes>, StorageError>;

    async fn write(&self, path: &str, data: Bytes, content_type: &str)
        -> Result<(), StorageError>;

    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolves a bearer token to its session, if it is still signed in.
    async fn session(&self, token: &str) -> Result<Option<Session>, StorageError>;

    async fn sign_in(&self, username: &str) -> Result<Session, StorageError>;

    async fn sign_out(&self, token: &str) -> Result<(), StorageError>;

    async fn is_authenticated(&self, token: &str) -> Result<bool, StorageError> {
        Ok(self.session(token).await?.is_some())
    }
}

/// Glob match supporting `*` only, the subset both backends agree on.
pub fn glob_matches(pattern: &str, key: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = key.strip_prefix(first) else {
        return false;
    };

    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        // no `*` at all: exact match
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}
