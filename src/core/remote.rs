use std::path::Path;

use aws_config::BehaviorVersion;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("bucket {bucket} is missing or inaccessible: {message}")]
    Bucket { bucket: String, message: String },
    #[error("object {key} not found in bucket {bucket}")]
    NotFound { bucket: String, key: String },
    #[error("listing {bucket}/{prefix} failed: {message}")]
    List {
        bucket: String,
        prefix: String,
        message: String,
    },
    #[error("downloading {key} failed: {message}")]
    Download { key: String, message: String },
    #[error("writing {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

impl RemoteError {
    /// Connectivity-or-access class of failure: the whole bucket is out of
    /// reach, not just one key.
    pub fn is_access(&self) -> bool {
        matches!(self, RemoteError::Bucket { .. } | RemoteError::List { .. })
    }
}

/// The two object-storage operations the pipeline needs: prefix listing
/// and key download. Backed by S3 in production and by an in-memory store
/// in tests.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, RemoteError>;
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), RemoteError>;
}

/// [`ObjectStore`] over the AWS SDK S3 client.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Build a client from the ambient AWS environment (shared config
    /// file, env vars, instance metadata).
    pub async fn from_env() -> S3Store {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        S3Store {
            client: aws_sdk_s3::Client::new(&config),
        }
    }
}

impl ObjectStore for S3Store {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, RemoteError> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| {
                let service = err.into_service_error();
                if service.is_no_such_bucket() {
                    RemoteError::Bucket {
                        bucket: bucket.to_string(),
                        message: service.to_string(),
                    }
                } else {
                    RemoteError::List {
                        bucket: bucket.to_string(),
                        prefix: prefix.to_string(),
                        message: service.to_string(),
                    }
                }
            })?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), RemoteError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    RemoteError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    RemoteError::Download {
                        key: key.to_string(),
                        message: service.to_string(),
                    }
                }
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|err| RemoteError::Download {
                key: key.to_string(),
                message: err.to_string(),
            })?;

        std::fs::write(dest, body.into_bytes()).map_err(|source| RemoteError::Write {
            path: dest.display().to_string(),
            source,
        })
    }
}
