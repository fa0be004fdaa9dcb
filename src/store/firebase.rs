use super::{RoomStore, StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;

/// Firebase Realtime Database over its REST API.
///
/// Every path maps to `{database_url}/{path}.json`, each segment
/// percent-encoded. A `null` body means the path is absent.
pub struct FirebaseStore {
    client: Client,
    database_url: Url,
    auth_token: Option<String>,
    timeout: Duration,
}

impl FirebaseStore {
    pub fn new(database_url: String, auth_token: Option<String>, timeout: Duration) -> StoreResult<Self> {
        let trimmed = database_url.trim();
        let database_url = Url::parse(trimmed)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .ok_or_else(|| {
                StoreError::Config(format!(
                    "Database URL must start with http:// or https://, got '{}'",
                    trimmed
                ))
            })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        Ok(Self {
            client,
            database_url,
            auth_token,
            timeout,
        })
    }

    /// REST endpoint for a store path
    pub fn url_for(&self, path: &str) -> Url {
        let mut url = self.database_url.clone();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        // The base was checked to be http(s) in `new`, so it has path segments
        if let Ok(mut parts) = url.path_segments_mut() {
            parts.pop_if_empty();
            match segments.split_last() {
                Some((last, rest)) => {
                    parts.extend(rest);
                    parts.push(&format!("{}.json", last));
                }
                None => {
                    parts.push(".json");
                }
            }
        }
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        url
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> StoreResult<reqwest::Response> {
        let mut request = self.client.request(method.clone(), self.url_for(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(self.timeout)
            } else {
                StoreError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::NO_CONTENT {
            tracing::error!("Firebase {} {} failed with status {}", method, path, status);
            return Err(StoreError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl RoomStore for FirebaseStore {
    async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        let response = self.send(Method::GET, path, None).await?;
        let value: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Request(format!("Invalid JSON at '{}': {}", path, e)))?;
        Ok((!value.is_null()).then_some(value))
    }

    async fn set(&self, path: &str, value: Value) -> StoreResult<()> {
        tracing::debug!("Firebase PUT {}", path);
        self.send(Method::PUT, path, Some(&value)).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        tracing::debug!("Firebase DELETE {}", path);
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "firebase"
    }
}
