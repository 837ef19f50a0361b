use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::{AddTermRequest, AddTermResponse, DeleteTermResponse, GraphSource, RemoteError};
use crate::config::RemoteConfig;
use crate::model::{normalize_label, GraphPayload, View};

/// HTTP client for the remote taxonomy service.
pub struct HttpGraphSource {
    config: RemoteConfig,
    client: Client,
}

impl HttpGraphSource {
    /// Creates a client for the service at `base_url` with default paths.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(RemoteConfig {
            base_url: base_url.into(),
            ..RemoteConfig::default()
        })
    }

    /// Creates a client from remote config.
    pub fn with_config(config: RemoteConfig) -> Self {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default HTTP client");
            Client::new()
        });

        Self { config, client }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn terms_url(&self) -> String {
        self.config.url(&self.config.terms_path)
    }

    /// Maps non-success statuses to typed errors and decodes the body.
    async fn decode<T: DeserializeOwned>(response: Response, subject: &str) -> Result<T, RemoteError> {
        let status = response.status();

        if status == StatusCode::CONFLICT {
            return Err(RemoteError::Conflict(subject.to_string()));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(subject.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl GraphSource for HttpGraphSource {
    async fn fetch_graph(&self) -> Result<GraphPayload, RemoteError> {
        let url = self.config.url(&self.config.graph_path);
        let response = self.client.get(&url).send().await?;
        Self::decode(response, "graph").await
    }

    async fn lookup(&self, label: &str) -> Result<View, RemoteError> {
        let url = self.config.url(&self.config.navigate_path);
        let response = self
            .client
            .get(&url)
            .query(&[("term", label)])
            .send()
            .await?;
        Self::decode(response, label).await
    }

    async fn add_term(&self, label: &str) -> Result<AddTermResponse, RemoteError> {
        let label = normalize_label(label);
        let response = self
            .client
            .post(self.terms_url())
            .json(&AddTermRequest {
                label: label.clone(),
            })
            .send()
            .await?;
        Self::decode(response, &label).await
    }

    async fn delete_term(&self, id: &str) -> Result<(), RemoteError> {
        let url = format!("{}/{}", self.terms_url(), id);
        let response = self.client.delete(&url).send().await?;
        let body: DeleteTermResponse = Self::decode(response, id).await?;

        if body.success {
            Ok(())
        } else {
            Err(RemoteError::Api {
                status: 200,
                message: format!("delete of {} was not acknowledged", id),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let source = HttpGraphSource::new("http://example.com/");
        assert_eq!(
            source.config().url(&source.config().graph_path),
            "http://example.com/api/lexicon/graph"
        );
        assert_eq!(source.terms_url(), "http://example.com/api/lexicon/terms");
    }

    #[test]
    fn test_with_timeout() {
        let source = HttpGraphSource::with_config(RemoteConfig {
            timeout_secs: Some(5),
            ..RemoteConfig::default()
        });
        assert_eq!(source.config().timeout_secs, Some(5));
    }

    #[tokio::test]
    async fn test_unreachable_remote_is_network_error() {
        let source = HttpGraphSource::with_config(RemoteConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: Some(2),
            ..RemoteConfig::default()
        });

        let err = source.fetch_graph().await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err:?}");
    }
}
