use std::time::Duration;

use relay_core::{classify, ErrorKind, ProviderError};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::{PostFailure, PostReceipt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterSettings {
    /// Provider root; comments go to `{api_base}/{target}/comments`.
    pub api_base: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for PosterSettings {
    fn default() -> Self {
        Self {
            api_base: "https://graph.facebook.com/v19.0".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error)]
pub enum PosterError {
    #[error("invalid api base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// One outbound comment-creation call. Implementations classify every
/// failure instead of returning transport errors to the caller.
#[async_trait::async_trait]
pub trait ExternalPoster: Send + Sync {
    async fn post(
        &self,
        target: &str,
        comment: &str,
        credential: &str,
    ) -> Result<PostReceipt, PostFailure>;
}

#[derive(Debug, Clone)]
pub struct GraphPoster {
    api_base: Url,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct CreatedComment {
    id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ProviderError,
}

impl GraphPoster {
    pub fn new(settings: PosterSettings) -> Result<Self, PosterError> {
        let invalid = |reason: &str| PosterError::InvalidBaseUrl {
            url: settings.api_base.clone(),
            reason: reason.to_string(),
        };
        let api_base = Url::parse(&settings.api_base).map_err(|err| invalid(&err.to_string()))?;
        if api_base.cannot_be_a_base() {
            return Err(invalid("url cannot be a base"));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self { api_base, client })
    }

    fn endpoint(&self, target: &str) -> Url {
        let mut url = self.api_base.clone();
        // Checked in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(target).push("comments");
        }
        url
    }
}

#[async_trait::async_trait]
impl ExternalPoster for GraphPoster {
    async fn post(
        &self,
        target: &str,
        comment: &str,
        credential: &str,
    ) -> Result<PostReceipt, PostFailure> {
        let response = self
            .client
            .post(self.endpoint(target))
            .form(&[("message", comment), ("access_token", credential)])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if status.is_success() {
            let comment_id = serde_json::from_slice::<CreatedComment>(&body)
                .ok()
                .and_then(|created| created.id);
            return Ok(PostReceipt {
                target: target.to_string(),
                comment_id,
            });
        }

        Err(classify_response(status, &body))
    }
}

fn classify_response(status: StatusCode, body: &[u8]) -> PostFailure {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => {
            let message = if error.message.is_empty() {
                status.to_string()
            } else {
                error.message.clone()
            };
            PostFailure::provider(classify(&error), message)
        }
        Err(_) => PostFailure::provider(ErrorKind::Unknown, format!("http status {status}")),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> PostFailure {
    if err.is_timeout() {
        return PostFailure::transport(format!("timeout: {err}"));
    }
    PostFailure::transport(err.to_string())
}
