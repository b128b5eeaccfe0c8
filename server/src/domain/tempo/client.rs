//! HTTP access to the Tempo query API

use std::time::Duration;

use reqwest::{StatusCode, Url};

use super::error::TempoError;
use super::types::AuthContext;
use crate::utils::string::sanitize_url;

/// Shared GET client carrying the process-wide credentials.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct TempoClient {
    http: reqwest::Client,
    auth: AuthContext,
}

impl TempoClient {
    pub fn new(auth: AuthContext, timeout: Duration) -> Result<Self, TempoError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tempo-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TempoError::Transport)?;

        tracing::debug!(auth = auth.scheme(), ?timeout, "Tempo client initialized");
        Ok(Self { http, auth })
    }

    /// GET `url` and return the body of a 200 response
    pub async fn fetch(&self, url: Url) -> Result<Vec<u8>, TempoError> {
        let display_url = sanitize_url(url.as_str());
        tracing::debug!(url = %display_url, auth = self.auth.scheme(), "Sending Tempo request");

        let resp = self
            .request(url)
            .send()
            .await
            .map_err(TempoError::Transport)?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(TempoError::Transport)?;

        if status != StatusCode::OK {
            tracing::debug!(
                url = %display_url,
                status = status.as_u16(),
                bytes = body.len(),
                "Tempo returned non-OK status"
            );
            return Err(TempoError::BackendHttp {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        tracing::debug!(url = %display_url, bytes = body.len(), "Tempo response received");
        Ok(body.to_vec())
    }

    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.get(url);
        match &self.auth {
            AuthContext::None => builder,
            AuthContext::Bearer(token) => builder.bearer_auth(token),
            AuthContext::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
        }
    }
}
