//! `reqwest`-backed transport.

use std::time::Duration;

use reqwest::RequestBuilder;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::config::ProviderConfig;
use crate::error::VolumeError;

use super::{ApiResponse, Transport, TransportFuture};

/// Authenticated HTTP session against the provider API.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    authorization: String,
}

impl ReqwestTransport {
    /// Builds a transport that authenticates with an API token.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn new(api_token: &str, timeout: Duration) -> Result<Self, VolumeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| VolumeError::Transport {
                message: err.to_string(),
            })?;
        Ok(Self {
            client,
            authorization: format!("APIKey {}", api_token.trim()),
        })
    }

    /// Builds a transport from validated provider configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Config`] when configuration is invalid and
    /// [`VolumeError::Transport`] when the client cannot be built.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, VolumeError> {
        config.validate()?;
        Self::new(&config.api_token, config.http_timeout())
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, VolumeError> {
        let response = request
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .await
            .map_err(|err| VolumeError::Transport {
                message: err.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| VolumeError::Transport {
                message: err.to_string(),
            })?;
        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

impl Transport for ReqwestTransport {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
        Box::pin(self.send(self.client.get(url)))
    }

    fn post<'a>(&'a self, url: &'a str, body: Vec<u8>) -> TransportFuture<'a> {
        Box::pin(self.send(
            self.client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body),
        ))
    }

    fn delete<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
        Box::pin(self.send(self.client.delete(url)))
    }
}
