//! HTTP transport used to reach the provider API.
//!
//! Lifecycle code only sees [`Transport`], which keeps request issuing
//! separate from sequencing and makes the orchestrator testable with a
//! scripted double.

use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;

use crate::error::VolumeError;

mod http;
pub mod urls;

pub use http::ReqwestTransport;

/// Future returned by transport operations.
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ApiResponse, VolumeError>> + Send + 'a>>;

/// Status and body captured from a provider response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Creates a response from a status code and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).trim().to_owned()
    }

    /// Fails unless the response carries a 2xx status.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::ProviderStatus`] carrying `context` and the
    /// provider's message for any other status.
    pub fn require_success(&self, context: &str) -> Result<(), VolumeError> {
        if self.is_success() {
            return Ok(());
        }
        Err(VolumeError::ProviderStatus {
            context: context.to_owned(),
            status: self.status,
            message: self.text(),
        })
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self, context: &str) -> Result<T, VolumeError> {
        serde_json::from_slice(&self.body).map_err(|err| VolumeError::Decode {
            context: context.to_owned(),
            message: err.to_string(),
        })
    }
}

/// Minimal HTTP interface the lifecycle needs from a provider session.
///
/// Implementations attach authentication and apply the request timeout;
/// they never interpret status codes.
pub trait Transport: Send + Sync {
    /// Issues a `GET` request.
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a>;

    /// Issues a `POST` request with a JSON body.
    fn post<'a>(&'a self, url: &'a str, body: Vec<u8>) -> TransportFuture<'a>;

    /// Issues a `DELETE` request.
    fn delete<'a>(&'a self, url: &'a str) -> TransportFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(200, true)]
    #[case(204, true)]
    #[case(299, true)]
    #[case(300, false)]
    #[case(404, false)]
    #[case(500, false)]
    fn is_success_covers_2xx_only(#[case] status: u16, #[case] expected: bool) {
        assert_eq!(ApiResponse::new(status, "").is_success(), expected);
    }

    #[test]
    fn require_success_carries_context_and_body() {
        let response = ApiResponse::new(409, " volume is busy \n");
        let err = response
            .require_success("Create volume data failed")
            .expect_err("409 should fail");
        assert_eq!(
            err,
            VolumeError::ProviderStatus {
                context: String::from("Create volume data failed"),
                status: 409,
                message: String::from("volume is busy"),
            }
        );
        assert!(err.to_string().contains("Create volume data failed"));
    }

    #[test]
    fn json_reports_decode_errors() {
        let response = ApiResponse::new(200, "not json");
        let err = response
            .json::<serde_json::Value>("volume")
            .expect_err("invalid json");
        assert!(matches!(err, VolumeError::Decode { ref context, .. } if context == "volume"));
    }
}
