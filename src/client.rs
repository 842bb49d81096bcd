//! Mytoken service client
//!
//! The three requesters (mint, exchange, revoke) plus the canonical
//! chained flow. Each call is a fresh one-shot HTTP exchange; nothing
//! is pooled, cached, or retried at this layer, and every error is
//! handed back to the caller verbatim.

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::{Config, EndpointConfig};
use crate::error::ApiError;
use crate::model::{
    AccessTokenRequest, AccessTokenResponse, Capability, MytokenRequest, MytokenResponse,
    RevocationRequest,
};
use crate::{Error, Result};

/// Client for the mytoken service endpoints
pub struct MytokenClient {
    /// HTTP client for token requests
    http_client: Client,

    /// The three service endpoints
    endpoints: EndpointConfig,

    /// Client name embedded in minted token labels
    client_name: String,

    /// Annotation sent with exchange requests
    comment: String,
}

/// Outcome of a revocation call.
///
/// Revocation deliberately does not branch on success or failure: a 2xx
/// response, an HTTP error response, and a transport failure all land in
/// this one value, and callers inspect the status or body themselves.
/// This mirrors the service's web interface, which wires the same
/// continuation to both outcomes.
#[derive(Debug, Clone)]
pub struct RevocationOutcome {
    /// HTTP status code, when a response arrived at all
    pub status: Option<u16>,
    /// Parsed JSON response body, when one was present
    pub body: Option<serde_json::Value>,
    /// Transport or configuration failure, when no response arrived
    pub error: Option<String>,
}

impl RevocationOutcome {
    /// Whether the service reported success (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| (200..300).contains(&s))
    }

    fn failed(error: String) -> Self {
        Self {
            status: None,
            body: None,
            error: Some(error),
        }
    }
}

impl MytokenClient {
    /// Create a client from configuration. The configured request
    /// timeout applies to every call, so a hung request fails the call
    /// instead of suspending it indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http_client,
            endpoints: config.endpoints.clone(),
            client_name: config.client_name.clone(),
            comment: config.comment.clone(),
        })
    }

    /// Mint a short-lived, single-use mytoken for the given capability.
    ///
    /// The request carries one restriction: expiry in 60 seconds, bound
    /// to the caller's IP, usable once for the named capability. The
    /// minted token is returned to the caller and not stored here.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx responses (raw body preserved), and
    /// unexpected response shapes are all returned unmodified; no retry.
    pub async fn request_mytoken(&self, capability: Capability) -> Result<MytokenResponse> {
        let url = self.endpoints.mytoken()?;
        let request = MytokenRequest::new(&self.client_name, capability);
        debug!(name = %request.name, "Requesting mytoken");
        let response: MytokenResponse = self.post_json(url, &request).await?;
        debug!(
            mytoken_type = response.mytoken_type.as_deref().unwrap_or("token"),
            "Minted mytoken"
        );
        Ok(response)
    }

    /// Redeem a mytoken for an access token.
    ///
    /// When `mytoken` is `None` the field is omitted from the request
    /// body entirely and the server falls back to the ambient
    /// authenticated session. This method never mints a token itself.
    ///
    /// # Errors
    ///
    /// Same policy as [`Self::request_mytoken`]: everything surfaces
    /// unmodified, no retry.
    pub async fn exchange_access_token(
        &self,
        mytoken: Option<&str>,
    ) -> Result<AccessTokenResponse> {
        let url = self.endpoints.access_token()?;
        let request = AccessTokenRequest::new(&self.comment, mytoken);
        debug!(
            explicit_token = mytoken.is_some(),
            "Exchanging for access token"
        );
        self.post_json(url, &request).await
    }

    /// Revoke the mytoken bound to the current session, optionally
    /// cascading to every token transitively minted from it.
    ///
    /// Infallible by design: see [`RevocationOutcome`].
    pub async fn revoke_mytoken(&self, recursive: bool) -> RevocationOutcome {
        let url = match self.endpoints.revocation() {
            Ok(url) => url,
            Err(e) => return RevocationOutcome::failed(e.to_string()),
        };
        let request = RevocationRequest { recursive };
        debug!(recursive, "Revoking mytoken");
        match self.http_client.post(url).json(&request).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.json::<serde_json::Value>().await.ok();
                RevocationOutcome {
                    status: Some(status),
                    body,
                    error: None,
                }
            }
            Err(e) => RevocationOutcome::failed(e.to_string()),
        }
    }

    /// The canonical chained flow: mint a mytoken for access-token
    /// issuance, then redeem it.
    ///
    /// Fail-fast: the first failure is returned as-is and the second
    /// call is never issued. A minted but unredeemed token is simply
    /// abandoned; its restriction expires it 60 seconds later.
    ///
    /// # Errors
    ///
    /// Whichever of the two calls fails first.
    pub async fn access_token_via_mytoken(&self) -> Result<String> {
        let minted = self.request_mytoken(Capability::AccessToken).await?;
        let exchanged = self.exchange_access_token(Some(&minted.mytoken)).await?;
        Ok(exchanged.access_token)
    }

    /// POST a JSON body and parse the JSON response. Non-2xx responses
    /// become [`Error::Api`] carrying the raw body.
    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: Url, body: &B) -> Result<T> {
        let response = self.http_client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Api(ApiError::from_body(status.as_u16(), &text)));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_from_default_config() {
        let client = MytokenClient::new(&Config::default()).unwrap();
        assert_eq!(client.client_name, "mytoken-web");
        assert_eq!(client.comment, "from web interface");
    }

    #[tokio::test]
    async fn mint_without_endpoint_is_a_config_error() {
        let client = MytokenClient::new(&Config::default()).unwrap();
        let err = client
            .request_mytoken(Capability::AccessToken)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn revoke_without_endpoint_reports_instead_of_branching() {
        let client = MytokenClient::new(&Config::default()).unwrap();
        let outcome = client.revoke_mytoken(true).await;
        assert!(!outcome.is_success());
        assert!(outcome.status.is_none());
        assert!(outcome.error.unwrap().contains("revocation_endpoint"));
    }
}
