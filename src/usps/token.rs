use log::info;
use reqwest::Client;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http;
use super::model::{TokenRequest, TokenResponse};

const SCOPE: &str = "addresses";

/// Bearer token for the USPS APIs. Lives for one run.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Exchanges the client credentials for a bearer token
pub struct TokenProvider {
    client: Client,
    url: String,
    client_id: String,
    client_secret: String,
}

impl TokenProvider {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.token_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// single attempt, no retry
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self) -> Result<AccessToken> {
        info!("requesting USPS access token");
        let body = TokenRequest {
            grant_type: "client_credentials",
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            scope: SCOPE,
        };
        let response = self.client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::transport(&self.url, e))?;

        if !response.status().is_success() {
            let (status, body) = http::failure(response).await;
            return Err(Error::Auth {
                endpoint: self.url.clone(),
                status,
                body,
            });
        }
        let token = response.json::<TokenResponse>()
            .await
            .map_err(|e| Error::transport(&self.url, e))?;
        Ok(AccessToken::new(token.access_token))
    }
}
