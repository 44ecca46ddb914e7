use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response};
use crate::config::Config;
use crate::error::{Error, Result};

const UA: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build the single HTTP client shared by every service of a run
pub fn build_client(config: &Config) -> Result<Client> {
    Client::builder()
        .default_headers(default_headers())
        .user_agent(UA)
        .timeout(config.timeout)
        .build()
        .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))
}

fn default_headers() -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(ACCEPT, HeaderValue::from_static("application/json"));
    map
}

/// Status and the head of the body of a failed response.
pub async fn failure(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    (status, body.chars().take(200).collect())
}
