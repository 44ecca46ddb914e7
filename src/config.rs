use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::error::{Error, Result};

pub const DEFAULT_INPUT_PATH: &str = "us_capital_addresses.json";
pub const DEFAULT_OUTPUT_PATH: &str = "us_capital_addresses_updated.json";
pub const USPS_BASE_URL: &str = "https://apis.usps.com";
pub const GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

/// States whose capitol addresses carry no ZIP data at USPS.
pub const ZIP_EXEMPT_STATES: &[&str] = &["AK", "HI", "VT"];

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Run configuration, built once at startup and handed to every component.
/// Load a `.env` file from the working directory or one of its parents, if there is one.
///
/// Variables already present in the process environment are not overridden.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(Error::Config(format!("cannot read .env file: {e}"))),
    }
}

fn load_dotenv_from(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(Error::Config(format!("cannot read [{}]: {e}", path.display()))),
    }
}

#[derive(Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    /// Web Tools user id of the retired XML API. Only logged.
    pub user_id: Option<String>,
    pub usps_base_url: String,
    pub geocoder_url: String,
    pub timeout: Duration,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub zip_exempt_states: Vec<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("usps_base_url", &self.usps_base_url)
            .field("geocoder_url", &self.geocoder_url)
            .field("timeout", &self.timeout)
            .field("input_path", &self.input_path)
            .field("output_path", &self.output_path)
            .field("zip_exempt_states", &self.zip_exempt_states)
            .finish()
    }
}

impl Config {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            user_id: None,
            usps_base_url: USPS_BASE_URL.to_string(),
            geocoder_url: GEOCODER_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            zip_exempt_states: ZIP_EXEMPT_STATES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// load configuration from environment variables
    ///
    /// `CLIENT_ID` and `CLIENT_SECRET` are required, everything else has a default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| var(key).ok_or_else(|| Error::Config(format!("`{key}` environment variable must be set")));

        let mut config = Self::new(required("CLIENT_ID")?, required("CLIENT_SECRET")?);
        config.user_id = var("USER_ID");
        if let Some(url) = var("USPS_BASE_URL") {
            config.usps_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = var("GEOCODER_URL") {
            config.geocoder_url = url;
        }
        if let Some(secs) = var("HTTP_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| Error::Config(format!("`HTTP_TIMEOUT_SECS` must be a positive integer, got [{secs}]")))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = var("INPUT_PATH") {
            config.input_path = PathBuf::from(path);
        }
        if let Some(path) = var("OUTPUT_PATH") {
            config.output_path = PathBuf::from(path);
        }
        if let Some(states) = var("ZIP_EXEMPT_STATES") {
            config.zip_exempt_states = states.split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        Ok(config)
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth2/v3/token", self.usps_base_url)
    }

    pub fn address_url(&self) -> String {
        format!("{}/addresses/v3/address", self.usps_base_url)
    }
}
