use std::path::PathBuf;
use log::{debug, info};
use crate::config::Config;
use crate::error::Result;
use crate::geocode::Geocoder;
use crate::http;
use crate::store;
use crate::usps::{AddressVerifier, TokenProvider};

/// What a successful run did
#[derive(Debug)]
pub struct RunReport {
    /// state codes, in input order
    pub verified: Vec<String>,
    pub geocoded: Vec<String>,
    pub output: PathBuf,
}

/// load, verify, geocode, write, then re-check the written file
pub struct Pipeline {
    config: Config,
    tokens: TokenProvider,
    verifier: AddressVerifier,
    geocoder: Geocoder,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let client = http::build_client(&config)?;
        Ok(
            Self {
                tokens: TokenProvider::new(client.clone(), &config),
                verifier: AddressVerifier::new(client.clone(), &config),
                geocoder: Geocoder::new(client, &config),
                config,
            }
        )
    }

    pub async fn run(&self) -> Result<RunReport> {
        if let Some(user_id) = &self.config.user_id {
            debug!("legacy USER_ID [{}] is set but no longer used", user_id);
        }

        info!("loading state capitals from [{}]", self.config.input_path.display());
        let mut records = store::read_document(&self.config.input_path)?;
        info!("loaded [{}] records", records.len());

        let token = self.tokens.fetch().await?;
        self.verifier.verify_all(&token, &mut records).await?;
        let verified = records.iter().map(|r| r.state.clone()).collect();
        info!("all addresses validated by USPS");

        let records = self.geocoder.geocode_all(records).await?;
        let geocoded = records.iter().map(|r| r.state.clone()).collect();

        let output = &self.config.output_path;
        info!("saving records to [{}]", output.display());
        store::write_document(output, &records)?;

        // the written file must pass the same checks as the input
        let mut written = store::read_document(output)?;
        self.verifier.verify_all(&token, &mut written).await?;
        info!("[{}] re-validated successfully", output.display());

        Ok(RunReport {
            verified,
            geocoded,
            output: output.clone(),
        })
    }
}
