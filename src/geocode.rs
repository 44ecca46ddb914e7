use futures::{StreamExt, TryStreamExt};
use log::info;
use reqwest::Client;
use serde::Deserialize;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http;
use crate::record::AddressRecord;

/// One candidate of a `search?format=json` response. Coordinates come as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Resolves `capital, state` to coordinates through a Nominatim-style search endpoint
pub struct Geocoder {
    client: Client,
    url: String,
}

impl Geocoder {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.geocoder_url.clone(),
        }
    }

    /// Geocode records one at a time in input order, stopping at the first failure.
    pub async fn geocode_all(&self, records: Vec<AddressRecord>) -> Result<Vec<AddressRecord>> {
        let total = records.len();
        futures::stream::iter(records)
            .enumerate()
            .then(|(idx, mut record)| async move {
                info!("[{}/{total}] geocoding [{}]", idx + 1, record.geocode_query());
                let (lat, lon) = self.locate(&record.geocode_query()).await?;
                record.latitude = Some(lat);
                record.longitude = Some(lon);
                Ok::<_, Error>(record)
            })
            .try_collect()
            .await
    }

    /// latitude and longitude of the first candidate
    #[tracing::instrument(skip(self))]
    pub async fn locate(&self, query: &str) -> Result<(f64, f64)> {
        let response = self.client
            .get(&self.url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| Error::transport(&self.url, e))?;

        if !response.status().is_success() {
            let (status, body) = http::failure(response).await;
            return Err(geocode_err(query, format!("geocoder returned {status}: {body}")));
        }
        let places = response.json::<Vec<Place>>()
            .await
            .map_err(|e| geocode_err(query, format!("unexpected response: {e}")))?;
        let place = places.into_iter()
            .next()
            .ok_or_else(|| geocode_err(query, "no results".to_string()))?;

        let lat = parse_coordinate(query, "latitude", &place.lat, 90.0)?;
        let lon = parse_coordinate(query, "longitude", &place.lon, 180.0)?;
        Ok((lat, lon))
    }
}

fn parse_coordinate(query: &str, name: &str, value: &str, limit: f64) -> Result<f64> {
    value.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
        .ok_or_else(|| geocode_err(query, format!("invalid {name} [{value}]")))
}

fn geocode_err(query: &str, reason: String) -> Error {
    Error::Geocode {
        query: query.to_string(),
        reason,
    }
}
