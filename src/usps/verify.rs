use chrono::{SecondsFormat, Utc};
use log::info;
use reqwest::Client;
use crate::config::Config;
use crate::error::{Error, Field, Result};
use crate::http;
use crate::record::AddressRecord;
use super::model::{AddressResponse, StandardizedAddress};
use super::token::AccessToken;

/// Checks every record against the USPS address API.
pub struct AddressVerifier {
    client: Client,
    url: String,
    zip_exempt_states: Vec<String>,
}

impl AddressVerifier {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.address_url(),
            zip_exempt_states: config.zip_exempt_states.clone(),
        }
    }

    /// Verify records in input order, stamping a comment on each one that matches.
    ///
    /// Stops at the first record that fails; later records are not requested.
    pub async fn verify_all(&self, token: &AccessToken, records: &mut [AddressRecord]) -> Result<()> {
        let total = records.len();
        for (idx, record) in records.iter_mut().enumerate() {
            info!("[{}/{total}] verifying address of [{}]", idx + 1, record.state);
            self.verify(token, record).await?;
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(state = %record.state))]
    pub async fn verify(&self, token: &AccessToken, record: &mut AddressRecord) -> Result<()> {
        let standardized = self.lookup(token, record).await?;
        self.compare(record, &standardized)?;
        record.comment = Some(format!(
            "Address validated by USPS at {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        Ok(())
    }

    async fn lookup(&self, token: &AccessToken, record: &AddressRecord) -> Result<StandardizedAddress> {
        let response = self.client
            .get(&self.url)
            .bearer_auth(token.as_str())
            .query(&[
                ("streetAddress", record.address.street.as_str()),
                ("state", record.state.as_str()),
                ("city", record.address.city.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::transport(&self.url, e))?;

        if !response.status().is_success() {
            let (status, body) = http::failure(response).await;
            return Err(Error::Http {
                endpoint: self.url.clone(),
                status: Some(status),
                message: format!("[{}] {body}", record.state),
            });
        }
        let body = response.json::<AddressResponse>()
            .await
            .map_err(|e| Error::transport(&self.url, e))?;
        Ok(body.address)
    }

    /// Compare state, city, street and zip, in that order.
    fn compare(&self, record: &AddressRecord, usps: &StandardizedAddress) -> Result<()> {
        check(record, Field::State, &record.state, &usps.state)?;
        check(record, Field::City, &record.address.city, &usps.city)?;
        check(record, Field::Street, &record.address.street, &usps.street_address)?;
        if self.is_zip_exempt(&record.state) {
            return Ok(());
        }
        // USPS answers with the 5-digit ZIP; ZIP+4 on our side compares by its first part
        let zip5 = record.address.zip_code.split('-').next().unwrap_or_default();
        check(record, Field::Zip, zip5, &usps.zip_code)
    }

    fn is_zip_exempt(&self, state: &str) -> bool {
        self.zip_exempt_states.iter().any(|s| s.eq_ignore_ascii_case(state))
    }
}

fn check(record: &AddressRecord, field: Field, expected: &str, actual: &str) -> Result<()> {
    if same(expected, actual) {
        Ok(())
    } else {
        Err(Error::Mismatch {
            state: record.state.clone(),
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

fn same(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use crate::record::Address;
    use super::*;

    fn record(state: &str, capital: &str, street: &str, zip: &str) -> AddressRecord {
        AddressRecord {
            state: state.to_string(),
            capital: capital.to_string(),
            address: Address {
                street: street.to_string(),
                city: capital.to_string(),
                state: state.to_string(),
                zip_code: zip.to_string(),
            },
            comment: None,
            latitude: None,
            longitude: None,
        }
    }

    fn usps(street: &str, city: &str, state: &str, zip: &str) -> StandardizedAddress {
        StandardizedAddress {
            street_address: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip_code: zip.to_string(),
        }
    }

    fn verifier(config: &Config) -> AddressVerifier {
        AddressVerifier::new(http::build_client(config).unwrap(), config)
    }

    fn offline() -> AddressVerifier {
        verifier(&Config::new("id", "secret"))
    }

    #[test]
    fn test_case_insensitive_match() {
        let ohio = record("OH", "Columbus", "77 S High St", "43215");
        offline().compare(&ohio, &usps("77 S HIGH ST", "COLUMBUS", "oh", "43215")).unwrap();
    }

    #[test]
    fn test_city_mismatch_names_both_values() {
        let ohio = record("OH", "Columbus", "77 S High St", "43215");
        let err = offline().compare(&ohio, &usps("77 S HIGH ST", "CLEVELAND", "OH", "43215")).unwrap_err();
        match err {
            Error::Mismatch { state, field, expected, actual } => {
                assert_eq!(state, "OH");
                assert_eq!(field, Field::City);
                assert_eq!(expected, "Columbus");
                assert_eq!(actual, "CLEVELAND");
            }
            other => panic!("expected a mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_state_checked_first() {
        let ohio = record("OH", "Columbus", "77 S High St", "43215");
        let err = offline().compare(&ohio, &usps("elsewhere", "CLEVELAND", "PA", "00000")).unwrap_err();
        assert!(matches!(err, Error::Mismatch { field: Field::State, .. }));
    }

    #[test]
    fn test_zip_waived_only_for_exempt_states() {
        let verifier = offline();
        let alaska = record("AK", "Juneau", "120 4th St", "99801");
        verifier.compare(&alaska, &usps("120 4TH ST", "JUNEAU", "AK", "")).unwrap();
        let hawaii = record("HI", "Honolulu", "415 S Beretania St", "96813");
        verifier.compare(&hawaii, &usps("415 S BERETANIA ST", "HONOLULU", "HI", "96810")).unwrap();

        let ohio = record("OH", "Columbus", "77 S High St", "43215");
        let err = verifier.compare(&ohio, &usps("77 S HIGH ST", "COLUMBUS", "OH", "")).unwrap_err();
        assert!(matches!(err, Error::Mismatch { field: Field::Zip, .. }));
    }

    #[test]
    fn test_zip_plus_four_compares_first_part() {
        let ohio = record("OH", "Columbus", "77 S High St", "43215-6183");
        offline().compare(&ohio, &usps("77 S HIGH ST", "COLUMBUS", "OH", "43215")).unwrap();
    }

    #[tokio::test]
    async fn test_verify_stamps_comment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/addresses/v3/address"))
            .and(header("authorization", "Bearer t0k3n"))
            .and(query_param("streetAddress", "77 S High St"))
            .and(query_param("city", "Columbus"))
            .and(query_param("state", "OH"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "firm": "",
                "address": {
                    "streetAddress": "77 S HIGH ST",
                    "city": "COLUMBUS",
                    "state": "OH",
                    "ZIPCode": "43215",
                    "ZIPPlus4": "6108"
                }
            })))
            .mount(&server)
            .await;

        let mut config = Config::new("id", "secret");
        config.usps_base_url = server.uri();
        let verifier = verifier(&config);
        let token = AccessToken::new("t0k3n");
        let mut records = vec![record("OH", "Columbus", "77 S High St", "43215")];

        verifier.verify_all(&token, &mut records).await.unwrap();
        let comment = records[0].comment.clone().unwrap();
        assert!(comment.starts_with("Address validated by USPS at "));

        // a second pass over the same records reaches the same outcome
        verifier.verify_all(&token, &mut records).await.unwrap();
        assert!(records[0].comment.is_some());
    }

    #[tokio::test]
    async fn test_stops_on_first_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/addresses/v3/address"))
            .and(query_param("state", "OH"))
            .respond_with(ResponseTemplate::new(400).set_body_string("address not found"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/addresses/v3/address"))
            .and(query_param("state", "TX"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = Config::new("id", "secret");
        config.usps_base_url = server.uri();
        let mut records = vec![
            record("OH", "Columbus", "77 S High St", "43215"),
            record("TX", "Austin", "1100 Congress Ave", "78701"),
        ];

        let err = verifier(&config).verify_all(&AccessToken::new("t"), &mut records).await.unwrap_err();
        assert!(matches!(err, Error::Http { status: Some(400), .. }));
        assert!(records.iter().all(|r| r.comment.is_none()));
    }
}
