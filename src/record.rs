use serde::{Deserialize, Serialize};

/// Street address of a capitol building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// One state capital entry, plus the fields the run adds to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressRecord {
    pub state: String,
    pub capital: String,
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl AddressRecord {
    /// free-text query for the geocoder, i.e. `Columbus, OH`
    pub fn geocode_query(&self) -> String {
        format!("{}, {}", self.capital, self.state)
    }
}

/// The document written to disk.
#[derive(Debug, Serialize)]
pub struct CapitalsDocument<'a> {
    pub state_capitals: &'a [AddressRecord],
}

/// Key of the records array. Old files used `stateCapitols`.
pub const RECORDS_KEY: &str = "state_capitals";
pub const LEGACY_RECORDS_KEY: &str = "stateCapitols";
