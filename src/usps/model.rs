use serde::{Deserialize, Serialize};

/// body of the client-credentials grant
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub grant_type: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub scope: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// `GET /addresses/v3/address` response. Only the fields we compare are kept.
#[derive(Debug, Deserialize)]
pub struct AddressResponse {
    pub address: StandardizedAddress,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardizedAddress {
    #[serde(default)]
    pub street_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(rename = "ZIPCode", default)]
    pub zip_code: String,
}
