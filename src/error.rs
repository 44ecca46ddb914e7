use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is fatal to the current run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input document does not have the expected shape.
    #[error("schema error in record {record}: {reason} [{key}]")]
    Schema {
        /// index of the record, plus its state code when readable
        record: String,
        key: String,
        reason: SchemaViolation,
    },
    /// OAuth token exchange failed.
    #[error("token request to {endpoint} returned {status}: {body}")]
    Auth {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Transport failure or non-2xx response from a remote call.
    #[error("HTTP error calling {endpoint}{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Http {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },
    /// USPS disagrees with a field of the record.
    #[error("[{state}] {field} mismatch: expected [{expected}], USPS returned [{actual}]")]
    Mismatch {
        state: String,
        field: Field,
        expected: String,
        actual: String,
    },
    #[error("cannot geocode [{query}]: {reason}")]
    Geocode { query: String, reason: String },
    #[error("file error on [{}]: {message}", .path.display())]
    File { path: PathBuf, message: String },
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaViolation {
    UnknownKey,
    MissingKey,
    NotAnObject,
    InvalidValue,
    WrongType,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SchemaViolation::UnknownKey => "unknown key",
            SchemaViolation::MissingKey => "missing required key",
            SchemaViolation::NotAnObject => "expected a JSON object",
            SchemaViolation::InvalidValue => "invalid value",
            SchemaViolation::WrongType => "wrong value type",
        };
        f.write_str(s)
    }
}

/// Address fields compared against the USPS response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    State,
    City,
    Street,
    Zip,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Field::State => "state",
            Field::City => "city",
            Field::Street => "street",
            Field::Zip => "zipCode",
        };
        f.write_str(s)
    }
}

impl Error {
    pub(crate) fn file(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::File {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn transport(endpoint: &str, err: reqwest::Error) -> Self {
        Error::Http {
            endpoint: endpoint.to_string(),
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
