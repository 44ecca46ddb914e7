use std::collections::HashSet;
use std::sync::LazyLock;
use log::warn;
use regex::Regex;
use serde_json::{Map, Value};
use crate::error::{Error, Result, SchemaViolation};

static STATE_CODE_REG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());
static ZIP_CODE_REG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());

const REQUIRED_KEYS: &[&str] = &["state", "capital", "address"];
const OPTIONAL_KEYS: &[&str] = &["comment", "latitude", "longitude"];
const ADDRESS_KEYS: &[&str] = &["street", "city", "state", "zipCode"];

/// Check the shape of every raw record before it is converted.
///
/// Unknown keys, missing keys and values of the wrong JSON type abort on the first
/// violation. Odd-looking values (lowercase state, empty zip, repeated state) are only
/// logged; USPS is the judge of those.
pub fn validate(records: &[Value]) -> Result<()> {
    let mut seen = HashSet::new();
    for (idx, record) in records.iter().enumerate() {
        let label = record_label(idx, record);
        let object = record.as_object()
            .ok_or_else(|| violation(&label, "", SchemaViolation::NotAnObject))?;

        check_keys(&label, "", object, REQUIRED_KEYS, OPTIONAL_KEYS)?;
        let address = object["address"].as_object()
            .ok_or_else(|| violation(&label, "address", SchemaViolation::NotAnObject))?;
        check_keys(&label, "address.", address, ADDRESS_KEYS, &[])?;
        check_types(&label, object, address)?;

        let state = object["state"].as_str().unwrap_or_default();
        if !STATE_CODE_REG.is_match(state) {
            warn!("record {} has an unusual state code [{}]", label, state);
        }
        if !seen.insert(state.to_string()) {
            warn!("record {} repeats state code [{}]", label, state);
        }
        let zip = address["zipCode"].as_str().unwrap_or_default();
        if !ZIP_CODE_REG.is_match(zip) {
            warn!("record {} has an unusual zip code [{}]", label, zip);
        }
        if address["state"].as_str() != Some(state) {
            warn!("record {} has address state {} but top-level state [{}]", label, address["state"], state);
        }
    }
    Ok(())
}

/// strings where strings belong, numbers (or null) for coordinates
fn check_types(label: &str, object: &Map<String, Value>, address: &Map<String, Value>) -> Result<()> {
    for key in ["state", "capital"] {
        if !object[key].is_string() {
            return Err(violation(label, key, SchemaViolation::WrongType));
        }
    }
    if object.get("comment").is_some_and(|v| !v.is_string() && !v.is_null()) {
        return Err(violation(label, "comment", SchemaViolation::WrongType));
    }
    for key in ["latitude", "longitude"] {
        if object.get(key).is_some_and(|v| !v.is_number() && !v.is_null()) {
            return Err(violation(label, key, SchemaViolation::WrongType));
        }
    }
    if let Some(key) = ADDRESS_KEYS.iter().find(|key| !address[**key].is_string()) {
        return Err(violation(label, &format!("address.{key}"), SchemaViolation::WrongType));
    }
    Ok(())
}

fn check_keys(
    label: &str,
    prefix: &str,
    object: &Map<String, Value>,
    required: &[&str],
    optional: &[&str],
) -> Result<()> {
    if let Some(key) = object.keys().find(|key| !required.contains(&key.as_str()) && !optional.contains(&key.as_str())) {
        return Err(violation(label, &format!("{prefix}{key}"), SchemaViolation::UnknownKey));
    }
    if let Some(key) = required.iter().find(|key| !object.contains_key(**key)) {
        return Err(violation(label, &format!("{prefix}{key}"), SchemaViolation::MissingKey));
    }
    Ok(())
}

/// `#3 (OH)` when the state code is readable, `#3` otherwise
fn record_label(idx: usize, record: &Value) -> String {
    match record.get("state").and_then(Value::as_str) {
        Some(state) => format!("#{idx} ({state})"),
        None => format!("#{idx}"),
    }
}

fn violation(label: &str, key: &str, reason: SchemaViolation) -> Error {
    Error::Schema {
        record: label.to_string(),
        key: key.to_string(),
        reason,
    }
}
