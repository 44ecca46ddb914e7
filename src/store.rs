use std::io::Write;
use std::path::Path;
use log::info;
use serde_json::Value;
use crate::error::{Error, Result, SchemaViolation};
use crate::record::{AddressRecord, CapitalsDocument, LEGACY_RECORDS_KEY, RECORDS_KEY};
use crate::schema;

/// Read a capitals file, check its shape and convert it to typed records.
pub fn read_document(path: impl AsRef<Path>) -> Result<Vec<AddressRecord>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
    let mut root: Value = serde_json::from_str(&contents).map_err(|e| Error::file(path, e))?;

    let key = if root.get(RECORDS_KEY).is_some() {
        RECORDS_KEY
    } else if root.get(LEGACY_RECORDS_KEY).is_some() {
        info!("[{}] uses the legacy `{}` key", path.display(), LEGACY_RECORDS_KEY);
        LEGACY_RECORDS_KEY
    } else {
        return Err(Error::Schema {
            record: "<document>".to_string(),
            key: RECORDS_KEY.to_string(),
            reason: SchemaViolation::MissingKey,
        });
    };
    let raw = match root[key].take() {
        Value::Array(records) => records,
        _ => return Err(Error::Schema {
            record: "<document>".to_string(),
            key: key.to_string(),
            reason: SchemaViolation::InvalidValue,
        }),
    };

    schema::validate(&raw)?;

    raw.into_iter()
        .enumerate()
        .map(|(idx, value)| {
            serde_json::from_value::<AddressRecord>(value)
                .map_err(|e| Error::file(path, format!("cannot convert record #{idx}: {e}")))
        })
        .collect()
}

/// Write records as `{ "state_capitals": [...] }`, pretty printed.
///
/// The file is written to a temp file next to the destination and renamed into place.
pub fn write_document(path: impl AsRef<Path>, records: &[AddressRecord]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| Error::file(dir, e))?;
    }

    let mut json = serde_json::to_string_pretty(&CapitalsDocument { state_capitals: records })
        .map_err(|e| Error::file(path, e))?;
    json.push('\n');

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::file(dir, e))?;
    tmp.write_all(json.as_bytes()).map_err(|e| Error::file(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::file(path, e.error))?;
    Ok(())
}
