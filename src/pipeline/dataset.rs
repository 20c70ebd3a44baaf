use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::pipeline::error::Error;
use crate::trips::convert::parse_raw_trips;
use crate::trips::error::Error as TripsError;
use crate::trips::stations::StationIndex;
use crate::trips::structs::RawTrip;

/// What to do when the file to back up is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupPolicy {
    /// The previous output must exist
    Required,
    /// Skip the backup when there is no previous output
    IfPresent,
}

fn display(path: &Path) -> String {
    format!("{}", path.display())
}

pub fn load_json(path: &Path) -> Result<Value, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read {
        path: display(path),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| Error::Json {
        path: display(path),
        source: e,
    })
}

/// Load an existing dataset. Records are kept as-is.
pub fn load_records(path: &Path) -> Result<Vec<Value>, Error> {
    match load_json(path)? {
        Value::Array(records) => Ok(records),
        _ => Err(Error::InvalidRecords {
            path: display(path),
            source: TripsError::NotATripArray,
        }),
    }
}

pub fn load_raw_trips(path: &Path) -> Result<Vec<RawTrip>, Error> {
    parse_raw_trips(load_json(path)?).map_err(|e| Error::InvalidRecords {
        path: display(path),
        source: e,
    })
}

pub fn load_stations(path: &Path) -> Result<StationIndex, Error> {
    StationIndex::from_geojson(load_json(path)?).map_err(|e| Error::InvalidRecords {
        path: display(path),
        source: e,
    })
}

/// Write `value` as JSON indented with two spaces.
pub fn write_pretty<T>(path: &Path, value: &T) -> Result<(), Error>
where
    T: Serialize + ?Sized,
{
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).map_err(|e| Error::Write {
        path: display(path),
        source: e,
    })
}

/// Sibling backup path: `velov-trips.json` becomes `velov-trips.old.json`.
pub fn default_backup_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}.old.json"))
}

/// Copy the current output to `backup` before it gets overwritten.
///
/// Returns whether a copy was made.
pub fn backup(output: &Path, backup: &Path, policy: BackupPolicy) -> Result<bool, Error> {
    match fs::copy(output, backup) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound && !output.exists() => match policy {
            BackupPolicy::IfPresent => {
                log::debug!("No previous output at {}, skipping backup", output.display());
                Ok(false)
            }
            BackupPolicy::Required => Err(Error::MissingBackupSource(display(output))),
        },
        Err(e) => Err(Error::Write {
            path: display(backup),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn backup_path_sits_next_to_output() {
        assert_eq!(
            default_backup_path(Path::new("public/velov-trips.json")),
            PathBuf::from("public/velov-trips.old.json")
        );
    }

    #[test]
    fn backup_copies_exact_bytes() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.json");
        let old = dir.path().join("out.old.json");
        fs::write(&output, "[\n  1 ]").unwrap();

        assert!(backup(&output, &old, BackupPolicy::Required).unwrap());
        assert_eq!(fs::read_to_string(&old).unwrap(), "[\n  1 ]");
    }

    #[test]
    fn missing_output_follows_policy() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("absent.json");
        let old = dir.path().join("absent.old.json");

        assert!(!backup(&output, &old, BackupPolicy::IfPresent).unwrap());
        assert!(!old.exists());
        assert!(matches!(
            backup(&output, &old, BackupPolicy::Required),
            Err(Error::MissingBackupSource(_))
        ));
    }

    #[test]
    fn unreadable_backup_target_is_not_skipped() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.json");
        fs::write(&output, "[]").unwrap();
        let old = dir.path().join("no-such-dir").join("out.old.json");

        assert!(matches!(
            backup(&output, &old, BackupPolicy::IfPresent),
            Err(Error::Write { .. })
        ));
    }

    #[test]
    fn pretty_output_uses_two_spaces_and_keeps_key_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        fs::write(&path, r#"[{"z": 1, "a": 2}]"#).unwrap();

        let records = load_records(&path).unwrap();
        write_pretty(&path, &records).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[\n  {\n    \"z\": 1,\n    \"a\": 2\n  }\n]"
        );
    }

    #[test]
    fn load_errors_name_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_json(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
        assert!(matches!(load_json(&dir.path().join("nope.json")), Err(Error::Read { .. })));

        fs::write(&path, json!({"trips": []}).to_string()).unwrap();
        assert!(matches!(load_records(&path), Err(Error::InvalidRecords { .. })));
    }
}
