//! Dataset loading with an explicit fallback branch

use crate::{AgentError, Result};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Where a loaded dataset came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    /// Read from this file
    File(PathBuf),
    /// Built-in rows, used because the file could not be read
    Fallback(String),
}

impl DataOrigin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, DataOrigin::Fallback(_))
    }
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataOrigin::File(path) => write!(f, "{}", path.display()),
            DataOrigin::Fallback(reason) => write!(f, "built-in sample data ({})", reason),
        }
    }
}

/// A dataset together with its origin
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: T,
    pub origin: DataOrigin,
}

/// Deserialize every row of a headed CSV file.
///
/// Columns not named by `T` are ignored.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (line, result) in reader.deserialize().enumerate() {
        let row: T = result.map_err(|e| {
            AgentError::Dataset(format!("{} row {}: {}", path.display(), line + 1, e))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Run `loader` on `path`; if it fails, log a warning and use `fallback` instead
pub fn load_or_fallback<T, L, F>(path: &Path, loader: L, fallback: F) -> Loaded<T>
where
    L: FnOnce(&Path) -> Result<T>,
    F: FnOnce() -> T,
{
    match loader(path) {
        Ok(data) => Loaded {
            data,
            origin: DataOrigin::File(path.to_path_buf()),
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "dataset unavailable, using fallback");
            Loaded {
                data: fallback(),
                origin: DataOrigin::Fallback(e.to_string()),
            }
        }
    }
}

/// Accept `true`/`false` in any case as well as `1`/`0` and `yes`/`no`
pub fn flexible_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" | "" => Ok(false),
        other => Err(de::Error::custom(format!("invalid boolean '{}'", other))),
    }
}
