use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::KVError;
use crate::traits::KVStore;

/// FileLoader seeds a KVStore from a directory of record files.
///
/// Each `*.json`, `*.yaml` or `*.yml` file holds either one record object or
/// a list of them. Every record must carry a non-empty string `id`; it is
/// stored as compact JSON under `{prefix}{id}`:
///
/// ```text
/// seed-dir/
/// ├── electronics.json   → [{"id": "B0001", ...}, {"id": "B0002", ...}]
/// └── B0100.yaml         → {id: B0100, title: ...}
/// ```
///
/// Files are read in file-name order and written in one batch, so a bad file
/// leaves the store untouched.
pub struct FileLoader;

impl FileLoader {
    /// Load every record file in `dir` into `store`.
    /// Returns the number of records written.
    pub fn load(dir: &Path, prefix: &str, store: &dyn KVStore) -> Result<usize, KVError> {
        if !dir.is_dir() {
            warn!("FileLoader: seed dir {:?} does not exist, skipping", dir);
            return Ok(0);
        }

        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| KVError::Storage(e.to_string()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        files.sort();

        let mut seen = HashSet::new();
        let mut batch: Vec<(String, Vec<u8>)> = Vec::new();

        for path in files {
            if !path.is_file() {
                continue;
            }
            let Some(format) = Format::of(&path) else {
                debug!("FileLoader: ignoring {:?}", path);
                continue;
            };

            let data = fs::read(&path).map_err(|e| KVError::Storage(e.to_string()))?;
            let records = format.parse(&data).map_err(|e| {
                KVError::Serialization(format!("{}: {}", path.display(), e))
            })?;

            for record in records {
                let id = record_id(&record)
                    .map_err(|e| KVError::Serialization(format!("{}: {}", path.display(), e)))?;
                if !seen.insert(id.clone()) {
                    return Err(KVError::Serialization(format!(
                        "{}: duplicate id '{}'",
                        path.display(),
                        id
                    )));
                }
                let bytes = serde_json::to_vec(&record)
                    .map_err(|e| KVError::Serialization(e.to_string()))?;
                batch.push((format!("{}{}", prefix, id), bytes));
            }
        }

        let entries: Vec<(&str, &[u8])> = batch
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_slice()))
            .collect();
        store.batch_set(&entries)?;

        info!("FileLoader: loaded {} records from {:?}", entries.len(), dir);
        Ok(entries.len())
    }
}

#[derive(Clone, Copy)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Format::Json),
            Some("yaml") | Some("yml") => Some(Format::Yaml),
            _ => None,
        }
    }

    fn parse(self, data: &[u8]) -> Result<Vec<Value>, String> {
        let value: Value = match self {
            Format::Json => serde_json::from_slice(data).map_err(|e| e.to_string())?,
            Format::Yaml => serde_yaml::from_slice(data).map_err(|e| e.to_string())?,
        };
        match value {
            Value::Array(items) => Ok(items),
            obj @ Value::Object(_) => Ok(vec![obj]),
            other => Err(format!("expected an object or a list, got {}", other)),
        }
    }
}

fn record_id(record: &Value) -> Result<String, String> {
    match record.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::String(_)) => Err("record has an empty id".to_string()),
        Some(_) => Err("record id must be a string".to_string()),
        None => Err("record is missing an id".to_string()),
    }
}
