//! Loads a directory of per-device Batfish-shaped JSON files into the
//! `device name -> parsed JSON` map the core crate's driver expects.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{CliError, Result};

pub fn load_devices(dir: &Path) -> Result<IndexMap<String, Value>> {
    let mut devices = IndexMap::new();

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    for path in paths {
        let text = std::fs::read_to_string(&path)?;
        let json: Value = serde_json::from_str(&text).map_err(|source| CliError::Json {
            path: path.clone(),
            source,
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        devices.insert(name, json);
    }

    if devices.is_empty() {
        return Err(CliError::NoDevices(dir.to_path_buf()));
    }

    Ok(devices)
}
