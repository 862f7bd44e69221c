//! Studio save-file serialization.
//!
//! A save-file captures the whole studio: instruments with their parameter
//! data, connections and presets, wrapped in a versioned JSON envelope.
//! Loading validates the envelope and migrates older payloads before any
//! typed data is built, so a rejected file never yields a partial studio.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::graph::{Connection, Instrument, InstrumentId, Medium, Preset, Studio};

/// Current save-file format version. Only this version is accepted.
pub const SAVE_FILE_VERSION: u64 = 1;

/// A complete studio save-file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFile {
    pub version: u64,
    /// RFC 3339 timestamp of the export.
    pub exported_at: String,
    pub instruments: Vec<Instrument>,
    pub connections: Vec<Connection>,
    pub presets: Vec<Preset>,
}

impl SaveFile {
    /// Captures the current state of a studio.
    pub fn from_studio(studio: &Studio) -> Self {
        Self {
            version: SAVE_FILE_VERSION,
            exported_at: chrono::Utc::now().to_rfc3339(),
            instruments: studio.instruments().to_vec(),
            connections: studio.connections().to_vec(),
            presets: studio.presets().to_vec(),
        }
    }

    /// Rebuilds a studio from this save-file.
    pub fn into_studio(self) -> Studio {
        Studio::from_parts(self.instruments, self.connections, self.presets)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SaveFileError> {
        serde_json::to_string_pretty(self).map_err(SaveFileError::Serialize)
    }
}

/// Values filled in for fields older save-files do not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MigrationDefaults {
    pub show_cv_ports: bool,
}

/// Error type for save-file operations.
#[derive(Debug, Error)]
pub enum SaveFileError {
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("failed to serialize save-file: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("save-file must be a JSON object")]
    NotAnObject,

    #[error("unsupported save-file version: found {found}, expected {SAVE_FILE_VERSION}")]
    UnsupportedVersion { found: String },

    #[error("'{0}' must be an array")]
    NotAnArray(&'static str),

    #[error("invalid {kind} at index {index}: {source}")]
    InvalidEntry {
        kind: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Connection as stored on disk. The id is recomputed from the endpoints.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConnection {
    source: InstrumentId,
    source_port: String,
    target: InstrumentId,
    target_port: String,
    medium: Medium,
}

/// Parses and validates a save-file with default migration values.
pub fn parse_save_file(json: &str) -> Result<SaveFile, SaveFileError> {
    parse_save_file_with(json, MigrationDefaults::default())
}

/// Parses and validates a save-file.
pub fn parse_save_file_with(
    json: &str,
    defaults: MigrationDefaults,
) -> Result<SaveFile, SaveFileError> {
    let value: Value = serde_json::from_str(json)?;
    let root = value.as_object().ok_or(SaveFileError::NotAnObject)?;

    let version = root.get("version");
    if version.and_then(Value::as_u64) != Some(SAVE_FILE_VERSION) {
        return Err(SaveFileError::UnsupportedVersion {
            found: version.map_or_else(|| "none".to_string(), Value::to_string),
        });
    }

    let instruments = array_field(root, "instruments")?;
    let connections = array_field(root, "connections")?;
    let presets = match root.get("presets") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => return Err(SaveFileError::NotAnArray("presets")),
    };

    let instruments = instruments
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            serde_json::from_value::<Instrument>(migrate_instrument(raw.clone(), defaults))
                .map_err(|source| SaveFileError::InvalidEntry {
                    kind: "instrument",
                    index,
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let connections = connections
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            serde_json::from_value::<StoredConnection>(raw.clone())
                .map(|c| {
                    Connection::new(c.source, c.source_port, c.target, c.target_port, c.medium)
                })
                .map_err(|source| SaveFileError::InvalidEntry {
                    kind: "connection",
                    index,
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let presets = presets
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let mut raw = raw.clone();
            if let Some(inst) = raw.get_mut("instrument") {
                *inst = migrate_instrument(inst.take(), defaults);
            }
            serde_json::from_value::<Preset>(raw).map_err(|source| SaveFileError::InvalidEntry {
                kind: "preset",
                index,
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let exported_at = root
        .get("exportedAt")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(SaveFile {
        version: SAVE_FILE_VERSION,
        exported_at,
        instruments,
        connections,
        presets,
    })
}

fn array_field<'a>(
    root: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a [Value], SaveFileError> {
    root.get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or(SaveFileError::NotAnArray(field))
}

/// Backfills missing fields and upgrades legacy drum lanes.
fn migrate_instrument(mut raw: Value, defaults: MigrationDefaults) -> Value {
    let Some(obj) = raw.as_object_mut() else {
        return raw;
    };
    obj.entry("automationLanes")
        .or_insert_with(|| Value::Array(Vec::new()));
    obj.entry("showCvPorts")
        .or_insert(Value::Bool(defaults.show_cv_ports));

    if let Some(Value::Array(lanes)) = obj.get_mut("drumLanes") {
        for lane in lanes.iter_mut().filter_map(Value::as_object_mut) {
            migrate_drum_lane(lane);
        }
    }
    raw
}

/// Legacy lanes carry a single `channel` field holding the row number.
fn migrate_drum_lane(lane: &mut Map<String, Value>) {
    if let Some(channel) = lane.remove("channel") {
        if !lane.contains_key("row") {
            lane.insert("row".to_string(), channel);
        }
    }
}

/// Save a studio to a JSON file.
pub fn save_to_file(save: &SaveFile, path: &Path) -> Result<(), SaveFileError> {
    let json = save.to_json()?;
    std::fs::write(path, json)?;
    log::info!("saved studio to {}", path.display());
    Ok(())
}

/// Load a save-file from disk.
pub fn load_from_file(
    path: &Path,
    defaults: MigrationDefaults,
) -> Result<SaveFile, SaveFileError> {
    let json = std::fs::read_to_string(path)?;
    let save = parse_save_file_with(&json, defaults)?;
    log::info!(
        "loaded {} instrument(s), {} connection(s) from {}",
        save.instruments.len(),
        save.connections.len(),
        path.display()
    );
    Ok(save)
}
