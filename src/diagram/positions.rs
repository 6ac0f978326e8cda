//! Persisted position overrides. The store resolves a node to its override
//! when one exists, else the configured default, else dead center. Nothing
//! in here is allowed to fail the caller: bad persisted data reads as
//! empty, failed writes are logged and swallowed.

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::types::FlowGraph;

/// The one fixed key all overrides live under in the backing store.
pub const POSITION_NAMESPACE: &str = "compostflow.positions";

/// A canvas-relative coordinate, both axes nominally in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormPos {
    pub x: f64,
    pub y: f64,
}

pub type PositionMap = HashMap<String, NormPos>;

/// Durable client-local key/value storage. Reads and writes may fail;
/// callers treat both as recoverable.
pub trait PositionBackend {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), String>;
}

/// In-memory backend for tests and headless use. Can be told to refuse
/// writes to exercise the swallow-on-failure path.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
    pub fail_writes: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.to_string());
        Self {
            entries,
            fail_writes: false,
        }
    }
}

impl PositionBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), String> {
        if self.fail_writes {
            return Err("write refused".to_string());
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store. One store, one file: the namespace key names the
/// store, the path says where it lives.
#[derive(Debug)]
pub struct FileBackend {
    path: std::path::PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PositionBackend for FileBackend {
    fn read(&self, _key: &str) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }

    fn write(&mut self, _key: &str, value: &str) -> Result<(), String> {
        std::fs::write(&self.path, value)
            .map_err(|e| format!("{}: {}", self.path.display(), e))
    }
}

/// Total parse of a persisted override map. Malformed JSON yields `None`;
/// entries with non-finite coordinates are dropped individually. Never
/// raises, never panics.
pub fn parse_position_map(raw: &str) -> Option<PositionMap> {
    let parsed: PositionMap = serde_json::from_str(raw).ok()?;
    Some(
        parsed
            .into_iter()
            .filter(|(_, pos)| pos.x.is_finite() && pos.y.is_finite())
            .collect(),
    )
}

pub struct PositionStore<B: PositionBackend> {
    backend: B,
    overrides: PositionMap,
}

impl<B: PositionBackend> PositionStore<B> {
    /// Open the store, reading whatever overrides survive parsing. A
    /// corrupt or unreadable backing entry degrades to "no overrides".
    pub fn open(backend: B) -> Self {
        let overrides = match backend.read(POSITION_NAMESPACE) {
            Some(raw) => match parse_position_map(&raw) {
                Some(map) => map,
                None => {
                    warn!("discarding malformed position overrides under {POSITION_NAMESPACE}");
                    PositionMap::new()
                }
            },
            None => PositionMap::new(),
        };

        Self { backend, overrides }
    }

    /// Stored override if present, else the node's configured default,
    /// else dead center as the last resort.
    pub fn resolve(&self, node_id: &str, graph: &FlowGraph) -> NormPos {
        if let Some(pos) = self.overrides.get(node_id) {
            return *pos;
        }
        match graph.default_position(node_id) {
            Some([x, y]) => NormPos { x, y },
            None => NormPos { x: 0.5, y: 0.5 },
        }
    }

    /// Merge one override in and persist the whole map. The in-memory
    /// update always lands; a failed write only logs. The store does not
    /// clamp; that is the interaction controller's job before calling.
    pub fn set(&mut self, node_id: &str, x: f64, y: f64) {
        self.overrides
            .insert(node_id.to_string(), NormPos { x, y });

        match serde_json::to_string(&self.overrides) {
            Ok(serialized) => {
                if let Err(e) = self.backend.write(POSITION_NAMESPACE, &serialized) {
                    warn!("position write failed, keeping in-memory override: {e}");
                } else {
                    debug!("persisted {} position override(s)", self.overrides.len());
                }
            }
            Err(e) => warn!("position map serialization failed: {e}"),
        }
    }

    /// Read-only snapshot of the current overrides.
    pub fn export(&self) -> PositionMap {
        self.overrides.clone()
    }
}
