use std::{
    collections::HashMap,
    fmt, fs, io,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};

use crate::systems::widgets::registry::WidgetKind;

/* ─────────────────────────  WIRE DOCUMENT  ───────────────────────── */

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PagePoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWidget {
    pub id: String,
    pub kind: WidgetKind,
    pub position: PagePoint,
    pub size: PageSize,
    pub minimized: bool,
    pub z_index: u32,
}

/// The whole persisted layout: every open widget plus the stacking counter,
/// written as one JSON object under one fixed location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub widgets: HashMap<String, StoredWidget>,
    #[serde(default)]
    pub next_z_index: u32,
}

#[derive(Debug)]
pub enum LayoutError {
    Parse(String),
    Shape(String),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "layout document is not valid json: {message}"),
            Self::Shape(message) => write!(f, "layout document has the wrong shape: {message}"),
        }
    }
}

impl std::error::Error for LayoutError {}

impl LayoutDocument {
    pub fn decode(raw: &str) -> Result<Self, LayoutError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|err| LayoutError::Parse(err.to_string()))?;
        if !value.get("widgets").is_some_and(|widgets| widgets.is_object()) {
            return Err(LayoutError::Shape(
                "`widgets` must be an object keyed by widget id".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|err| LayoutError::Shape(err.to_string()))
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Drops records whose geometry could corrupt rendering (non-finite or
    /// non-positive numbers), renumbers duplicated stacking values, and
    /// repairs a stale counter. Returns how many records were dropped.
    pub fn sanitize(&mut self) -> usize {
        let before = self.widgets.len();
        self.widgets
            .retain(|_, widget| widget_geometry_is_sound(widget));
        let dropped = before - self.widgets.len();

        let mut ordered: Vec<&String> = self.widgets.keys().collect();
        ordered.sort_by_key(|id| (self.widgets[*id].z_index, (*id).clone()));
        let has_duplicates = ordered
            .windows(2)
            .any(|pair| self.widgets[pair[0]].z_index == self.widgets[pair[1]].z_index);
        if has_duplicates {
            let ordered: Vec<String> = ordered.into_iter().cloned().collect();
            for (rank, id) in ordered.iter().enumerate() {
                if let Some(widget) = self.widgets.get_mut(id) {
                    widget.z_index = rank as u32 + 1;
                }
            }
        }

        let max_z = self.widgets.values().map(|widget| widget.z_index).max();
        if let Some(max_z) = max_z {
            if self.next_z_index <= max_z {
                self.next_z_index = max_z + 1;
            }
        }

        dropped
    }
}

fn widget_geometry_is_sound(widget: &StoredWidget) -> bool {
    let StoredWidget { position, size, .. } = widget;
    position.x.is_finite()
        && position.y.is_finite()
        && size.width.is_finite()
        && size.height.is_finite()
        && size.width > 0.0
        && size.height > 0.0
}

/* ─────────────────────────  STORAGE BACKENDS  ───────────────────────── */

/// One fixed slot of durable storage for the serialized layout. The store
/// never touches the filesystem directly; tests run against the in-memory
/// backend.
pub trait LayoutStorage: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, raw: &str) -> io::Result<()>;
}

pub struct FileLayoutStorage {
    path: PathBuf,
}

impl FileLayoutStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<config_dir>/widget_desk/layout.json`, falling back to the working
    /// directory when the platform reports no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("widget_desk")
            .join("layout.json")
    }
}

impl Default for FileLayoutStorage {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl LayoutStorage for FileLayoutStorage {
    fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Some(raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                log::warn!("Failed to read layout file {:?}: {err}", self.path);
                None
            }
        }
    }

    fn save(&self, raw: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, raw)
    }
}

/// Shared in-memory slot; clones observe each other's writes, which lets a
/// test hand the same slot to two stores and check rehydration.
#[derive(Clone, Default)]
pub struct MemoryLayoutStorage {
    slot: Arc<Mutex<Option<String>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryLayoutStorage {
    pub fn preloaded(raw: &str) -> Self {
        let storage = Self::default();
        *storage.slot.lock().unwrap() = Some(raw.to_string());
        storage
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl LayoutStorage for MemoryLayoutStorage {
    fn load(&self) -> Option<String> {
        self.slot.lock().unwrap().clone()
    }

    fn save(&self, raw: &str) -> io::Result<()> {
        *self.slot.lock().unwrap() = Some(raw.to_string());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}
