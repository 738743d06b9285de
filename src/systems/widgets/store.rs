use std::{collections::HashMap, fmt};

use bevy::prelude::*;

use crate::data::layout::{
    LayoutDocument, LayoutStorage, PagePoint, PageSize, StoredWidget,
};

use super::{
    registry::WidgetKind,
    resize::{MIN_HEIGHT, MIN_WIDTH},
};

/// Stacking values minted on a fresh store start here.
const FIRST_Z_INDEX: u32 = 1;

/* ─────────────────────────  RECORDS  ───────────────────────── */

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn test_id(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One open widget window. Position is the page-coordinate top-left (y down,
/// may legally go negative); size is the full window footprint including the
/// header chrome and never drops below the minimum.
#[derive(Clone, Debug)]
pub struct WidgetRecord {
    pub id: WidgetId,
    pub kind: WidgetKind,
    pub position: Vec2,
    pub size: Vec2,
    pub minimized: bool,
    pub z_index: u32,
}

impl WidgetRecord {
    pub fn display_size(&self) -> Vec2 {
        self.kind.spec().display_size(self.size, self.minimized)
    }
}

/* ─────────────────────────  STORE  ───────────────────────── */

/// Authoritative owner of every widget record and the stacking counter.
///
/// Constructed with its storage backend and inserted into the world. There
/// is deliberately no global instance, so tests build isolated stores. The
/// whole layout is written back through the backend after every mutation;
/// geometry setters perform no clamping (geometry policy belongs to the
/// drag/resize controllers).
///
/// The store permits several windows of the same kind; single-instance-per-
/// kind is the launcher's policy, not an invariant here.
#[derive(Resource)]
pub struct WidgetStore {
    records: HashMap<WidgetId, WidgetRecord>,
    next_z_index: u32,
    next_serial: u64,
    storage: Box<dyn LayoutStorage>,
}

impl WidgetStore {
    pub fn new(storage: Box<dyn LayoutStorage>) -> Self {
        let mut store = Self {
            records: HashMap::new(),
            next_z_index: FIRST_Z_INDEX,
            next_serial: 1,
            storage,
        };
        store.hydrate();
        store
    }

    /* ───────────── operations ───────────── */

    /// Opens a window of `kind` centered in the viewport at its default size
    /// and returns its id. Nothing is clamped at creation time.
    pub fn create(&mut self, kind: WidgetKind, viewport: Vec2) -> WidgetId {
        let default_size = kind.spec().default_size;
        let position = (viewport - default_size) * 0.5;
        self.create_with_geometry(kind, position, default_size)
    }

    /// `create` with explicit initial geometry for callers that override the
    /// centered default.
    pub fn create_with_geometry(
        &mut self,
        kind: WidgetKind,
        position: Vec2,
        size: Vec2,
    ) -> WidgetId {
        let id = self.mint_id(kind);
        let z_index = self.mint_z_index();
        self.records.insert(
            id.clone(),
            WidgetRecord {
                id: id.clone(),
                kind,
                position,
                size,
                minimized: false,
                z_index,
            },
        );
        self.persist();
        id
    }

    /// Removes the record outright. No undo.
    pub fn close(&mut self, id: &WidgetId) {
        if self.records.remove(id).is_some() {
            self.persist();
        }
    }

    pub fn minimize(&mut self, id: &WidgetId) {
        if let Some(record) = self.records.get_mut(id) {
            record.minimized = true;
            self.persist();
        }
    }

    /// Restoring is an interaction, so the window also re-claims the top of
    /// the stack.
    pub fn restore(&mut self, id: &WidgetId) {
        if let Some(record) = self.records.get_mut(id) {
            record.minimized = false;
            self.claim_top(id);
            self.persist();
        }
    }

    /// No-op when the window is already topmost, so repeated clicks on the
    /// top window cause no renumbering or persistence churn.
    pub fn bring_to_front(&mut self, id: &WidgetId) {
        if !self.records.contains_key(id) {
            return;
        }
        if self.claim_top(id) {
            self.persist();
        }
    }

    /// Raw setter used by the drag controller; clamping already happened.
    pub fn update_position(&mut self, id: &WidgetId, position: Vec2) {
        if let Some(record) = self.records.get_mut(id) {
            record.position = position;
            self.persist();
        }
    }

    /// Raw setter used by the resize controller; clamping already happened.
    pub fn update_size(&mut self, id: &WidgetId, size: Vec2) {
        if let Some(record) = self.records.get_mut(id) {
            record.size = size;
            self.persist();
        }
    }

    /* ───────────── read-only views ───────────── */

    pub fn get(&self, id: &WidgetId) -> Option<&WidgetRecord> {
        self.records.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids_of_kind(&self, kind: WidgetKind) -> Vec<WidgetId> {
        let mut ids: Vec<WidgetId> = self
            .records
            .values()
            .filter(|record| record.kind == kind)
            .map(|record| record.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// The record currently rendered on top of the stack.
    pub fn top(&self) -> Option<&WidgetRecord> {
        self.records.values().max_by_key(|record| record.z_index)
    }

    pub fn next_z_index(&self) -> u32 {
        self.next_z_index
    }

    /* ───────────── internals ───────────── */

    /// Read-then-increment in one step; two operations can never be handed
    /// the same stacking value.
    fn mint_z_index(&mut self) -> u32 {
        let z_index = self.next_z_index;
        self.next_z_index += 1;
        z_index
    }

    fn claim_top(&mut self, id: &WidgetId) -> bool {
        let already_top = self
            .records
            .get(id)
            .is_some_and(|record| record.z_index == self.next_z_index - 1);
        if already_top {
            return false;
        }
        let z_index = self.mint_z_index();
        if let Some(record) = self.records.get_mut(id) {
            record.z_index = z_index;
        }
        true
    }

    fn mint_id(&mut self, kind: WidgetKind) -> WidgetId {
        let serial = self.next_serial;
        self.next_serial += 1;
        WidgetId(format!("{}-{serial}", kind.key()))
    }

    fn persist(&self) {
        let document = self.to_document();
        match document.encode() {
            Ok(raw) => {
                if let Err(err) = self.storage.save(&raw) {
                    warn!("Failed to persist widget layout: {err}");
                }
            }
            Err(err) => warn!("Failed to serialize widget layout: {err}"),
        }
    }

    fn to_document(&self) -> LayoutDocument {
        let widgets = self
            .records
            .values()
            .map(|record| {
                (
                    record.id.as_str().to_string(),
                    StoredWidget {
                        id: record.id.as_str().to_string(),
                        kind: record.kind,
                        position: PagePoint {
                            x: record.position.x,
                            y: record.position.y,
                        },
                        size: PageSize {
                            width: record.size.x,
                            height: record.size.y,
                        },
                        minimized: record.minimized,
                        z_index: record.z_index,
                    },
                )
            })
            .collect();
        LayoutDocument {
            widgets,
            next_z_index: self.next_z_index,
        }
    }

    /// Reads the persisted document once. Anything unreadable degrades to an
    /// empty store; individual corrupt records are dropped before they can
    /// reach render.
    fn hydrate(&mut self) {
        let Some(raw) = self.storage.load() else {
            return;
        };
        let mut document = match LayoutDocument::decode(&raw) {
            Ok(document) => document,
            Err(err) => {
                warn!("Discarding persisted widget layout: {err}");
                return;
            }
        };
        let dropped = document.sanitize();
        if dropped > 0 {
            warn!("Dropped {dropped} corrupt widget record(s) from persisted layout");
        }

        for (key, stored) in document.widgets {
            let id = WidgetId(key);
            let size = Vec2::new(
                stored.size.width.max(MIN_WIDTH),
                stored.size.height.max(MIN_HEIGHT),
            );
            self.next_serial = self.next_serial.max(id_serial(&id) + 1);
            self.records.insert(
                id.clone(),
                WidgetRecord {
                    id,
                    kind: stored.kind,
                    position: Vec2::new(stored.position.x, stored.position.y),
                    size,
                    minimized: stored.minimized,
                    z_index: stored.z_index,
                },
            );
        }
        self.next_z_index = document.next_z_index.max(FIRST_Z_INDEX);
    }
}

/// Trailing serial of a minted id; foreign-shaped ids count as serial 0 so
/// they only ever push the counter up.
fn id_serial(id: &WidgetId) -> u64 {
    id.as_str()
        .rsplit('-')
        .next()
        .and_then(|tail| tail.parse().ok())
        .unwrap_or(0)
}
