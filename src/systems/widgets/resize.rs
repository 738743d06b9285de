use bevy::prelude::*;

use crate::startup::cursor::{CursorMode, DeskCursor};

use super::{
    chrome,
    drag::clamp_range,
    registry::KindSpec,
    store::{WidgetId, WidgetStore},
    ActiveWidgetGesture, DeskViewport, WidgetGesture,
};

pub const MIN_WIDTH: f32 = 200.0;
pub const MIN_HEIGHT: f32 = 150.0;
/// Windows never grow past this fraction of the viewport in either dimension.
pub const MAX_VIEWPORT_FRACTION: f32 = 0.9;
/// Half-width of the hit zone straddling each window edge.
pub const HANDLE_REACH: f32 = 8.0;

/* ─────────────────────────  DIRECTIONS  ───────────────────────── */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeEdge {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeEdge {
    pub fn includes_north(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    pub fn includes_south(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    pub fn includes_east(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub fn includes_west(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    pub fn cursor_mode(self) -> CursorMode {
        match self {
            Self::East | Self::West => CursorMode::ResizeEw,
            Self::North | Self::South => CursorMode::ResizeNs,
            Self::NorthEast | Self::SouthWest => CursorMode::ResizeNesw,
            Self::NorthWest | Self::SouthEast => CursorMode::ResizeNwse,
        }
    }
}

/// Everything the gesture math is measured against. Captured once at press
/// time; motion is always resolved relative to this snapshot, never to the
/// already-mutated live record, so a long drag cannot accumulate drift.
#[derive(Clone, Copy, Debug)]
pub struct ResizeStart {
    pub pointer: Vec2,
    pub size: Vec2,
    pub position: Vec2,
}

pub struct ResizeGesture {
    pub id: WidgetId,
    pub edge: ResizeEdge,
    pub start: ResizeStart,
}

/* ─────────────────────────  GEOMETRY  ───────────────────────── */

/// Which handle, if any, sits under the pointer for a window at
/// `position`/`size`. Corners win over edges.
pub fn edge_at(pointer: Vec2, position: Vec2, size: Vec2) -> Option<ResizeEdge> {
    let min = position;
    let max = position + size;
    let within_x = pointer.x >= min.x - HANDLE_REACH && pointer.x <= max.x + HANDLE_REACH;
    let within_y = pointer.y >= min.y - HANDLE_REACH && pointer.y <= max.y + HANDLE_REACH;
    if !within_x || !within_y {
        return None;
    }

    let near_west = (pointer.x - min.x).abs() <= HANDLE_REACH;
    let near_east = (pointer.x - max.x).abs() <= HANDLE_REACH;
    let near_north = (pointer.y - min.y).abs() <= HANDLE_REACH;
    let near_south = (pointer.y - max.y).abs() <= HANDLE_REACH;

    match (near_north, near_south, near_east, near_west) {
        (true, _, true, _) => Some(ResizeEdge::NorthEast),
        (true, _, _, true) => Some(ResizeEdge::NorthWest),
        (_, true, true, _) => Some(ResizeEdge::SouthEast),
        (_, true, _, true) => Some(ResizeEdge::SouthWest),
        (true, _, _, _) => Some(ResizeEdge::North),
        (_, true, _, _) => Some(ResizeEdge::South),
        (_, _, true, _) => Some(ResizeEdge::East),
        (_, _, _, true) => Some(ResizeEdge::West),
        _ => None,
    }
}

/// Resolves one pointer sample of a resize gesture into the window's new
/// size and position.
///
/// Each compass component of the edge moves its dimension by the pointer
/// delta; west/north also shift the position so the opposite edge stays
/// visually anchored. Both dimensions clamp to `[MIN, viewport * 0.9]`, and
/// a dimension pinned at its minimum re-derives the position so the anchored
/// edge cannot creep.
///
/// Aspect-locked kinds treat one axis as primary (width for horizontal edges
/// and corners, height for pure vertical edges) and derive the other from
/// the content ratio. The clamp runs over the combined size and the
/// secondary dimension is then derived a second time from the clamped
/// primary, so hitting a limit cannot silently break the ratio.
pub fn resolve_resize(
    edge: ResizeEdge,
    start: ResizeStart,
    pointer: Vec2,
    viewport: Vec2,
    spec: &KindSpec,
) -> (Vec2, Vec2) {
    let delta = pointer - start.pointer;
    let mut width = start.size.x;
    let mut height = start.size.y;
    let mut position = start.position;

    if edge.includes_east() {
        width = start.size.x + delta.x;
    }
    if edge.includes_west() {
        width = start.size.x - delta.x;
        position.x = start.position.x + delta.x;
    }
    if edge.includes_south() {
        height = start.size.y + delta.y;
    }
    if edge.includes_north() {
        height = start.size.y - delta.y;
        position.y = start.position.y + delta.y;
    }

    let max_width = viewport.x * MAX_VIEWPORT_FRACTION;
    let max_height = viewport.y * MAX_VIEWPORT_FRACTION;

    if let Some(ratio) = spec.aspect_ratio {
        let width_is_primary = edge.includes_east() || edge.includes_west();
        if width_is_primary {
            height = spec.height_for_width(width, ratio);
        } else {
            width = spec.width_for_height(height, ratio);
        }

        width = clamp_range(width, MIN_WIDTH, max_width);
        height = clamp_range(height, MIN_HEIGHT, max_height);

        // Second pass: the clamped primary dictates the secondary again.
        if width_is_primary {
            height = spec.height_for_width(width, ratio);
        } else {
            width = spec.width_for_height(height, ratio);
        }
    } else {
        width = clamp_range(width, MIN_WIDTH, max_width);
        height = clamp_range(height, MIN_HEIGHT, max_height);
    }

    if edge.includes_west() && width == MIN_WIDTH {
        position.x = start.position.x + start.size.x - MIN_WIDTH;
    }
    if edge.includes_north() && height == MIN_HEIGHT {
        position.y = start.position.y + start.size.y - MIN_HEIGHT;
    }

    (Vec2::new(width, height), position)
}

/* ─────────────────────────  SYSTEMS  ───────────────────────── */

/// Pointer-down on a handle of the topmost window under the pointer acquires
/// the gesture slot with a fresh start snapshot. Minimized windows expose no
/// resize surface.
pub fn begin_resize(
    mouse_input: Res<ButtonInput<MouseButton>>,
    mut cursor: ResMut<DeskCursor>,
    store: Res<WidgetStore>,
    mut gesture: ResMut<ActiveWidgetGesture>,
) {
    if !gesture.is_idle() || !mouse_input.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(pointer) = cursor.position else {
        return;
    };

    let Some(record) = chrome::topmost_surface_hit(&store, pointer) else {
        return;
    };
    if record.minimized {
        return;
    }
    let Some(edge) = edge_at(pointer, record.position, record.display_size()) else {
        return;
    };

    cursor.mode = edge.cursor_mode();
    gesture.gesture = Some(WidgetGesture::Resize(ResizeGesture {
        id: record.id.clone(),
        edge,
        start: ResizeStart {
            pointer,
            size: record.size,
            position: record.position,
        },
    }));
}

pub fn apply_resize(
    mouse_input: Res<ButtonInput<MouseButton>>,
    mut cursor: ResMut<DeskCursor>,
    viewport: Res<DeskViewport>,
    mut store: ResMut<WidgetStore>,
    mut gesture: ResMut<ActiveWidgetGesture>,
) {
    let (id, edge, start) = match &gesture.gesture {
        Some(WidgetGesture::Resize(resize)) => (resize.id.clone(), resize.edge, resize.start),
        _ => return,
    };
    if !mouse_input.pressed(MouseButton::Left) {
        return;
    }
    let Some(pointer) = cursor.position else {
        return;
    };

    let Some(record) = store.get(&id) else {
        gesture.release(&mut cursor);
        return;
    };

    let (size, position) = resolve_resize(edge, start, pointer, viewport.0, record.kind.spec());
    store.update_size(&id, size);
    store.update_position(&id, position);
}
