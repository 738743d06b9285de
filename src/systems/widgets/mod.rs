use bevy::{prelude::*, window::PrimaryWindow};

use crate::{
    data::layout::FileLayoutStorage,
    startup::cursor::{CursorMode, DeskCursor},
};

pub mod chrome;
pub mod content;
pub mod drag;
pub mod launcher;
pub mod registry;
pub mod resize;
pub mod store;

#[cfg(test)]
mod tests;

use drag::DragGesture;
use resize::ResizeGesture;
use store::WidgetStore;

/* ─────────────────────────  PLUGIN  ───────────────────────── */

pub struct WidgetsPlugin;
impl Plugin for WidgetsPlugin {
    fn build(&self, app: &mut App) {
        // The store is injectable: whoever builds the app may insert a store
        // wired to any storage backend first (tests use the in-memory one).
        if !app.world().contains_resource::<WidgetStore>() {
            app.insert_resource(WidgetStore::new(Box::new(FileLayoutStorage::default())));
        }

        app.init_resource::<ActiveWidgetGesture>()
            .init_resource::<DeskCursor>()
            .init_resource::<DeskViewport>()
            .configure_sets(
                Update,
                (
                    WidgetSystem::Input,
                    WidgetSystem::Resolve.after(WidgetSystem::Input),
                    WidgetSystem::Layout.after(WidgetSystem::Resolve),
                ),
            )
            .add_systems(
                Update,
                (
                    sync_viewport,
                    chrome::raise_on_pointer_down,
                    chrome::activate_buttons,
                    resize::begin_resize,
                    drag::begin_drag,
                    resize::apply_resize,
                    drag::apply_drag,
                    end_finished_gesture,
                )
                    .chain()
                    .in_set(WidgetSystem::Input),
            )
            .add_systems(
                Update,
                content::sync_content_state.in_set(WidgetSystem::Resolve),
            )
            .add_systems(
                Update,
                (chrome::sync_windows, chrome::sync_geometry)
                    .chain()
                    .in_set(WidgetSystem::Layout),
            );
    }
}

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum WidgetSystem {
    Input,
    Resolve,
    Layout,
}

/* ─────────────────────────  SHARED STATE  ───────────────────────── */

/// Page-coordinate viewport extent (the size of the desk window). Kept as its
/// own resource so geometry systems and tests never need a live winit window.
#[derive(Resource, Clone, Copy)]
pub struct DeskViewport(pub Vec2);

impl Default for DeskViewport {
    fn default() -> Self {
        Self(Vec2::new(1280.0, 720.0))
    }
}

/// At most one pointer gesture is in flight at any time, and it is either a
/// drag or a resize, never both. Acquiring the slot starts a gesture;
/// releasing it (on any exit path) ends the gesture and restores the cursor.
#[derive(Resource, Default)]
pub struct ActiveWidgetGesture {
    pub gesture: Option<WidgetGesture>,
}

pub enum WidgetGesture {
    Drag(DragGesture),
    Resize(ResizeGesture),
}

impl ActiveWidgetGesture {
    pub fn is_idle(&self) -> bool {
        self.gesture.is_none()
    }

    /// Releases the gesture slot and restores the cursor. Every gesture exit
    /// path funnels through here so the cursor can never stay stuck in a
    /// grab/resize shape.
    pub fn release(&mut self, cursor: &mut DeskCursor) {
        self.gesture = None;
        cursor.mode = CursorMode::Default;
    }
}

fn sync_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<DeskViewport>,
) {
    if let Ok(window) = windows.single() {
        let size = Vec2::new(window.width(), window.height());
        if size.x > 0.0 && size.y > 0.0 && viewport.0 != size {
            viewport.0 = size;
        }
    }
}

/// Ends the active gesture when the pointer is released or leaves the desk
/// window entirely. Runs after the apply systems so the final committed
/// position/size of the frame is kept (no snap-back).
fn end_finished_gesture(
    mouse_input: Res<ButtonInput<MouseButton>>,
    mut cursor: ResMut<DeskCursor>,
    mut gesture: ResMut<ActiveWidgetGesture>,
) {
    if gesture.is_idle() {
        return;
    }
    if !mouse_input.pressed(MouseButton::Left) || cursor.position.is_none() {
        gesture.release(&mut cursor);
    }
}
