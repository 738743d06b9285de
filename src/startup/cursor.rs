use bevy::{
    prelude::*,
    window::{PrimaryWindow, SystemCursorIcon},
    winit::cursor::CursorIcon,
};

pub struct CursorPlugin;
impl Plugin for CursorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DeskCursor>()
            .add_systems(Update, DeskCursor::update_position)
            .add_systems(
                Update,
                DeskCursor::update_icon.run_if(resource_changed::<DeskCursor>),
            );
    }
}

/// Shape the pointer should take. Gestures switch this while they are active;
/// the gesture teardown path restores `Default` unconditionally, so the
/// pointer can never stay stuck in a grab or resize shape after an abrupt
/// gesture end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    #[default]
    Default,
    Grabbing,
    ResizeEw,
    ResizeNs,
    ResizeNesw,
    ResizeNwse,
}

impl CursorMode {
    fn icon(self) -> SystemCursorIcon {
        match self {
            Self::Default => SystemCursorIcon::Default,
            Self::Grabbing => SystemCursorIcon::Grabbing,
            Self::ResizeEw => SystemCursorIcon::EwResize,
            Self::ResizeNs => SystemCursorIcon::NsResize,
            Self::ResizeNesw => SystemCursorIcon::NeswResize,
            Self::ResizeNwse => SystemCursorIcon::NwseResize,
        }
    }
}

/// The pointer in page coordinates: origin at the window's top-left, y
/// growing downward. Widget records live in the same space, so gesture math
/// needs no conversion. `None` while the pointer is outside the window.
#[derive(Resource, Default)]
pub struct DeskCursor {
    pub position: Option<Vec2>,
    pub mode: CursorMode,
}

impl DeskCursor {
    fn update_position(
        windows: Query<&Window, With<PrimaryWindow>>,
        mut cursor: ResMut<DeskCursor>,
    ) {
        let position = windows
            .single()
            .ok()
            .and_then(|window| window.cursor_position());
        if cursor.position != position {
            cursor.position = position;
        }
    }

    fn update_icon(
        mut commands: Commands,
        cursor: Res<DeskCursor>,
        windows: Query<Entity, With<PrimaryWindow>>,
    ) {
        if let Ok(window) = windows.single() {
            commands
                .entity(window)
                .insert(CursorIcon::from(cursor.mode.icon()));
        }
    }
}
