use bevy::prelude::*;
use enum_map::EnumMap;

use crate::{
    startup::cursor::DeskCursor,
    systems::colors::{CLICKED_BUTTON, HOVERED_BUTTON, LAUNCHER_FILL, PRIMARY_COLOR},
};

use super::{registry::WidgetKind, store::WidgetStore, DeskViewport, WidgetSystem};

pub const LAUNCHER_BAR_HEIGHT: f32 = 36.0;
const BUTTON_WIDTH: f32 = 88.0;
const BUTTON_GAP: f32 = 8.0;
const BAR_MARGIN: f32 = 12.0;
/// The bar floats above every window but below the cursor.
const LAUNCHER_Z: f32 = 900.0;

/* ─────────────────────────  PLUGIN  ───────────────────────── */

/// The launcher owns the single-instance-per-kind policy: toggling a kind
/// closes its open instances when there are any and creates one otherwise.
/// The store itself stays permissive about duplicate kinds; this is a caller
/// contract, and moving it into the store would change observable behavior.
pub struct LauncherPlugin;
impl Plugin for LauncherPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_launcher_bar).add_systems(
            Update,
            (activate_launcher_buttons, keyboard_toggles, style_launcher_buttons)
                .chain()
                .before(WidgetSystem::Input),
        );
    }
}

#[derive(Component)]
struct LauncherBar;

#[derive(Component)]
struct LauncherButton {
    kind: WidgetKind,
    slot: usize,
    label: Entity,
}

/* ─────────────────────────  POLICY  ───────────────────────── */

pub fn toggle_widget(store: &mut WidgetStore, kind: WidgetKind, viewport: Vec2) {
    let open = store.ids_of_kind(kind);
    if open.is_empty() {
        store.create(kind, viewport);
    } else {
        for id in open {
            store.close(&id);
        }
    }
}

/// Page-coordinate hitbox of a launcher button by its slot index.
fn button_rect(index: usize) -> (Vec2, Vec2) {
    let x = BAR_MARGIN + index as f32 * (BUTTON_WIDTH + BUTTON_GAP);
    let y = (LAUNCHER_BAR_HEIGHT - 26.0) * 0.5;
    (Vec2::new(x, y), Vec2::new(BUTTON_WIDTH, 26.0))
}

fn button_under(pointer: Vec2) -> Option<WidgetKind> {
    WidgetKind::ALL.iter().enumerate().find_map(|(index, kind)| {
        let (origin, size) = button_rect(index);
        let inside = pointer.x >= origin.x
            && pointer.x <= origin.x + size.x
            && pointer.y >= origin.y
            && pointer.y <= origin.y + size.y;
        inside.then_some(*kind)
    })
}

/* ─────────────────────────  SYSTEMS  ───────────────────────── */

fn spawn_launcher_bar(mut commands: Commands) {
    commands
        .spawn((
            Name::new("launcher_bar"),
            LauncherBar,
            Sprite {
                color: LAUNCHER_FILL,
                custom_size: Some(Vec2::ZERO),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, LAUNCHER_Z),
        ))
        .with_children(|parent| {
            for (index, kind) in WidgetKind::ALL.iter().enumerate() {
                let mut label = Entity::PLACEHOLDER;
                let mut button = parent.spawn_empty();
                button.with_children(|inner| {
                    label = inner
                        .spawn((
                            Text2d::new(kind.spec().title),
                            TextColor(PRIMARY_COLOR),
                            TextFont {
                                font_size: 13.0,
                                ..default()
                            },
                            Transform::from_xyz(0.0, 0.0, 0.02),
                        ))
                        .id();
                });
                button.insert((
                    LauncherButton {
                        kind: *kind,
                        slot: index,
                        label,
                    },
                    Sprite {
                        color: kind.spec().accent.with_alpha(0.25),
                        custom_size: Some(Vec2::new(BUTTON_WIDTH, 26.0)),
                        ..default()
                    },
                    Transform::from_xyz(
                        // Filled in by style_launcher_buttons once the
                        // viewport is known.
                        BAR_MARGIN + index as f32 * (BUTTON_WIDTH + BUTTON_GAP),
                        0.0,
                        0.01,
                    ),
                ));
            }
        });
}

fn activate_launcher_buttons(
    mouse_input: Res<ButtonInput<MouseButton>>,
    cursor: Res<DeskCursor>,
    viewport: Res<DeskViewport>,
    mut store: ResMut<WidgetStore>,
) {
    if !mouse_input.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(pointer) = cursor.position else {
        return;
    };
    if let Some(kind) = button_under(pointer) {
        toggle_widget(&mut store, kind, viewport.0);
    }
}

fn keyboard_toggles(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    viewport: Res<DeskViewport>,
    mut store: ResMut<WidgetStore>,
) {
    let bindings: [(KeyCode, WidgetKind); 4] = [
        (KeyCode::Digit1, WidgetKind::Music),
        (KeyCode::Digit2, WidgetKind::Video),
        (KeyCode::Digit3, WidgetKind::Pong),
        (KeyCode::Digit4, WidgetKind::Rhythm),
    ];
    for (key, kind) in bindings {
        if keyboard_input.just_pressed(key) {
            toggle_widget(&mut store, kind, viewport.0);
        }
    }
}

/// Keeps the bar glued to the top edge and paints hover/press/open feedback
/// onto the button labels.
fn style_launcher_buttons(
    cursor: Res<DeskCursor>,
    viewport: Res<DeskViewport>,
    mouse_input: Res<ButtonInput<MouseButton>>,
    store: Res<WidgetStore>,
    mut bars: Query<(&mut Sprite, &mut Transform), With<LauncherBar>>,
    mut buttons: Query<(&LauncherButton, &mut Transform), Without<LauncherBar>>,
    mut labels: Query<&mut TextColor>,
) {
    let viewport = viewport.0;
    if let Ok((mut sprite, mut transform)) = bars.single_mut() {
        sprite.custom_size = Some(Vec2::new(viewport.x, LAUNCHER_BAR_HEIGHT));
        transform.translation.x = 0.0;
        transform.translation.y = viewport.y * 0.5 - LAUNCHER_BAR_HEIGHT * 0.5;
    }

    let mut open_kinds: EnumMap<WidgetKind, bool> = EnumMap::default();
    for record in store.iter() {
        open_kinds[record.kind] = true;
    }

    for (button, mut transform) in buttons.iter_mut() {
        let (origin, size) = button_rect(button.slot);
        // Button transforms are local to the bar, whose center is mid-screen.
        transform.translation.x = origin.x + size.x * 0.5 - viewport.x * 0.5;

        let hovered = cursor
            .position
            .is_some_and(|pointer| button_under(pointer) == Some(button.kind));
        let color = if hovered && mouse_input.pressed(MouseButton::Left) {
            CLICKED_BUTTON
        } else if hovered {
            HOVERED_BUTTON
        } else if open_kinds[button.kind] {
            button.kind.spec().accent
        } else {
            PRIMARY_COLOR
        };
        if let Ok(mut label) = labels.get_mut(button.label) {
            if label.0 != color {
                label.0 = color;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::layout::MemoryLayoutStorage;

    const VIEWPORT: Vec2 = Vec2::new(1200.0, 800.0);

    #[test]
    fn toggle_creates_then_closes() {
        let mut store = WidgetStore::new(Box::new(MemoryLayoutStorage::default()));
        toggle_widget(&mut store, WidgetKind::Pong, VIEWPORT);
        assert_eq!(store.ids_of_kind(WidgetKind::Pong).len(), 1);

        toggle_widget(&mut store, WidgetKind::Pong, VIEWPORT);
        assert!(store.ids_of_kind(WidgetKind::Pong).is_empty());
    }

    #[test]
    fn toggle_closes_every_instance_of_the_kind() {
        // The store happily holds duplicates; the policy sweeps them all.
        let mut store = WidgetStore::new(Box::new(MemoryLayoutStorage::default()));
        store.create(WidgetKind::Pong, VIEWPORT);
        store.create(WidgetKind::Pong, VIEWPORT);
        let other = store.create(WidgetKind::Music, VIEWPORT);

        toggle_widget(&mut store, WidgetKind::Pong, VIEWPORT);
        assert!(store.ids_of_kind(WidgetKind::Pong).is_empty());
        assert!(store.get(&other).is_some());
    }

    #[test]
    fn button_rects_line_up_left_to_right() {
        let (first, _) = button_rect(0);
        let (second, _) = button_rect(1);
        assert!(second.x > first.x);
        assert_eq!(second.x - first.x, BUTTON_WIDTH + BUTTON_GAP);
    }
}
