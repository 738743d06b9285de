use std::f32::consts::FRAC_PI_4;

use bevy::{prelude::*, sprite::Anchor};

use crate::{
    startup::cursor::DeskCursor,
    systems::colors::{BODY_FILL, CHROME_FILL, DIM_COLOR, PRIMARY_COLOR},
};

use super::{
    content::{ContentExtent, ContentPlaceholder, ContentSlot, ContentState},
    resize::HANDLE_REACH,
    store::{WidgetId, WidgetRecord, WidgetStore},
    DeskViewport,
};

/// Spacing between stacked windows on the render z axis; chrome children use
/// small offsets inside one step.
const WINDOW_Z_STEP: f32 = 10.0;
const WINDOW_BASE_Z: f32 = 10.0;
/// Extra reach around a button glyph so the hitbox never shrinks to a sliver.
const BUTTON_HIT_PAD: f32 = 2.0;
const TITLE_PADDING: f32 = 14.0;

/* ─────────────────────────  HIT TESTS (page coords)  ───────────────────────── */

/// The topmost window whose frame (padded by the resize handle reach) is
/// under the pointer. All pointer routing starts here so a window can never
/// be grabbed through another one stacked above it.
pub fn topmost_surface_hit(store: &WidgetStore, pointer: Vec2) -> Option<&WidgetRecord> {
    store
        .iter()
        .filter(|record| surface_contains(record, pointer))
        .max_by_key(|record| record.z_index)
}

pub fn surface_contains(record: &WidgetRecord, pointer: Vec2) -> bool {
    let min = record.position - Vec2::splat(HANDLE_REACH);
    let max = record.position + record.display_size() + Vec2::splat(HANDLE_REACH);
    pointer.x >= min.x && pointer.x <= max.x && pointer.y >= min.y && pointer.y <= max.y
}

/// The draggable part of the header band: the title strip minus the buttons.
/// Neither the buttons nor the content body may initiate a drag.
pub fn header_contains(record: &WidgetRecord, pointer: Vec2) -> bool {
    let chrome_height = record.kind.spec().chrome_height;
    let display = record.display_size();
    let within_band = pointer.x >= record.position.x
        && pointer.x <= record.position.x + display.x
        && pointer.y >= record.position.y
        && pointer.y <= record.position.y + chrome_height;
    within_band
        && !rect_contains(close_button_rect(record), pointer)
        && !rect_contains(minimize_button_rect(record), pointer)
}

/// Close sits in the rightmost header square, minimize just left of it, both
/// sized by the chrome height like the header itself.
pub fn close_button_rect(record: &WidgetRecord) -> (Vec2, Vec2) {
    let chrome_height = record.kind.spec().chrome_height;
    let display = record.display_size();
    let origin = Vec2::new(
        record.position.x + display.x - chrome_height,
        record.position.y,
    );
    pad_rect(origin, Vec2::splat(chrome_height), BUTTON_HIT_PAD)
}

pub fn minimize_button_rect(record: &WidgetRecord) -> (Vec2, Vec2) {
    let chrome_height = record.kind.spec().chrome_height;
    let display = record.display_size();
    let origin = Vec2::new(
        record.position.x + display.x - 2.0 * chrome_height,
        record.position.y,
    );
    pad_rect(origin, Vec2::splat(chrome_height), BUTTON_HIT_PAD)
}

fn pad_rect(origin: Vec2, size: Vec2, pad: f32) -> (Vec2, Vec2) {
    (origin - Vec2::splat(pad), size + Vec2::splat(2.0 * pad))
}

fn rect_contains((origin, size): (Vec2, Vec2), pointer: Vec2) -> bool {
    pointer.x >= origin.x
        && pointer.x <= origin.x + size.x
        && pointer.y >= origin.y
        && pointer.y <= origin.y + size.y
}

/* ─────────────────────────  PAGE → WORLD  ───────────────────────── */

/// Maps a window's page-coordinate top-left (y down) to the world transform
/// of its center (y up, origin mid-viewport).
pub fn page_rect_to_world(position: Vec2, display: Vec2, viewport: Vec2, z: f32) -> Vec3 {
    Vec3::new(
        position.x + display.x * 0.5 - viewport.x * 0.5,
        viewport.y * 0.5 - (position.y + display.y * 0.5),
        z,
    )
}

/* ─────────────────────────  ENTITIES  ───────────────────────── */

#[derive(Component)]
pub struct WidgetWindow {
    pub id: WidgetId,
}

/// Direct handles to a window's chrome children, captured at spawn so the
/// per-frame geometry sync never walks the hierarchy.
#[derive(Component)]
pub struct ChromeParts {
    header: Entity,
    title: Entity,
    close_icon: Entity,
    minimize_icon: Entity,
    body: Entity,
    slot: Entity,
    border: [Entity; 4],
}

/* ─────────────────────────  SYSTEMS  ───────────────────────── */

/// Raises whichever window is clicked; the store skips the renumbering when
/// it is already on top.
pub fn raise_on_pointer_down(
    mouse_input: Res<ButtonInput<MouseButton>>,
    cursor: Res<DeskCursor>,
    mut store: ResMut<WidgetStore>,
) {
    if !mouse_input.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(pointer) = cursor.position else {
        return;
    };
    let Some(id) = topmost_surface_hit(&store, pointer).map(|record| record.id.clone()) else {
        return;
    };
    store.bring_to_front(&id);
}

/// Close and minimize/restore buttons. Runs before the gesture systems so a
/// button press never doubles as a drag or resize start.
pub fn activate_buttons(
    mouse_input: Res<ButtonInput<MouseButton>>,
    cursor: Res<DeskCursor>,
    mut store: ResMut<WidgetStore>,
) {
    if !mouse_input.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(pointer) = cursor.position else {
        return;
    };
    let Some(record) = topmost_surface_hit(&store, pointer) else {
        return;
    };
    let id = record.id.clone();
    let minimized = record.minimized;
    let close_rect = close_button_rect(record);
    let minimize_rect = minimize_button_rect(record);

    if rect_contains(close_rect, pointer) {
        store.close(&id);
    } else if rect_contains(minimize_rect, pointer) {
        if minimized {
            store.restore(&id);
        } else {
            store.minimize(&id);
        }
    }
}

/// Reconciles store records with window entities: spawns chrome for new
/// records and despawns windows whose record is gone.
pub fn sync_windows(
    mut commands: Commands,
    store: Res<WidgetStore>,
    windows: Query<(Entity, &WidgetWindow)>,
) {
    for (entity, window) in windows.iter() {
        if store.get(&window.id).is_none() {
            commands.entity(entity).despawn();
        }
    }

    for record in store.iter() {
        let already_spawned = windows.iter().any(|(_, window)| window.id == record.id);
        if !already_spawned {
            spawn_window(&mut commands, record);
        }
    }
}

fn spawn_window(commands: &mut Commands, record: &WidgetRecord) {
    let spec = record.kind.spec();
    let accent = spec.accent;
    let icon_reach = spec.chrome_height * 0.3;

    let mut header = Entity::PLACEHOLDER;
    let mut title = Entity::PLACEHOLDER;
    let mut close_icon = Entity::PLACEHOLDER;
    let mut minimize_icon = Entity::PLACEHOLDER;
    let mut body = Entity::PLACEHOLDER;
    let mut slot = Entity::PLACEHOLDER;
    let mut border = [Entity::PLACEHOLDER; 4];

    let root = commands
        .spawn((
            Name::new(format!("widget_window_{}", record.id)),
            WidgetWindow {
                id: record.id.clone(),
            },
            Transform::default(),
            Visibility::default(),
        ))
        .with_children(|parent| {
            header = parent
                .spawn((
                    Sprite {
                        color: CHROME_FILL,
                        custom_size: Some(Vec2::ZERO),
                        ..default()
                    },
                    Transform::from_xyz(0.0, 0.0, 0.04),
                ))
                .id();

            title = parent
                .spawn((
                    Text2d::new(spec.title),
                    TextColor(PRIMARY_COLOR),
                    TextFont {
                        font_size: 13.0,
                        ..default()
                    },
                    Anchor::CenterLeft,
                    Transform::from_xyz(0.0, 0.0, 0.06),
                ))
                .id();

            close_icon = parent
                .spawn((
                    Transform {
                        rotation: Quat::from_rotation_z(FRAC_PI_4),
                        ..default()
                    },
                    Visibility::default(),
                ))
                .with_children(|icon| {
                    for bar in [
                        Vec2::new(icon_reach * 2.0, 2.0),
                        Vec2::new(2.0, icon_reach * 2.0),
                    ] {
                        icon.spawn((
                            Sprite {
                                color: accent,
                                custom_size: Some(bar),
                                ..default()
                            },
                            Transform::from_xyz(0.0, 0.0, 0.01),
                        ));
                    }
                })
                .id();

            minimize_icon = parent
                .spawn((
                    Sprite {
                        color: accent,
                        custom_size: Some(Vec2::new(icon_reach * 2.0, 2.0)),
                        ..default()
                    },
                    Transform::default(),
                ))
                .id();

            body = parent
                .spawn((
                    Sprite {
                        color: BODY_FILL,
                        custom_size: Some(Vec2::ZERO),
                        ..default()
                    },
                    Transform::from_xyz(0.0, 0.0, 0.02),
                ))
                .id();

            slot = parent
                .spawn((
                    ContentSlot {
                        id: record.id.clone(),
                        kind: record.kind,
                    },
                    ContentState::default(),
                    ContentExtent(Vec2::ZERO),
                    Transform::from_xyz(0.0, 0.0, 0.03),
                    Visibility::default(),
                ))
                .with_children(|content| {
                    content.spawn((
                        ContentPlaceholder,
                        Text2d::new("loading…"),
                        TextColor(DIM_COLOR),
                        TextFont {
                            font_size: 12.0,
                            ..default()
                        },
                        Transform::from_xyz(0.0, 0.0, 0.01),
                    ));
                })
                .id();

            for slot_index in 0..4 {
                border[slot_index] = parent
                    .spawn((
                        Sprite {
                            color: accent,
                            custom_size: Some(Vec2::ZERO),
                            ..default()
                        },
                        Transform::from_xyz(0.0, 0.0, 0.05),
                    ))
                    .id();
            }
        })
        .id();

    commands.entity(root).insert(ChromeParts {
        header,
        title,
        close_icon,
        minimize_icon,
        body,
        slot,
        border,
    });
}

/// Pushes record geometry into the spawned chrome every frame: root world
/// transform (stacking rank on z), header/body/border sprite sizes, button
/// and title placement, and the content slot's extent and visibility.
pub fn sync_geometry(
    store: Res<WidgetStore>,
    viewport: Res<DeskViewport>,
    roots: Query<(Entity, &WidgetWindow, &ChromeParts)>,
    mut transforms: Query<&mut Transform>,
    mut sprites: Query<&mut Sprite>,
    mut visibilities: Query<&mut Visibility>,
    mut extents: Query<&mut ContentExtent>,
) {
    // Render depth follows stacking rank, not the raw counter, so z stays
    // bounded however long the session runs.
    let mut ranked: Vec<&WidgetRecord> = store.iter().collect();
    ranked.sort_by_key(|record| record.z_index);

    for (rank, record) in ranked.iter().enumerate() {
        let Some((root, _, parts)) = roots.iter().find(|(_, window, _)| window.id == record.id)
        else {
            // Spawn happens later this frame; geometry lands next frame.
            continue;
        };

        let spec = record.kind.spec();
        let display = record.display_size();
        let half = display * 0.5;
        let chrome_height = spec.chrome_height;
        let body_height = (display.y - chrome_height).max(0.0);

        if let Ok(mut transform) = transforms.get_mut(root) {
            transform.translation = page_rect_to_world(
                record.position,
                display,
                viewport.0,
                WINDOW_BASE_Z + rank as f32 * WINDOW_Z_STEP,
            );
        }

        if let Ok(mut sprite) = sprites.get_mut(parts.header) {
            sprite.custom_size = Some(Vec2::new(display.x, chrome_height));
        }
        if let Ok(mut transform) = transforms.get_mut(parts.header) {
            transform.translation.x = 0.0;
            transform.translation.y = half.y - chrome_height * 0.5;
        }

        if let Ok(mut transform) = transforms.get_mut(parts.title) {
            transform.translation.x = -half.x + TITLE_PADDING;
            transform.translation.y = half.y - chrome_height * 0.5;
        }

        if let Ok(mut transform) = transforms.get_mut(parts.close_icon) {
            transform.translation.x = half.x - chrome_height * 0.5;
            transform.translation.y = half.y - chrome_height * 0.5;
            transform.translation.z = 0.06;
        }
        if let Ok(mut transform) = transforms.get_mut(parts.minimize_icon) {
            transform.translation.x = half.x - chrome_height * 1.5;
            transform.translation.y = half.y - chrome_height * 0.5;
            transform.translation.z = 0.06;
        }

        if let Ok(mut sprite) = sprites.get_mut(parts.body) {
            sprite.custom_size = Some(Vec2::new(display.x, body_height));
        }
        if let Ok(mut transform) = transforms.get_mut(parts.body) {
            transform.translation.y = -chrome_height * 0.5;
        }

        let body_visible = body_height >= 1.0;
        if let Ok(mut visibility) = visibilities.get_mut(parts.slot) {
            *visibility = if body_visible {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
        if let Ok(mut transform) = transforms.get_mut(parts.slot) {
            transform.translation.y = -chrome_height * 0.5;
        }
        if let Ok(mut extent) = extents.get_mut(parts.slot) {
            let inner = Vec2::new(
                (display.x - 2.0 * spec.border_thickness).max(0.0),
                (body_height - spec.border_thickness).max(0.0),
            );
            if extent.0 != inner {
                extent.0 = inner;
            }
        }

        for (bar, (bar_size, bar_offset)) in parts
            .border
            .iter()
            .zip(border_bar_layout(display, spec.border_thickness))
        {
            if let Ok(mut sprite) = sprites.get_mut(*bar) {
                sprite.custom_size = Some(bar_size);
            }
            if let Ok(mut transform) = transforms.get_mut(*bar) {
                transform.translation.x = bar_offset.x;
                transform.translation.y = bar_offset.y;
            }
        }
    }
}

/// Four thin bars hugging the window frame, in local (center-origin) coords.
fn border_bar_layout(display: Vec2, thickness: f32) -> [(Vec2, Vec2); 4] {
    let half = display * 0.5;
    [
        (Vec2::new(display.x, thickness), Vec2::new(0.0, half.y)),
        (Vec2::new(display.x, thickness), Vec2::new(0.0, -half.y)),
        (Vec2::new(thickness, display.y), Vec2::new(-half.x, 0.0)),
        (Vec2::new(thickness, display.y), Vec2::new(half.x, 0.0)),
    ]
}
