use bevy::{prelude::*, sprite::Anchor};

use crate::systems::{
    colors::{PRIMARY_COLOR, VIDEO_ACCENT},
    widgets::{
        content::{
            claim_slots, ContentExtent, ContentMounted, ContentPlaceholder, ContentSlot,
            ContentState,
        },
        registry::WidgetKind,
    },
};

const LETTERBOX: f32 = 0.82;

pub struct VideoScenePlugin;
impl Plugin for VideoScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (mount, layout_frame).chain());
    }
}

#[derive(Component)]
struct VideoPanel {
    throb: Timer,
}

#[derive(Component)]
struct VideoFrame;

#[derive(Component)]
struct PlayGlyph;

fn mount(
    mut commands: Commands,
    slots: Query<(Entity, &ContentSlot), Without<ContentMounted>>,
    placeholders: Query<(Entity, &ChildOf), With<ContentPlaceholder>>,
) {
    claim_slots(
        &mut commands,
        &slots,
        &placeholders,
        WidgetKind::Video,
        |parent| {
            parent
                .spawn((
                    VideoPanel {
                        throb: Timer::from_seconds(1.6, TimerMode::Repeating),
                    },
                    Transform::default(),
                    Visibility::default(),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        VideoFrame,
                        Sprite {
                            color: Color::BLACK,
                            custom_size: Some(Vec2::ZERO),
                            ..default()
                        },
                        Transform::from_xyz(0.0, 0.0, 0.01),
                    ));
                    panel.spawn((
                        PlayGlyph,
                        Text2d::new("▶"),
                        TextColor(VIDEO_ACCENT),
                        TextFont {
                            font_size: 34.0,
                            ..default()
                        },
                        Transform::from_xyz(0.0, 0.0, 0.02),
                    ));
                    panel.spawn((
                        Text2d::new("showreel 02:41"),
                        TextColor(PRIMARY_COLOR),
                        TextFont {
                            font_size: 12.0,
                            ..default()
                        },
                        Anchor::BottomLeft,
                        Transform::from_xyz(0.0, 0.0, 0.02),
                    ));
                });
        },
    );
}

/// Letterboxes the frame inside the container and throbs the play glyph.
/// Embedded playback is out of scope; the panel is a poster frame.
fn layout_frame(
    time: Res<Time>,
    slots: Query<(&ContentState, &ContentExtent)>,
    mut panels: Query<(&mut VideoPanel, &ChildOf, &Children)>,
    mut frames: Query<&mut Sprite, With<VideoFrame>>,
    mut glyphs: Query<&mut TextColor, With<PlayGlyph>>,
) {
    for (mut panel, child_of, children) in panels.iter_mut() {
        let Ok((state, extent)) = slots.get(child_of.parent()) else {
            continue;
        };
        if state.minimized {
            continue;
        }
        panel.throb.tick(time.delta());
        let phase = panel.throb.fraction();
        let glow = 0.55 + 0.45 * (phase * std::f32::consts::TAU).sin().abs();

        for child in children.iter() {
            if let Ok(mut sprite) = frames.get_mut(child) {
                sprite.custom_size = Some(extent.0 * LETTERBOX);
            }
            if let Ok(mut color) = glyphs.get_mut(child) {
                color.0 = VIDEO_ACCENT.with_alpha(glow);
            }
        }
    }
}
