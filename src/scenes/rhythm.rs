use bevy::prelude::*;
use rand::Rng;

use crate::systems::{
    colors::{DIM_COLOR, RHYTHM_ACCENT},
    widgets::{
        content::{
            claim_slots, ContentExtent, ContentMounted, ContentPlaceholder, ContentSlot,
            ContentState,
        },
        registry::WidgetKind,
    },
};

const LANE_COUNT: usize = 4;
const NOTE_SIZE: Vec2 = Vec2::new(26.0, 10.0);
const FALL_SPEED: f32 = 140.0;
const BEAT_SECONDS: f32 = 0.45;

pub struct RhythmScenePlugin;
impl Plugin for RhythmScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (mount, pulse).chain());
    }
}

#[derive(Component)]
struct RhythmStage {
    beat: Timer,
}

#[derive(Component)]
struct HitLine;

#[derive(Component)]
struct FallingNote;

fn mount(
    mut commands: Commands,
    slots: Query<(Entity, &ContentSlot), Without<ContentMounted>>,
    placeholders: Query<(Entity, &ChildOf), With<ContentPlaceholder>>,
) {
    claim_slots(
        &mut commands,
        &slots,
        &placeholders,
        WidgetKind::Rhythm,
        |parent| {
            parent
                .spawn((
                    RhythmStage {
                        beat: Timer::from_seconds(BEAT_SECONDS, TimerMode::Repeating),
                    },
                    Transform::default(),
                    Visibility::default(),
                ))
                .with_children(|stage| {
                    stage.spawn((
                        HitLine,
                        Sprite {
                            color: DIM_COLOR,
                            custom_size: Some(Vec2::new(0.0, 3.0)),
                            ..default()
                        },
                        Transform::from_xyz(0.0, 0.0, 0.01),
                    ));
                });
        },
    );
}

/// Spawns a note on every beat in a random lane and marches the existing
/// notes toward the hit line at the bottom of the container. Minimizing the
/// window pauses the whole stage.
fn pulse(
    mut commands: Commands,
    time: Res<Time>,
    slots: Query<(&ContentState, &ContentExtent)>,
    mut stages: Query<(Entity, &mut RhythmStage, &ChildOf, &Children)>,
    mut hit_lines: Query<(&mut Sprite, &mut Transform), (With<HitLine>, Without<FallingNote>)>,
    mut notes: Query<&mut Transform, With<FallingNote>>,
) {
    let mut rng = rand::rng();
    for (stage_entity, mut stage, child_of, children) in stages.iter_mut() {
        let Ok((state, extent)) = slots.get(child_of.parent()) else {
            continue;
        };
        if state.minimized || extent.0.y < 40.0 {
            continue;
        }
        let half = extent.0 * 0.5;
        let hit_y = -half.y + 16.0;

        for child in children.iter() {
            if let Ok((mut sprite, mut transform)) = hit_lines.get_mut(child) {
                sprite.custom_size = Some(Vec2::new((extent.0.x - 24.0).max(0.0), 3.0));
                transform.translation.y = hit_y;
            }
        }

        stage.beat.tick(time.delta());
        if stage.beat.just_finished() {
            let lane = rng.random_range(0..LANE_COUNT);
            let lane_width = extent.0.x / LANE_COUNT as f32;
            let lane_x = -half.x + lane_width * (lane as f32 + 0.5);
            commands.entity(stage_entity).with_children(|stage| {
                stage.spawn((
                    FallingNote,
                    Sprite {
                        color: RHYTHM_ACCENT,
                        custom_size: Some(NOTE_SIZE),
                        ..default()
                    },
                    Transform::from_xyz(lane_x, half.y - NOTE_SIZE.y, 0.02),
                ));
            });
        }

        for child in children.iter() {
            if let Ok(mut transform) = notes.get_mut(child) {
                transform.translation.y -= FALL_SPEED * time.delta_secs();
                if transform.translation.y < hit_y {
                    commands.entity(child).despawn();
                }
            }
        }
    }
}
