use bevy::prelude::*;
use rand::Rng;

use crate::systems::{
    colors::PRIMARY_COLOR,
    widgets::{
        content::{
            claim_slots, ContentExtent, ContentMounted, ContentPlaceholder, ContentSlot,
            ContentState,
        },
        registry::WidgetKind,
    },
};

const BALL_SIZE: f32 = 10.0;
const PADDLE_SIZE: Vec2 = Vec2::new(10.0, 70.0);
const BALL_SPEED: f32 = 220.0;
const PADDLE_TRACK_SPEED: f32 = 160.0;
const FIELD_MARGIN: f32 = 18.0;

pub struct PongScenePlugin;
impl Plugin for PongScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (mount, simulate).chain());
    }
}

#[derive(Component)]
struct PongField {
    ball_velocity: Vec2,
}

#[derive(Component)]
struct PongBall;

#[derive(Component)]
struct PongPaddle {
    side: f32,
}

fn mount(
    mut commands: Commands,
    slots: Query<(Entity, &ContentSlot), Without<ContentMounted>>,
    placeholders: Query<(Entity, &ChildOf), With<ContentPlaceholder>>,
) {
    let mut rng = rand::rng();
    claim_slots(
        &mut commands,
        &slots,
        &placeholders,
        WidgetKind::Pong,
        |parent| {
            let serve_angle: f32 = rng.random_range(-0.6..0.6);
            let serve_side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            parent
                .spawn((
                    PongField {
                        ball_velocity: Vec2::new(
                            serve_side * serve_angle.cos(),
                            serve_angle.sin(),
                        ) * BALL_SPEED,
                    },
                    Transform::default(),
                    Visibility::default(),
                ))
                .with_children(|field| {
                    field.spawn((
                        PongBall,
                        Sprite {
                            color: PRIMARY_COLOR,
                            custom_size: Some(Vec2::splat(BALL_SIZE)),
                            ..default()
                        },
                        Transform::default(),
                    ));
                    for side in [-1.0, 1.0] {
                        field.spawn((
                            PongPaddle { side },
                            Sprite {
                                color: PRIMARY_COLOR,
                                custom_size: Some(PADDLE_SIZE),
                                ..default()
                            },
                            Transform::default(),
                        ));
                    }
                });
        },
    );
}

/// Endless demo rally: the ball bounces inside the slot extent and both
/// paddles chase it. Everything is measured against the live container box,
/// so resizing the window reshapes the field on the fly.
fn simulate(
    time: Res<Time>,
    slots: Query<(&ContentState, &ContentExtent)>,
    mut fields: Query<(&mut PongField, &ChildOf, &Children)>,
    mut balls: Query<&mut Transform, (With<PongBall>, Without<PongPaddle>)>,
    mut paddles: Query<(&PongPaddle, &mut Transform), Without<PongBall>>,
) {
    for (mut field, child_of, children) in fields.iter_mut() {
        let Ok((state, extent)) = slots.get(child_of.parent()) else {
            continue;
        };
        if state.minimized || extent.0.x < FIELD_MARGIN * 2.0 || extent.0.y < FIELD_MARGIN * 2.0 {
            continue;
        }
        let half = extent.0 * 0.5 - Vec2::splat(FIELD_MARGIN);

        let mut ball_y = 0.0;
        for child in children.iter() {
            if let Ok(mut transform) = balls.get_mut(child) {
                let mut next = transform.translation.truncate()
                    + field.ball_velocity * time.delta_secs();
                if next.x.abs() > half.x {
                    field.ball_velocity.x = -field.ball_velocity.x;
                    next.x = next.x.clamp(-half.x, half.x);
                }
                if next.y.abs() > half.y {
                    field.ball_velocity.y = -field.ball_velocity.y;
                    next.y = next.y.clamp(-half.y, half.y);
                }
                transform.translation.x = next.x;
                transform.translation.y = next.y;
                ball_y = next.y;
            }
        }

        for child in children.iter() {
            if let Ok((paddle, mut transform)) = paddles.get_mut(child) {
                transform.translation.x = paddle.side * half.x;
                let step = PADDLE_TRACK_SPEED * time.delta_secs();
                let gap = ball_y - transform.translation.y;
                transform.translation.y += gap.clamp(-step, step);
                let paddle_limit = (half.y - PADDLE_SIZE.y * 0.5).max(0.0);
                transform.translation.y =
                    transform.translation.y.clamp(-paddle_limit, paddle_limit);
            }
        }
    }
}
