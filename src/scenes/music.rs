use bevy::{prelude::*, sprite::Anchor};

use crate::systems::{
    colors::{DIM_COLOR, MUSIC_ACCENT, PRIMARY_COLOR},
    widgets::{
        content::{
            claim_slots, ContentExtent, ContentMounted, ContentPlaceholder, ContentSlot,
            ContentState,
        },
        registry::WidgetKind,
    },
};

const TRACKS: [(&str, f32); 3] = [
    ("side a / daybreak", 184.0),
    ("side a / undertow", 221.0),
    ("side b / afterglow", 197.0),
];
const BAR_HEIGHT: f32 = 6.0;

pub struct MusicScenePlugin;
impl Plugin for MusicScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (mount, advance_playback).chain());
    }
}

#[derive(Component)]
struct MusicPlayer {
    track: usize,
    elapsed: f32,
}

#[derive(Component)]
struct TrackTitle;

#[derive(Component)]
struct ProgressTrack;

#[derive(Component)]
struct ProgressFill;

fn mount(
    mut commands: Commands,
    slots: Query<(Entity, &ContentSlot), Without<ContentMounted>>,
    placeholders: Query<(Entity, &ChildOf), With<ContentPlaceholder>>,
) {
    claim_slots(
        &mut commands,
        &slots,
        &placeholders,
        WidgetKind::Music,
        |parent| {
            parent
                .spawn((
                    MusicPlayer {
                        track: 0,
                        elapsed: 0.0,
                    },
                    Transform::default(),
                    Visibility::default(),
                ))
                .with_children(|player| {
                    player.spawn((
                        TrackTitle,
                        Text2d::new(TRACKS[0].0),
                        TextColor(PRIMARY_COLOR),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        Transform::from_xyz(0.0, 16.0, 0.01),
                    ));
                    player.spawn((
                        ProgressTrack,
                        Sprite {
                            color: DIM_COLOR,
                            custom_size: Some(Vec2::new(0.0, BAR_HEIGHT)),
                            ..default()
                        },
                        Transform::from_xyz(0.0, -10.0, 0.01),
                    ));
                    player.spawn((
                        ProgressFill,
                        Sprite {
                            color: MUSIC_ACCENT,
                            custom_size: Some(Vec2::new(0.0, BAR_HEIGHT)),
                            anchor: Anchor::CenterLeft,
                            ..default()
                        },
                        Transform::from_xyz(0.0, -10.0, 0.02),
                    ));
                });
        },
    );
}

/// Simulated playback: progress advances in real time (even while minimized,
/// like any music player) and rolls over to the next track.
fn advance_playback(
    time: Res<Time>,
    slots: Query<(&ContentState, &ContentExtent)>,
    mut players: Query<(&mut MusicPlayer, &ChildOf, &Children)>,
    mut titles: Query<&mut Text2d, With<TrackTitle>>,
    mut tracks: Query<(&mut Sprite, &mut Transform), (With<ProgressTrack>, Without<ProgressFill>)>,
    mut fills: Query<(&mut Sprite, &mut Transform), (With<ProgressFill>, Without<ProgressTrack>)>,
) {
    for (mut player, child_of, children) in players.iter_mut() {
        let Ok((_, extent)) = slots.get(child_of.parent()) else {
            continue;
        };

        let (_, duration) = TRACKS[player.track];
        player.elapsed += time.delta_secs();
        if player.elapsed >= duration {
            player.elapsed = 0.0;
            player.track = (player.track + 1) % TRACKS.len();
            for child in children.iter() {
                if let Ok(mut title) = titles.get_mut(child) {
                    title.0 = TRACKS[player.track].0.to_string();
                }
            }
        }

        let bar_width = (extent.0.x - 48.0).max(0.0);
        let fraction = (player.elapsed / duration).clamp(0.0, 1.0);
        for child in children.iter() {
            if let Ok((mut sprite, mut transform)) = tracks.get_mut(child) {
                sprite.custom_size = Some(Vec2::new(bar_width, BAR_HEIGHT));
                transform.translation.x = 0.0;
            }
            if let Ok((mut sprite, mut transform)) = fills.get_mut(child) {
                sprite.custom_size = Some(Vec2::new(bar_width * fraction, BAR_HEIGHT));
                transform.translation.x = -bar_width * 0.5;
            }
        }
    }
}
