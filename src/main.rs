use bevy::prelude::*;

mod data;
mod scenes;
mod startup;
mod systems;

use scenes::{
    music::MusicScenePlugin, pong::PongScenePlugin, rhythm::RhythmScenePlugin,
    video::VideoScenePlugin,
};
use startup::StartupPlugin;
use systems::widgets::{launcher::LauncherPlugin, WidgetsPlugin};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "widget desk".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(StartupPlugin)
        .add_plugins(WidgetsPlugin)
        .add_plugins(LauncherPlugin)
        .add_plugins((
            MusicScenePlugin,
            VideoScenePlugin,
            PongScenePlugin,
            RhythmScenePlugin,
        ))
        .run();
}
