use bevy::prelude::*;

pub const PRIMARY_COLOR: Color = Color::Srgba(Srgba::new(0.92, 0.92, 0.92, 1.0));
pub const DIM_COLOR: Color = Color::Srgba(Srgba::new(0.92, 0.92, 0.92, 0.45));
pub const HOVERED_BUTTON: Color = Color::srgb(0.0, 0.9, 0.9);
pub const CLICKED_BUTTON: Color = Color::srgb(0.9, 0.9, 0.0);

pub const CHROME_FILL: Color = Color::Srgba(Srgba::new(0.13, 0.13, 0.16, 1.0));
pub const BODY_FILL: Color = Color::Srgba(Srgba::new(0.05, 0.05, 0.07, 0.92));
pub const LAUNCHER_FILL: Color = Color::Srgba(Srgba::new(0.09, 0.09, 0.11, 1.0));

pub const MUSIC_ACCENT: Color = Color::srgb(0.35, 0.8, 0.45);
pub const VIDEO_ACCENT: Color = Color::srgb(0.85, 0.3, 0.3);
pub const PONG_ACCENT: Color = Color::srgb(0.3, 0.55, 0.9);
pub const RHYTHM_ACCENT: Color = Color::srgb(0.8, 0.45, 0.85);
