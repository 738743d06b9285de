use bevy::prelude::*;
use enum_map::{enum_map, Enum, EnumMap};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::systems::colors::{MUSIC_ACCENT, PONG_ACCENT, RHYTHM_ACCENT, VIDEO_ACCENT};

/* ─────────────────────────  KINDS  ───────────────────────── */

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Music,
    Video,
    Pong,
    Rhythm,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 4] = [
        WidgetKind::Music,
        WidgetKind::Video,
        WidgetKind::Pong,
        WidgetKind::Rhythm,
    ];

    /// Stable lowercase tag, used as the id prefix and the persisted kind tag.
    pub fn key(self) -> &'static str {
        match self {
            WidgetKind::Music => "music",
            WidgetKind::Video => "video",
            WidgetKind::Pong => "pong",
            WidgetKind::Rhythm => "rhythm",
        }
    }

    pub fn spec(self) -> &'static KindSpec {
        &KIND_CATALOG[self]
    }
}

/* ─────────────────────────  PER-KIND METADATA  ───────────────────────── */

/// Static geometry metadata for one widget kind. The drag/resize controllers
/// consult this generically; nothing in the manager branches on a kind name.
pub struct KindSpec {
    pub title: &'static str,
    pub default_size: Vec2,
    /// Compact footprint used while minimized. Kinds without one collapse to
    /// their header bar.
    pub minimized_size: Option<Vec2>,
    /// Content-area width:height ratio preserved under resize.
    pub aspect_ratio: Option<f32>,
    /// Fixed header height; together with `border_thickness` this defines the
    /// content area the aspect lock applies to.
    pub chrome_height: f32,
    pub border_thickness: f32,
    pub accent: Color,
}

impl KindSpec {
    /// The footprint the window occupies on the page right now.
    pub fn display_size(&self, size: Vec2, minimized: bool) -> Vec2 {
        if minimized {
            self.minimized_size
                .unwrap_or(Vec2::new(size.x, self.chrome_height))
        } else {
            size
        }
    }

    /// Total window height whose content area matches `ratio` at `width`.
    pub fn height_for_width(&self, width: f32, ratio: f32) -> f32 {
        let content_width = width - self.border_thickness;
        content_width / ratio + self.chrome_height + self.border_thickness
    }

    /// Total window width whose content area matches `ratio` at `height`.
    pub fn width_for_height(&self, height: f32, ratio: f32) -> f32 {
        let content_height = height - self.chrome_height - self.border_thickness;
        content_height * ratio + self.border_thickness
    }
}

static KIND_CATALOG: Lazy<EnumMap<WidgetKind, KindSpec>> = Lazy::new(|| {
    enum_map! {
        WidgetKind::Music => KindSpec {
            title: "music",
            default_size: Vec2::new(550.0, 450.0),
            minimized_size: Some(Vec2::new(320.0, 80.0)),
            aspect_ratio: None,
            chrome_height: 40.0,
            border_thickness: 2.0,
            accent: MUSIC_ACCENT,
        },
        WidgetKind::Video => KindSpec {
            title: "video",
            default_size: Vec2::new(642.0, 402.0),
            minimized_size: None,
            aspect_ratio: Some(16.0 / 9.0),
            chrome_height: 40.0,
            border_thickness: 2.0,
            accent: VIDEO_ACCENT,
        },
        WidgetKind::Pong => KindSpec {
            title: "pong",
            default_size: Vec2::new(572.0, 422.0),
            minimized_size: None,
            aspect_ratio: Some(3.0 / 2.0),
            chrome_height: 40.0,
            border_thickness: 2.0,
            accent: PONG_ACCENT,
        },
        WidgetKind::Rhythm => KindSpec {
            title: "rhythm",
            default_size: Vec2::new(420.0, 520.0),
            minimized_size: None,
            aspect_ratio: None,
            chrome_height: 40.0,
            border_thickness: 2.0,
            accent: RHYTHM_ACCENT,
        },
    }
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_locked_kinds_carry_chrome_metrics() {
        for kind in WidgetKind::ALL {
            let spec = kind.spec();
            if spec.aspect_ratio.is_some() {
                assert!(spec.chrome_height > 0.0);
                assert!(spec.border_thickness > 0.0);
            }
        }
    }

    #[test]
    fn aspect_derivations_invert_each_other() {
        let spec = WidgetKind::Pong.spec();
        let ratio = spec.aspect_ratio.unwrap();
        let height = spec.height_for_width(572.0, ratio);
        let width = spec.width_for_height(height, ratio);
        assert!((width - 572.0).abs() < 1e-3);
    }

    #[test]
    fn minimized_display_size_falls_back_to_header_bar() {
        let spec = WidgetKind::Pong.spec();
        let display = spec.display_size(Vec2::new(572.0, 422.0), true);
        assert_eq!(display, Vec2::new(572.0, spec.chrome_height));

        let music = WidgetKind::Music.spec();
        let display = music.display_size(Vec2::new(550.0, 450.0), true);
        assert_eq!(display, music.minimized_size.unwrap());
    }

    #[test]
    fn kind_keys_are_stable_and_distinct() {
        let keys: Vec<_> = WidgetKind::ALL.iter().map(|kind| kind.key()).collect();
        assert_eq!(keys, vec!["music", "video", "pong", "rhythm"]);
    }
}
