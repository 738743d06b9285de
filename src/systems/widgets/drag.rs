use bevy::prelude::*;

use crate::startup::cursor::{CursorMode, DeskCursor};

use super::{
    chrome,
    store::{WidgetId, WidgetStore},
    ActiveWidgetGesture, DeskViewport, WidgetGesture,
};

/// However far a window is dragged, at least this much of its chrome stays
/// inside the viewport so the user can always pull it back.
pub const DRAG_MIN_VISIBLE_X: f32 = 100.0;
pub const DRAG_MIN_VISIBLE_Y: f32 = 50.0;

pub struct DragGesture {
    pub id: WidgetId,
    /// `pointer - position` at press time; kept for the whole gesture so the
    /// window never jumps under the pointer.
    pub grab_offset: Vec2,
}

/// Clamps a drag target so a `DRAG_MIN_VISIBLE_X` x `DRAG_MIN_VISIBLE_Y`
/// strip of the title chrome remains reachable:
/// `x in [-(width-100), viewport.x-100]`, `y in [0, viewport.y-50]`.
pub fn clamp_dragged_position(target: Vec2, display_width: f32, viewport: Vec2) -> Vec2 {
    Vec2::new(
        clamp_range(
            target.x,
            -(display_width - DRAG_MIN_VISIBLE_X),
            viewport.x - DRAG_MIN_VISIBLE_X,
        ),
        clamp_range(target.y, 0.0, viewport.y - DRAG_MIN_VISIBLE_Y),
    )
}

/// `f32::clamp` that tolerates a crossed range: when the viewport is smaller
/// than the keep-visible strip the bounds invert, and the value resolves to
/// their midpoint instead of panicking.
pub(super) fn clamp_range(value: f32, min: f32, max: f32) -> f32 {
    if min <= max {
        value.clamp(min, max)
    } else {
        (min + max) * 0.5
    }
}

/// Pointer-down on a window's header band acquires the gesture slot and
/// captures the grab offset. Neither the header buttons nor the content body
/// may initiate a drag.
pub fn begin_drag(
    mouse_input: Res<ButtonInput<MouseButton>>,
    mut cursor: ResMut<DeskCursor>,
    store: Res<WidgetStore>,
    mut gesture: ResMut<ActiveWidgetGesture>,
) {
    if !gesture.is_idle() || !mouse_input.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(pointer) = cursor.position else {
        return;
    };

    let Some(record) = chrome::topmost_surface_hit(&store, pointer) else {
        return;
    };
    if !chrome::header_contains(record, pointer) {
        return;
    }

    gesture.gesture = Some(WidgetGesture::Drag(DragGesture {
        id: record.id.clone(),
        grab_offset: pointer - record.position,
    }));
    cursor.mode = CursorMode::Grabbing;
}

/// Applies pointer motion to the dragged window. The gesture aborts if the
/// record vanished mid-drag (a close racing the pointer stream is a no-op,
/// never a crash).
pub fn apply_drag(
    mouse_input: Res<ButtonInput<MouseButton>>,
    mut cursor: ResMut<DeskCursor>,
    viewport: Res<DeskViewport>,
    mut store: ResMut<WidgetStore>,
    mut gesture: ResMut<ActiveWidgetGesture>,
) {
    let (id, grab_offset) = match &gesture.gesture {
        Some(WidgetGesture::Drag(drag)) => (drag.id.clone(), drag.grab_offset),
        _ => return,
    };
    if !mouse_input.pressed(MouseButton::Left) {
        return;
    }
    let Some(pointer) = cursor.position else {
        return;
    };

    let Some(record) = store.get(&id) else {
        gesture.release(&mut cursor);
        return;
    };

    let target = pointer - grab_offset;
    let clamped = clamp_dragged_position(target, record.display_size().x, viewport.0);
    if clamped != record.position {
        store.update_position(&id, clamped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(1200.0, 800.0);

    #[test]
    fn far_offscreen_target_keeps_a_chrome_strip_reachable() {
        // 450 wide window, raw target x of -700 clamps to -(450 - 100).
        let clamped = clamp_dragged_position(Vec2::new(-700.0, 100.0), 450.0, VIEWPORT);
        assert_eq!(clamped.x, -350.0);
        assert_eq!(clamped.y, 100.0);
    }

    #[test]
    fn right_and_bottom_bounds_track_the_viewport() {
        let clamped = clamp_dragged_position(Vec2::new(5000.0, 5000.0), 450.0, VIEWPORT);
        assert_eq!(clamped, Vec2::new(1200.0 - 100.0, 800.0 - 50.0));
    }

    #[test]
    fn top_edge_is_a_hard_floor() {
        let clamped = clamp_dragged_position(Vec2::new(200.0, -80.0), 450.0, VIEWPORT);
        assert_eq!(clamped.y, 0.0);
    }

    #[test]
    fn in_bounds_targets_pass_through_untouched() {
        let target = Vec2::new(-200.0, 321.5);
        assert_eq!(clamp_dragged_position(target, 450.0, VIEWPORT), target);
    }

    #[test]
    fn degenerate_viewport_resolves_to_the_midpoint() {
        let clamped = clamp_dragged_position(Vec2::new(10.0, 10.0), 450.0, Vec2::new(40.0, 30.0));
        assert!(clamped.x.is_finite());
        assert!(clamped.y.is_finite());
    }
}
