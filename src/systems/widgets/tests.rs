use bevy::prelude::*;

use crate::{
    data::layout::MemoryLayoutStorage,
    scenes::pong::PongScenePlugin,
    startup::cursor::{CursorMode, DeskCursor},
};

use super::{
    chrome::WidgetWindow,
    content::{ContentMounted, ContentPlaceholder, ContentSlot},
    registry::WidgetKind,
    store::{WidgetId, WidgetStore},
    ActiveWidgetGesture, DeskViewport, WidgetsPlugin,
};

const VIEWPORT: Vec2 = Vec2::new(1200.0, 800.0);

fn make_widget_test_app(storage: MemoryLayoutStorage) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.init_resource::<ButtonInput<MouseButton>>();
    app.init_resource::<ButtonInput<KeyCode>>();
    app.insert_resource(DeskViewport(VIEWPORT));
    app.insert_resource(WidgetStore::new(Box::new(storage)));
    app.add_plugins(WidgetsPlugin);
    app
}

fn store(app: &App) -> &WidgetStore {
    app.world().resource::<WidgetStore>()
}

fn create(app: &mut App, kind: WidgetKind) -> WidgetId {
    app.world_mut()
        .resource_mut::<WidgetStore>()
        .create(kind, VIEWPORT)
}

fn set_cursor(app: &mut App, position: Vec2) {
    app.world_mut().resource_mut::<DeskCursor>().position = Some(position);
}

fn press_left(app: &mut App) {
    app.world_mut()
        .resource_mut::<ButtonInput<MouseButton>>()
        .press(MouseButton::Left);
}

fn release_left(app: &mut App) {
    app.world_mut()
        .resource_mut::<ButtonInput<MouseButton>>()
        .release(MouseButton::Left);
}

/// Moves `just_pressed`/`just_released` out of the way, the way a real input
/// plugin would between frames.
fn settle_input(app: &mut App) {
    app.world_mut()
        .resource_mut::<ButtonInput<MouseButton>>()
        .clear();
}

fn count_entities_with<C: Component>(app: &mut App) -> usize {
    let world = app.world_mut();
    let mut query = world.query::<&C>();
    query.iter(world).count()
}

fn window_count(app: &mut App) -> usize {
    count_entities_with::<WidgetWindow>(app)
}

#[test]
fn creating_a_record_spawns_chrome_and_a_content_slot() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    create(&mut app, WidgetKind::Music);
    app.update();

    assert_eq!(window_count(&mut app), 1);
    assert_eq!(count_entities_with::<ContentSlot>(&mut app), 1);
    assert_eq!(count_entities_with::<ContentPlaceholder>(&mut app), 1);
}

#[test]
fn closing_a_record_despawns_its_window() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    let id = create(&mut app, WidgetKind::Music);
    app.update();
    assert_eq!(window_count(&mut app), 1);

    app.world_mut().resource_mut::<WidgetStore>().close(&id);
    app.update();
    assert_eq!(window_count(&mut app), 0);
}

#[test]
fn chrome_root_lands_at_the_mapped_world_position() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    let id = create(&mut app, WidgetKind::Music);
    app.update();
    app.update();

    // A 550x450 window centered in a 1200x800 viewport sits at the world
    // origin, on the first stacking step.
    let world = app.world_mut();
    let mut roots = world.query::<(&WidgetWindow, &Transform)>();
    let (_, transform) = roots
        .iter(world)
        .find(|(window, _)| window.id == id)
        .expect("window entity");
    assert_eq!(transform.translation, Vec3::new(0.0, 0.0, 10.0));
}

#[test]
fn header_drag_moves_the_window_and_persists_the_layout() {
    let storage = MemoryLayoutStorage::default();
    let mut app = make_widget_test_app(storage.clone());
    let id = create(&mut app, WidgetKind::Music);
    app.update();

    // Default geometry: position (325, 175), header band 40px tall.
    set_cursor(&mut app, Vec2::new(400.0, 190.0));
    press_left(&mut app);
    app.update();
    assert_eq!(
        app.world().resource::<DeskCursor>().mode,
        CursorMode::Grabbing
    );
    settle_input(&mut app);

    set_cursor(&mut app, Vec2::new(460.0, 305.0));
    app.update();

    let record = store(&app).get(&id).unwrap();
    assert_eq!(record.position, Vec2::new(385.0, 290.0));

    release_left(&mut app);
    app.update();
    assert!(app.world().resource::<ActiveWidgetGesture>().is_idle());
    assert_eq!(
        app.world().resource::<DeskCursor>().mode,
        CursorMode::Default
    );
    assert_eq!(store(&app).get(&id).unwrap().position, Vec2::new(385.0, 290.0));

    let persisted = storage.contents().expect("layout written");
    assert!(persisted.contains("\"x\":385.0"));
}

#[test]
fn drag_clamps_to_keep_chrome_reachable() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    let id = create(&mut app, WidgetKind::Music);
    app.update();

    set_cursor(&mut app, Vec2::new(400.0, 190.0));
    press_left(&mut app);
    app.update();
    settle_input(&mut app);

    // Grab offset is (75, 15); this pointer would put x at -700.
    set_cursor(&mut app, Vec2::new(-625.0, 190.0));
    app.update();

    let record = store(&app).get(&id).unwrap();
    assert_eq!(record.position.x, -(550.0 - 100.0));
}

#[test]
fn east_handle_resizes_the_window() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    let id = create(&mut app, WidgetKind::Music);
    app.update();

    // East edge of the default footprint: x = 325 + 550.
    set_cursor(&mut app, Vec2::new(875.0, 400.0));
    press_left(&mut app);
    app.update();
    assert_eq!(
        app.world().resource::<DeskCursor>().mode,
        CursorMode::ResizeEw
    );
    settle_input(&mut app);

    set_cursor(&mut app, Vec2::new(935.0, 400.0));
    app.update();

    let record = store(&app).get(&id).unwrap();
    assert_eq!(record.size, Vec2::new(610.0, 450.0));
    assert_eq!(record.position, Vec2::new(325.0, 175.0));

    release_left(&mut app);
    app.update();
    assert!(app.world().resource::<ActiveWidgetGesture>().is_idle());
}

#[test]
fn resize_and_drag_never_run_at_once() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    let id = create(&mut app, WidgetKind::Music);
    app.update();

    // Start a resize on the east edge...
    set_cursor(&mut app, Vec2::new(875.0, 400.0));
    press_left(&mut app);
    app.update();
    settle_input(&mut app);

    // ...then sweep the pointer across the header band. A drag must not
    // start; the gesture stays a resize measured from its start snapshot.
    set_cursor(&mut app, Vec2::new(400.0, 190.0));
    app.update();

    let record = store(&app).get(&id).unwrap();
    assert_eq!(record.position.y, 175.0);
    assert_eq!(record.size.y, 450.0);
    assert_eq!(
        app.world().resource::<DeskCursor>().mode,
        CursorMode::ResizeEw
    );
}

#[test]
fn minimize_button_collapses_and_restores() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    let other = create(&mut app, WidgetKind::Pong);
    let id = create(&mut app, WidgetKind::Music);
    app.update();

    // Minimize: the square left of the close button, full footprint 550 wide.
    set_cursor(&mut app, Vec2::new(325.0 + 550.0 - 60.0, 190.0));
    press_left(&mut app);
    app.update();
    release_left(&mut app);
    settle_input(&mut app);
    app.update();

    let record = store(&app).get(&id).unwrap();
    assert!(record.minimized);
    assert_eq!(record.display_size(), Vec2::new(320.0, 80.0));
    assert_eq!(record.size, Vec2::new(550.0, 450.0));

    // Restore from the collapsed footprint; the window also re-claims top.
    set_cursor(&mut app, Vec2::new(325.0 + 320.0 - 60.0, 190.0));
    press_left(&mut app);
    app.update();
    release_left(&mut app);
    settle_input(&mut app);
    app.update();

    let record = store(&app).get(&id).unwrap();
    assert!(!record.minimized);
    assert!(record.z_index > store(&app).get(&other).unwrap().z_index);
}

#[test]
fn close_button_removes_the_record() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    let id = create(&mut app, WidgetKind::Music);
    app.update();

    set_cursor(&mut app, Vec2::new(325.0 + 550.0 - 20.0, 190.0));
    press_left(&mut app);
    app.update();

    assert!(store(&app).get(&id).is_none());
    release_left(&mut app);
    app.update();
    assert_eq!(window_count(&mut app), 0);
}

#[test]
fn clicking_a_window_raises_it() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    let first = create(&mut app, WidgetKind::Music);
    let second = create(&mut app, WidgetKind::Music);
    app.world_mut()
        .resource_mut::<WidgetStore>()
        .update_position(&first, Vec2::new(0.0, 100.0));
    app.update();

    assert!(store(&app).get(&second).unwrap().z_index > store(&app).get(&first).unwrap().z_index);

    // Click the lower window's header where the top one does not overlap.
    set_cursor(&mut app, Vec2::new(40.0, 110.0));
    press_left(&mut app);
    app.update();

    assert!(store(&app).get(&first).unwrap().z_index > store(&app).get(&second).unwrap().z_index);
}

#[test]
fn closing_mid_drag_aborts_the_gesture_cleanly() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    let id = create(&mut app, WidgetKind::Music);
    app.update();

    set_cursor(&mut app, Vec2::new(400.0, 190.0));
    press_left(&mut app);
    app.update();
    settle_input(&mut app);
    assert!(!app.world().resource::<ActiveWidgetGesture>().is_idle());

    app.world_mut().resource_mut::<WidgetStore>().close(&id);
    set_cursor(&mut app, Vec2::new(500.0, 250.0));
    app.update();

    assert!(app.world().resource::<ActiveWidgetGesture>().is_idle());
    assert_eq!(
        app.world().resource::<DeskCursor>().mode,
        CursorMode::Default
    );
    assert_eq!(window_count(&mut app), 0);
}

#[test]
fn layout_survives_an_app_restart() {
    let storage = MemoryLayoutStorage::default();
    {
        let mut app = make_widget_test_app(storage.clone());
        let id = create(&mut app, WidgetKind::Music);
        app.world_mut()
            .resource_mut::<WidgetStore>()
            .update_position(&id, Vec2::new(-80.0, 120.0));
        app.update();
    }

    let mut app = make_widget_test_app(storage);
    app.update();
    let ids = store(&app).ids_of_kind(WidgetKind::Music);
    assert_eq!(ids.len(), 1);
    let record = store(&app).get(&ids[0]).unwrap();
    assert_eq!(record.position, Vec2::new(-80.0, 120.0));
    assert_eq!(window_count(&mut app), 1);
}

#[test]
fn corrupt_storage_starts_an_empty_desk() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::preloaded("{not json"));
    app.update();
    assert!(store(&app).is_empty());
    assert_eq!(window_count(&mut app), 0);
}

#[test]
fn pong_module_claims_its_slot_and_clears_the_placeholder() {
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    app.add_plugins(PongScenePlugin);
    create(&mut app, WidgetKind::Pong);
    for _ in 0..3 {
        app.update();
    }

    assert_eq!(count_entities_with::<ContentMounted>(&mut app), 1);
    assert_eq!(count_entities_with::<ContentPlaceholder>(&mut app), 0);
}

#[test]
fn unclaimed_kinds_keep_their_placeholder() {
    // Only the pong module is installed; a music window's slot stays on its
    // placeholder indefinitely.
    let mut app = make_widget_test_app(MemoryLayoutStorage::default());
    app.add_plugins(PongScenePlugin);
    create(&mut app, WidgetKind::Music);
    for _ in 0..3 {
        app.update();
    }

    assert_eq!(count_entities_with::<ContentPlaceholder>(&mut app), 1);
}
