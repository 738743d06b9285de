use bevy::prelude::*;

use super::{
    registry::WidgetKind,
    store::{WidgetId, WidgetStore},
};

/// Mount point for a window's content module. The manager only ever tells a
/// module which window it belongs to and whether that window is minimized;
/// everything else is the module's own business. New widget kinds therefore
/// touch only the registry and their own content plugin, never the store or
/// the gesture controllers.
#[derive(Component)]
pub struct ContentSlot {
    pub id: WidgetId,
    pub kind: WidgetKind,
}

/// The `{id, minimized}` contract: synced from the store every frame, read
/// by content modules, never written by them.
#[derive(Component, Default)]
pub struct ContentState {
    pub minimized: bool,
}

/// Inner body footprint the mounted module may fill. This is the container
/// box, not widget knowledge.
#[derive(Component)]
pub struct ContentExtent(pub Vec2);

/// Inserted by a content plugin once it has claimed the slot.
#[derive(Component)]
pub struct ContentMounted;

/// The neutral placeholder shown until a module claims the slot. A kind no
/// plugin ever claims keeps this placeholder indefinitely: there is no
/// retry and no error surface for it, intentionally.
#[derive(Component)]
pub struct ContentPlaceholder;

pub fn sync_content_state(
    store: Res<WidgetStore>,
    mut slots: Query<(&ContentSlot, &mut ContentState)>,
) {
    for (slot, mut state) in slots.iter_mut() {
        if let Some(record) = store.get(&slot.id) {
            if state.minimized != record.minimized {
                state.minimized = record.minimized;
            }
        }
    }
}

/// Shared by content plugins: claims every unmounted slot of `kind`, clears
/// its placeholder, and hands the slot entity to `mount` for the module's
/// own children.
pub fn claim_slots<F>(
    commands: &mut Commands,
    slots: &Query<(Entity, &ContentSlot), Without<ContentMounted>>,
    placeholders: &Query<(Entity, &ChildOf), With<ContentPlaceholder>>,
    kind: WidgetKind,
    mut mount: F,
) where
    F: FnMut(&mut ChildSpawnerCommands),
{
    for (slot_entity, slot) in slots.iter() {
        if slot.kind != kind {
            continue;
        }
        for (placeholder, child_of) in placeholders.iter() {
            if child_of.parent() == slot_entity {
                commands.entity(placeholder).despawn();
            }
        }
        commands
            .entity(slot_entity)
            .insert(ContentMounted)
            .with_children(|parent| mount(parent));
    }
}
