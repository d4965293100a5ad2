//! Pointer translation: continuous hover query and the select-click
//! callback, both through the inverse transform pipeline.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::plugins::core::InputBindings;

use super::state::RadarState;
use super::surface::RadarGeometry;
use super::transform::RadarTransforms;

/// World coordinates currently under the pointer, refreshed every frame.
#[derive(Resource, Default)]
pub struct RadarCursor {
    /// Control-relative pointer position in physical pixels.
    pub control: Option<Vec2>,
    /// The pointer position mapped back into world space.
    pub world: Option<Vec2>,
}

/// Caller-supplied callback invoked with resolved world coordinates on a
/// qualifying click.
#[derive(Resource, Default)]
pub struct RadarClickHandler(pub Option<Box<dyn Fn(Vec2) + Send + Sync>>);

fn pointer_chain(
    state: &RadarState,
    geometry: &RadarGeometry,
    transforms: &Query<&Transform>,
) -> Option<RadarTransforms> {
    let anchor = state.anchor?;
    let rotation = state.rotation?;
    let transform = transforms.get(anchor.entity).ok()?;
    RadarTransforms::compute(
        anchor.offset,
        rotation,
        transform.translation.truncate(),
        transform.rotation.to_euler(EulerRot::ZYX).0,
        state.rotate_with_entity,
        geometry.minimap_scale(state.actual_range()) * geometry.ui_scale,
        geometry.midpoint() * geometry.ui_scale,
    )
}

// =============================================================================
// Systems
// =============================================================================

pub fn update_radar_cursor(
    windows: Query<&Window, With<PrimaryWindow>>,
    state: Res<RadarState>,
    geometry: Res<RadarGeometry>,
    transforms: Query<&Transform>,
    mut cursor: ResMut<RadarCursor>,
) {
    let window = match windows.single() {
        Ok(window) => window,
        Err(_) => {
            cursor.control = None;
            cursor.world = None;
            return;
        }
    };
    let position = match window.cursor_position() {
        Some(position) => position,
        None => {
            cursor.control = None;
            cursor.world = None;
            return;
        }
    };

    let control = (position - geometry.origin) * geometry.ui_scale;
    cursor.control = Some(control);
    cursor.world =
        pointer_chain(&state, &geometry, &transforms).and_then(|chain| chain.view_to_world(control));
}

/// Raises the click callback when the select binding releases over the
/// control with a known anchor and orientation.
pub fn radar_click(
    mouse: Res<ButtonInput<MouseButton>>,
    bindings: Res<InputBindings>,
    state: Res<RadarState>,
    geometry: Res<RadarGeometry>,
    cursor: Res<RadarCursor>,
    handler: Res<RadarClickHandler>,
) {
    if !mouse.just_released(bindings.select) {
        return;
    }
    if !state.ready() {
        return;
    }
    let Some(handler) = &handler.0 else {
        return;
    };
    let Some(control) = cursor.control else {
        return;
    };
    if !geometry.contains(control / geometry.ui_scale) {
        return;
    }
    let Some(world) = cursor.world else {
        return;
    };
    handler(world);
}

// =============================================================================
// Tests
// =============================================================================
