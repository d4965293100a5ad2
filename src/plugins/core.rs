//! Core plugin: input bindings, radar toggles, and the demo click logger.

use bevy::prelude::*;

use crate::plugins::radar::{RadarClickHandler, RadarState, RANGE_STEP};

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputBindings>()
            .add_systems(Startup, install_click_logger)
            .add_systems(Update, (handle_radar_toggles, handle_range_keys));
    }
}

#[derive(Resource, Debug, Clone)]
pub struct InputBindings {
    pub select: MouseButton,
    pub toggle_iff: KeyCode,
    pub toggle_iff_shuttles: KeyCode,
    pub toggle_docks: KeyCode,
    pub toggle_rotate: KeyCode,
    pub toggle_coords: KeyCode,
    pub range_in: KeyCode,
    pub range_out: KeyCode,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            select: MouseButton::Left,
            toggle_iff: KeyCode::KeyI,
            toggle_iff_shuttles: KeyCode::KeyU,
            toggle_docks: KeyCode::KeyO,
            toggle_rotate: KeyCode::KeyR,
            toggle_coords: KeyCode::KeyC,
            range_in: KeyCode::Equal,
            range_out: KeyCode::Minus,
        }
    }
}

fn toggle_status(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

// =============================================================================
// Systems
// =============================================================================

fn install_click_logger(mut handler: ResMut<RadarClickHandler>) {
    handler.0 = Some(Box::new(|world| {
        info!("radar select at ({:.1}, {:.1})", world.x, world.y);
    }));
}

pub fn handle_radar_toggles(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut state: ResMut<RadarState>,
) {
    if input.just_pressed(bindings.toggle_iff) {
        state.show_iff = !state.show_iff;
        info!("IFF labels {}", toggle_status(state.show_iff));
    }
    if input.just_pressed(bindings.toggle_iff_shuttles) {
        state.show_iff_shuttles = !state.show_iff_shuttles;
        info!("shuttle IFF labels {}", toggle_status(state.show_iff_shuttles));
    }
    if input.just_pressed(bindings.toggle_docks) {
        state.show_docks = !state.show_docks;
        info!("dock markers {}", toggle_status(state.show_docks));
    }
    if input.just_pressed(bindings.toggle_rotate) {
        state.rotate_with_entity = !state.rotate_with_entity;
        info!("rotate with vessel {}", toggle_status(state.rotate_with_entity));
    }
    if input.just_pressed(bindings.toggle_coords) {
        state.hide_coords = !state.hide_coords;
        info!("hover coordinates {}", toggle_status(!state.hide_coords));
    }
}

pub fn handle_range_keys(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut state: ResMut<RadarState>,
) {
    if input.just_pressed(bindings.range_in) {
        state.add_range(-RANGE_STEP);
        info!("radar range {:.0}", state.actual_range());
    }
    if input.just_pressed(bindings.range_out) {
        state.add_range(RANGE_STEP);
        info!("radar range {:.0}", state.actual_range());
    }
}

// =============================================================================
// Tests
// =============================================================================
