//! Radar minimap plugin.
//!
//! One frame runs as a fixed pipeline: ingest any staged snapshot, refresh
//! the pointer query, render the frame into the draw buffer, execute the
//! buffer, then translate clicks. Everything is synchronous on the render
//! schedule; "not ready" states skip work instead of waiting.

mod blips;
mod click;
mod docks;
mod frame;
mod present;
mod state;
mod surface;
mod transform;

use bevy::prelude::*;

// Re-export public types
pub use blips::IffFilter;
pub use click::{RadarClickHandler, RadarCursor};
#[allow(unused_imports)]
pub use state::{
    DockState, NavSnapshot, PendingSnapshot, RadarAnchor, RadarState, RANGE_STEP,
};
pub use surface::{DrawBuffer, RadarGeometry};

// =============================================================================
// Plugin
// =============================================================================

pub struct RadarPlugin;

impl Plugin for RadarPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RadarState>()
            .init_resource::<RadarGeometry>()
            .init_resource::<DrawBuffer>()
            .init_resource::<RadarCursor>()
            .init_resource::<IffFilter>()
            .init_resource::<RadarClickHandler>()
            .init_resource::<PendingSnapshot>()
            .add_systems(Startup, present::setup_radar_camera)
            .add_systems(
                Update,
                (
                    state::ingest_snapshot,
                    state::radar_range_wheel,
                    click::update_radar_cursor,
                    frame::render_radar,
                    present::present_draw_buffer,
                    click::radar_click,
                )
                    .chain(),
            );
    }
}
