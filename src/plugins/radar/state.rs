//! Owned render state for the radar control and the snapshot ingester
//! that replaces it between frames.

use bevy::prelude::*;
use std::collections::HashMap;

/// World-units added or removed per range-zoom step.
pub const RANGE_STEP: f32 = 16.0;

/// Anchor reference: the entity whose frame the radar is parented to,
/// plus a local offset within it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadarAnchor {
    pub entity: Entity,
    pub offset: Vec2,
}

/// One docking port on a grid, in grid-local units.
#[derive(Clone, Debug)]
pub struct DockState {
    pub position: Vec2,
    pub color: Color,
    pub label: Option<String>,
}

/// Immutable state snapshot delivered from outside the render loop.
/// Applied atomically between frames; never partially merged.
#[derive(Clone, Debug, Default)]
pub struct NavSnapshot {
    pub anchor: Option<RadarAnchor>,
    pub rotation: Option<f32>,
    pub max_range: f32,
    pub rotate_with_entity: bool,
    pub max_iff_distance: Option<f32>,
    pub hide_coords: bool,
    pub docks: HashMap<Entity, Vec<DockState>>,
}

/// Snapshot staged for the next frame, if any arrived.
#[derive(Resource, Default)]
pub struct PendingSnapshot(pub Option<NavSnapshot>);

/// All mutable radar state. Written by the ingester and the public
/// setters; read-only for the duration of a frame's draw.
#[derive(Resource)]
pub struct RadarState {
    pub anchor: Option<RadarAnchor>,
    pub rotation: Option<f32>,
    pub world_min_range: f32,
    pub world_max_range: f32,
    actual_range: f32,
    pub rotate_with_entity: bool,
    pub hide_coords: bool,
    /// Straight-line IFF label cutoff; negative means unlimited.
    pub max_iff_distance: f32,
    pub console: Option<Entity>,
    pub show_iff: bool,
    pub show_iff_shuttles: bool,
    pub show_docks: bool,
    pub docks: HashMap<Entity, Vec<DockState>>,
}

impl Default for RadarState {
    fn default() -> Self {
        Self {
            anchor: None,
            rotation: None,
            world_min_range: 64.0,
            world_max_range: 256.0,
            actual_range: 256.0,
            rotate_with_entity: true,
            hide_coords: false,
            max_iff_distance: -1.0,
            console: None,
            show_iff: true,
            show_iff_shuttles: true,
            show_docks: true,
            docks: HashMap::new(),
        }
    }
}

impl RadarState {
    pub fn actual_range(&self) -> f32 {
        self.actual_range
    }

    /// Sets the displayed range, holding `min <= actual <= max`.
    pub fn set_actual_range(&mut self, range: f32) {
        self.actual_range = range.clamp(self.world_min_range, self.world_max_range);
    }

    pub fn add_range(&mut self, delta: f32) {
        self.set_actual_range(self.actual_range + delta);
    }

    pub fn ready(&self) -> bool {
        self.anchor.is_some() && self.rotation.is_some()
    }

    /// Applies a snapshot wholesale. The dock mapping is replaced, never
    /// merged; a snapshot without an IFF cutoff keeps the current one.
    pub fn apply_snapshot(&mut self, snapshot: NavSnapshot) {
        self.anchor = snapshot.anchor;
        self.rotation = snapshot.rotation;

        self.world_max_range = snapshot.max_range;
        if self.world_max_range < self.actual_range {
            self.actual_range = self.world_max_range;
        }
        if self.world_max_range < self.world_min_range {
            self.world_min_range = self.world_max_range;
        }
        self.actual_range = self
            .actual_range
            .clamp(self.world_min_range, self.world_max_range);

        self.rotate_with_entity = snapshot.rotate_with_entity;
        if let Some(distance) = snapshot.max_iff_distance {
            self.max_iff_distance = distance;
        }
        self.hide_coords = snapshot.hide_coords;
        self.docks = snapshot.docks;
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Applies any staged snapshot before the frame draws.
pub fn ingest_snapshot(mut pending: ResMut<PendingSnapshot>, mut state: ResMut<RadarState>) {
    if let Some(snapshot) = pending.0.take() {
        state.apply_snapshot(snapshot);
    }
}

/// Mouse wheel over the control steps the displayed range.
#[allow(deprecated)]
pub fn radar_range_wheel(
    mut scroll_events: EventReader<bevy::input::mouse::MouseWheel>,
    cursor: Res<super::click::RadarCursor>,
    geometry: Res<super::surface::RadarGeometry>,
    mut state: ResMut<RadarState>,
) {
    let over_control = cursor
        .control
        .is_some_and(|control| geometry.contains(control / geometry.ui_scale));
    for event in scroll_events.read() {
        if !over_control {
            continue;
        }
        // Scroll up narrows the range (zooms in), scroll down widens it.
        if event.y > 0.0 {
            state.add_range(-RANGE_STEP);
        } else if event.y < 0.0 {
            state.add_range(RANGE_STEP);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
