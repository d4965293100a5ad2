//! Docking-port markers and deduplicated dock labels.

use bevy::math::Affine2;
use bevy::prelude::*;
use std::collections::HashSet;

use super::state::DockState;
use super::surface::{text_dimensions, DrawBuffer};

/// Dock marker half-size in radar units.
pub const DOCK_SCALE: f32 = 0.6;

pub const DOCK_LABEL_COLOR: Color = Color::WHITE;

const SQRT_2: f32 = std::f32::consts::SQRT_2;

/// Pixel viewport expanded by the worst-case marker radius; ports whose
/// projected center falls outside are culled.
fn dock_view_bounds(pixel_size: Vec2) -> Rect {
    let margin = DOCK_SCALE * SQRT_2;
    Rect {
        min: Vec2::splat(-margin),
        max: pixel_size + Vec2::splat(margin),
    }
}

fn in_bounds(bounds: &Rect, point: Vec2) -> bool {
    point.x >= bounds.min.x
        && point.y >= bounds.min.y
        && point.x <= bounds.max.x
        && point.y <= bounds.max.y
}

/// Draws one grid's docking ports through its view transform: filled
/// squares first, then at most one label per distinct label name, so all
/// labels render above all markers.
pub fn draw_docks(
    buffer: &mut DrawBuffer,
    docks: &[DockState],
    grid_to_view: Affine2,
    pixel_size: Vec2,
    ui_scale: f32,
    show_docks: bool,
) {
    if !show_docks {
        return;
    }

    let bounds = dock_view_bounds(pixel_size);

    for dock in docks {
        let position_in_view = grid_to_view.transform_point2(dock.position);
        if !in_bounds(&bounds, position_in_view) {
            continue;
        }

        // The transformed square stays a square: the view transform is a
        // uniform scale with a Y flip.
        let half_edge = grid_to_view
            .transform_vector2(Vec2::new(DOCK_SCALE, 0.0));
        let rotation = half_edge.to_angle();
        buffer.filled_rect(
            position_in_view,
            Vec2::splat(half_edge.length()),
            rotation,
            dock.color.with_alpha(0.8),
        );

        let corners = [
            Vec2::new(-DOCK_SCALE, -DOCK_SCALE),
            Vec2::new(DOCK_SCALE, -DOCK_SCALE),
            Vec2::new(DOCK_SCALE, DOCK_SCALE),
            Vec2::new(-DOCK_SCALE, DOCK_SCALE),
            Vec2::new(-DOCK_SCALE, -DOCK_SCALE),
        ];
        let outline = corners
            .iter()
            .map(|corner| grid_to_view.transform_point2(dock.position + *corner))
            .collect();
        buffer.line_strip(outline, dock.color);
    }

    // Label pass: first occurrence of each name wins, exact match.
    let mut labeled: HashSet<&str> = HashSet::new();
    for dock in docks {
        let Some(name) = dock.label.as_deref() else {
            continue;
        };
        if labeled.contains(name) {
            continue;
        }

        let position_in_view = grid_to_view.transform_point2(dock.position);
        if !in_bounds(&bounds, position_in_view) {
            continue;
        }

        labeled.insert(name);
        let dimensions = text_dimensions(name, 1.0);
        buffer.text(
            (position_in_view / ui_scale - dimensions / 2.0) * ui_scale,
            name,
            1.0,
            DOCK_LABEL_COLOR,
        );
    }
}

// =============================================================================
// Tests
// =============================================================================
