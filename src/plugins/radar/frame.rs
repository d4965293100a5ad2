//! Per-frame radar rendering: backing, rings, own vessel, nearby grids,
//! blips, docks, and the console-offset marker.

use bevy::math::Affine2;
use bevy::prelude::*;

use crate::grids::{
    aabbs_intersect, grid_affine, grids_intersecting, iff_color, iff_label, world_aabb, Grid,
    IffData,
};

use super::blips::{
    blip_visible, clamp_to_viewport, draw_blip_markers, emit_blip_labels, is_hovered,
    should_draw_label, within_iff_range, BlipRecord, IffFilter,
};
use super::click::RadarCursor;
use super::docks::draw_docks;
use super::state::RadarState;
use super::surface::{DrawBuffer, RadarGeometry};
use super::transform::RadarTransforms;

// =============================================================================
// Constants
// =============================================================================

const RING_COUNT: u32 = 4;

/// Own-position marker spans two radar units bow to stern.
const OWN_MARKER_RADIUS: f32 = 2.0;

const CONSOLE_MARKER_RADIUS: f32 = 5.0;

const BACKING_COLOR: Color = Color::srgba(0.01, 0.06, 0.04, 0.95);
const RING_COLOR: Color = Color::srgba(0.1, 0.45, 0.3, 0.5);
const OUTER_RING_COLOR: Color = Color::srgba(0.15, 0.6, 0.4, 0.8);
const NORTH_TICK_COLOR: Color = Color::srgba(0.8, 0.25, 0.2, 0.9);
const OWN_MARKER_COLOR: Color = Color::srgb(0.0, 1.0, 0.0);
const CONSOLE_MARKER_COLOR: Color = Color::srgb(0.0, 1.0, 1.0);

// =============================================================================
// Systems
// =============================================================================

/// Renders one radar frame into the draw buffer. With no anchor or
/// orientation only the static backing and rings appear.
pub fn render_radar(
    mut buffer: ResMut<DrawBuffer>,
    state: Res<RadarState>,
    geometry: Res<RadarGeometry>,
    cursor: Res<RadarCursor>,
    filter: Res<IffFilter>,
    grids: Query<(Entity, &Transform, &Grid, Option<&IffData>)>,
    transforms: Query<&Transform>,
) {
    buffer.clear();
    draw_backing(&mut buffer, &geometry);
    draw_range_rings(&mut buffer, &geometry, state.actual_range());

    // No data: leave the static dial.
    let (Some(anchor), Some(rotation)) = (state.anchor, state.rotation) else {
        return;
    };
    let Ok(anchor_transform) = transforms.get(anchor.entity) else {
        return;
    };

    let entity_position = anchor_transform.translation.truncate();
    let entity_rotation = anchor_transform.rotation.to_euler(EulerRot::ZYX).0;
    let ui_scale = geometry.ui_scale;

    let Some(chain) = RadarTransforms::compute(
        anchor.offset,
        rotation,
        entity_position,
        entity_rotation,
        state.rotate_with_entity,
        geometry.minimap_scale(state.actual_range()) * ui_scale,
        geometry.midpoint() * ui_scale,
    ) else {
        return;
    };

    draw_north_tick(&mut buffer, &geometry, &chain);

    let map_pos = chain.anchor_absolute();
    let pixel_size = geometry.size * ui_scale;

    // Own grid in detail, plus its docks.
    if let Ok((_, own_transform, own_grid, _)) = grids.get(anchor.entity) {
        if own_grid.has_shape() {
            let own_to_view = chain.grid_to_view(grid_affine(own_transform));
            draw_grid_silhouette(&mut buffer, own_grid, own_to_view, iff_color(None, true));
            if let Some(docks) = state.docks.get(&anchor.entity) {
                draw_docks(
                    &mut buffer,
                    docks,
                    own_to_view,
                    pixel_size,
                    ui_scale,
                    state.show_docks,
                );
            }
        }
    }

    draw_own_marker(&mut buffer, &chain);

    let view_aabb = view_range_aabb(map_pos, chain.combined_rotation, state.actual_range());
    let query_box = Rect {
        min: map_pos - Vec2::splat(state.world_max_range),
        max: map_pos + Vec2::splat(state.world_max_range),
    };
    let nearby = grids_intersecting(
        query_box,
        grids.iter().map(|(entity, transform, grid, _)| (entity, transform, grid)),
    );

    let mut blip_batch: Vec<BlipRecord> = Vec::new();
    let center = geometry.midpoint();

    for entity in nearby {
        if entity == anchor.entity {
            continue;
        }
        let Ok((_, transform, grid, iff)) = grids.get(entity) else {
            continue;
        };
        if !grid.has_shape() {
            continue;
        }

        let to_absolute = grid_affine(transform);
        let to_view = chain.grid_to_view(to_absolute);
        let label_color = iff_color(iff, false);
        let label_name = iff_label(iff);

        let filter_passed = match &filter.0 {
            Some(predicate) => predicate(entity, iff),
            None => true,
        };
        let hide_label = iff.is_some_and(|iff| iff.hide_label);
        let player_shuttle = iff.is_some_and(|iff| iff.player_shuttle);

        let grid_center_absolute = to_absolute.transform_point2(grid.local_center);
        let visible = blip_visible(
            state.show_iff,
            state.show_iff_shuttles,
            label_name,
            hide_label,
            player_shuttle,
            filter_passed,
        ) && within_iff_range(map_pos, grid_center_absolute, state.max_iff_distance);

        if visible {
            if let Some(name) = label_name {
                let raw = to_view.transform_point2(grid.local_center) / ui_scale;
                let clamped = clamp_to_viewport(raw, center);
                let hovered = is_hovered(cursor.control, clamped.position * ui_scale);

                if should_draw_label(clamped.outside, player_shuttle, hovered) {
                    let distance = grid_center_absolute.distance(map_pos);
                    emit_blip_labels(
                        &mut buffer,
                        clamped.position,
                        geometry.size.x,
                        ui_scale,
                        name,
                        distance,
                        grid_center_absolute,
                        label_color,
                        hovered,
                        state.hide_coords,
                    );
                }

                blip_batch.push(BlipRecord {
                    outside: clamped.outside,
                    position: clamped.position,
                    direction: clamped.position - center,
                    color: label_color,
                });
            }
        }

        // Detailed silhouette only when the grid crosses the view box;
        // the blip above stays visible either way.
        let grid_aabb = world_aabb(to_absolute, grid.local_aabb);
        if !aabbs_intersect(grid_aabb, view_aabb) {
            continue;
        }
        draw_grid_silhouette(&mut buffer, grid, to_view, label_color);
        if let Some(docks) = state.docks.get(&entity) {
            draw_docks(
                &mut buffer,
                docks,
                to_view,
                pixel_size,
                ui_scale,
                state.show_docks,
            );
        }
    }

    // Markers batch after every label of the frame.
    draw_blip_markers(&mut buffer, &blip_batch, ui_scale);

    draw_console_marker(&mut buffer, &state, &chain, &transforms, anchor.entity, ui_scale);
}

// =============================================================================
// Drawing helpers
// =============================================================================

fn draw_backing(buffer: &mut DrawBuffer, geometry: &RadarGeometry) {
    let scale = geometry.ui_scale;
    buffer.circle(
        geometry.midpoint() * scale,
        geometry.disk_radius() * scale,
        BACKING_COLOR,
        true,
    );
}

fn draw_range_rings(buffer: &mut DrawBuffer, geometry: &RadarGeometry, range: f32) {
    if range <= 0.0 {
        return;
    }
    let scale = geometry.ui_scale;
    let mid = geometry.midpoint() * scale;
    let outer = geometry.disk_radius() * scale;
    for ring in 1..=RING_COUNT {
        let radius = outer * ring as f32 / RING_COUNT as f32;
        let color = if ring == RING_COUNT {
            OUTER_RING_COLOR
        } else {
            RING_COLOR
        };
        buffer.circle(mid, radius, color, false);
    }
}

/// Short tick on the outer ring pointing at world north.
fn draw_north_tick(buffer: &mut DrawBuffer, geometry: &RadarGeometry, chain: &RadarTransforms) {
    let north = chain.world_to_view.transform_vector2(Vec2::Y);
    let Some(direction) = north.try_normalize() else {
        return;
    };
    let scale = geometry.ui_scale;
    let mid = geometry.midpoint() * scale;
    let outer = geometry.disk_radius() * scale;
    buffer.line_strip(
        vec![mid + direction * outer * 0.92, mid + direction * outer],
        NORTH_TICK_COLOR,
    );
}

fn draw_grid_silhouette(
    buffer: &mut DrawBuffer,
    grid: &Grid,
    grid_to_view: Affine2,
    color: Color,
) {
    let points = grid
        .outline
        .iter()
        .map(|point| grid_to_view.transform_point2(*point))
        .collect();
    buffer.line_strip(points, color);
}

/// Fixed own-position marker: a bow-heavy diamond over the anchor.
fn draw_own_marker(buffer: &mut DrawBuffer, chain: &RadarTransforms) {
    let verts = vec![
        chain.scale_position(Vec2::new(0.0, -OWN_MARKER_RADIUS)),
        chain.scale_position(Vec2::new(OWN_MARKER_RADIUS / 2.0, 0.0)),
        chain.scale_position(Vec2::new(0.0, OWN_MARKER_RADIUS)),
        chain.scale_position(Vec2::new(-OWN_MARKER_RADIUS / 2.0, 0.0)),
        chain.scale_position(Vec2::new(0.0, -OWN_MARKER_RADIUS)),
    ];
    buffer.filled_rect(
        chain.scale_position(Vec2::ZERO),
        Vec2::splat(OWN_MARKER_RADIUS * chain.minimap_scale * 0.5),
        std::f32::consts::FRAC_PI_4,
        OWN_MARKER_COLOR,
    );
    buffer.line_strip(verts, OWN_MARKER_COLOR);
}

/// Marker for a controlling console that sits on a different grid than
/// the radar anchor.
fn draw_console_marker(
    buffer: &mut DrawBuffer,
    state: &RadarState,
    chain: &RadarTransforms,
    transforms: &Query<&Transform>,
    anchor_entity: Entity,
    ui_scale: f32,
) {
    let Some(console) = state.console else {
        return;
    };
    if console == anchor_entity {
        return;
    }
    let Ok(console_transform) = transforms.get(console) else {
        return;
    };
    let console_pos = console_transform.translation.truncate();
    if console_pos.distance_squared(chain.anchor_absolute()) < 1e-4 {
        return;
    }
    let projected = chain.world_to_view.transform_point2(console_pos);
    buffer.circle(
        projected,
        CONSOLE_MARKER_RADIUS * ui_scale,
        CONSOLE_MARKER_COLOR,
        true,
    );
}

/// View-space AABB of the rotated box spanning the visible world range.
pub fn view_range_aabb(map_pos: Vec2, rotation: f32, range: f32) -> Rect {
    world_aabb(
        Affine2::from_angle_translation(rotation, map_pos),
        Rect {
            min: Vec2::splat(-range),
            max: Vec2::splat(range),
        },
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::radar::surface::DrawOp;

    fn assert_close(a: f32, b: f32) {
        let diff = (a - b).abs();
        assert!(diff < 1e-3, "expected {} close to {}", a, b);
    }

    fn test_chain() -> RadarTransforms {
        RadarTransforms::compute(
            Vec2::ZERO,
            0.0,
            Vec2::ZERO,
            0.0,
            false,
            0.5,
            Vec2::splat(128.0),
        )
        .unwrap()
    }

    #[test]
    fn range_aabb_unrotated_matches_range() {
        let aabb = view_range_aabb(Vec2::new(10.0, 20.0), 0.0, 100.0);
        assert_close(aabb.min.x, -90.0);
        assert_close(aabb.max.y, 120.0);
    }

    #[test]
    fn range_aabb_grows_under_rotation() {
        let straight = view_range_aabb(Vec2::ZERO, 0.0, 100.0);
        let rotated = view_range_aabb(Vec2::ZERO, std::f32::consts::FRAC_PI_4, 100.0);
        let expected = 100.0 * 2f32.sqrt();
        assert_close(straight.max.x, 100.0);
        assert_close(rotated.max.x, expected);
        // Still centered on the map position.
        assert_close(rotated.min.x, -expected);
    }

    #[test]
    fn backing_and_rings_are_static_ops() {
        let geometry = RadarGeometry::default();
        let mut buffer = DrawBuffer::default();
        draw_backing(&mut buffer, &geometry);
        draw_range_rings(&mut buffer, &geometry, 256.0);
        assert_eq!(buffer.ops().len(), 1 + RING_COUNT as usize);
        assert!(matches!(
            buffer.ops()[0],
            DrawOp::Circle { filled: true, .. }
        ));
    }

    #[test]
    fn zero_range_draws_no_rings() {
        let geometry = RadarGeometry::default();
        let mut buffer = DrawBuffer::default();
        draw_range_rings(&mut buffer, &geometry, 0.0);
        assert!(buffer.ops().is_empty());
    }

    #[test]
    fn own_marker_sits_on_midpoint() {
        let mut buffer = DrawBuffer::default();
        draw_own_marker(&mut buffer, &test_chain());
        let Some(DrawOp::FilledRect { center, .. }) = buffer.ops().first() else {
            panic!("expected marker rect");
        };
        assert_close(center.x, 128.0);
        assert_close(center.y, 128.0);
    }

    #[test]
    fn north_tick_points_up_when_unrotated() {
        let geometry = RadarGeometry::default();
        let mut buffer = DrawBuffer::default();
        draw_north_tick(&mut buffer, &geometry, &test_chain());
        let Some(DrawOp::LineStrip { points, .. }) = buffer.ops().first() else {
            panic!("expected tick line");
        };
        // World north renders above the midpoint on a y-down screen.
        assert!(points[0].y < 128.0);
        assert!(points[1].y < points[0].y);
        assert_close(points[0].x, 128.0);
    }

    #[test]
    fn silhouette_projects_outline() {
        let mut buffer = DrawBuffer::default();
        let grid = Grid::from_outline(vec![
            Vec2::new(-2.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 3.0),
            Vec2::new(-2.0, 0.0),
        ]);
        let chain = test_chain();
        draw_grid_silhouette(
            &mut buffer,
            &grid,
            chain.grid_to_view(Affine2::IDENTITY),
            Color::WHITE,
        );
        let Some(DrawOp::LineStrip { points, .. }) = buffer.ops().first() else {
            panic!("expected silhouette");
        };
        assert_eq!(points.len(), 4);
        assert_close(points[0].x, 127.0);
        assert_close(points[2].y, 126.5);
    }
}
