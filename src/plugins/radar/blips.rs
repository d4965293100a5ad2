//! IFF blip visibility, viewport clamping, and label placement.
//!
//! The viewport "clamp" is a direction-preserving rectangular projection
//! with a zero-distance guard, kept bit-for-bit in shape rather than
//! corrected to a true disk; downstream visuals depend on the edge shape.

use bevy::prelude::*;

use super::surface::{text_dimensions, DrawBuffer};
use crate::grids::IffData;

/// Blip marker footprint in logical pixels.
pub const RADAR_BLIP_SIZE: f32 = 15.0;

/// Hover pickup distance around a blip, in scaled pixels.
pub const HOVER_RADIUS: f32 = 30.0;

/// Inward inset applied to edge-clamped blips so they do not clip.
const EDGE_INSET: f32 = 0.95;

const COORD_TEXT_SCALE: f32 = 0.7;

/// Caller-supplied predicate narrowing which grids receive IFF labels.
#[derive(Resource, Default)]
pub struct IffFilter(
    pub Option<Box<dyn Fn(Entity, Option<&IffData>) -> bool + Send + Sync>>,
);

/// Per-frame marker record; drawing defers until all labels are placed.
#[derive(Clone, Debug)]
pub struct BlipRecord {
    pub outside: bool,
    pub position: Vec2,
    pub direction: Vec2,
    pub color: Color,
}

/// Result of projecting a blip against the viewport edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClampedBlip {
    pub position: Vec2,
    pub outside: bool,
}

// =============================================================================
// Visibility
// =============================================================================

/// Base IFF visibility: the toggles, a usable name, the hide flag, and the
/// injected filter verdict.
pub fn blip_visible(
    show_iff: bool,
    show_iff_shuttles: bool,
    label: Option<&str>,
    hide_label: bool,
    player_shuttle: bool,
    filter_passed: bool,
) -> bool {
    let mut visible = show_iff && label.is_some() && !hide_label && filter_passed;
    if player_shuttle {
        visible &= show_iff_shuttles;
    }
    visible
}

/// Range gate: a negative cutoff means unlimited.
pub fn within_iff_range(anchor_absolute: Vec2, target_absolute: Vec2, max_distance: f32) -> bool {
    max_distance < 0.0 || anchor_absolute.distance(target_absolute) <= max_distance
}

/// Labels draw unless the blip sits clamped at the edge AND belongs to a
/// player-controlled ship nobody is pointing at. Everything else is a
/// point of interest that stays labeled.
pub fn should_draw_label(outside: bool, player_shuttle: bool, hovered: bool) -> bool {
    !outside || !player_shuttle || hovered
}

pub fn is_hovered(cursor: Option<Vec2>, blip_position: Vec2) -> bool {
    cursor.is_some_and(|cursor| cursor.distance(blip_position) <= HOVER_RADIUS)
}

// =============================================================================
// Placement
// =============================================================================

/// Projects a raw blip position against the viewport edge. `center` is the
/// viewport midpoint, which doubles as the half-extent vector.
pub fn clamp_to_viewport(raw: Vec2, center: Vec2) -> ClampedBlip {
    let offset = raw - center;
    let distance = offset.length();
    if distance == 0.0 {
        // Dead center; the projection below would divide by zero.
        return ClampedBlip {
            position: raw,
            outside: false,
        };
    }

    let projected = Vec2::new(
        center.x * offset.x / distance,
        center.y * offset.y / distance,
    );
    if distance > projected.x.abs() && distance > projected.y.abs() {
        ClampedBlip {
            position: center + projected * EDGE_INSET,
            outside: true,
        }
    } else {
        ClampedBlip {
            position: raw,
            outside: false,
        }
    }
}

/// Offset placing the name label beside the marker: right-aligned to its
/// left past the midline, left-aligned to its right before it.
pub fn label_offset(position: Vec2, control_width: f32, dimensions: Vec2) -> Vec2 {
    let blip_size = RADAR_BLIP_SIZE * 0.7;
    Vec2::new(
        if position.x > control_width / 2.0 {
            -dimensions.x - blip_size
        } else {
            blip_size
        },
        -dimensions.y / 2.0,
    )
}

/// Offset for the smaller hover coordinate line, same side rule.
pub fn coord_offset(position: Vec2, control_width: f32, dimensions: Vec2) -> Vec2 {
    let blip_size = RADAR_BLIP_SIZE * 0.7;
    Vec2::new(
        if position.x > control_width / 2.0 {
            -dimensions.x - blip_size / COORD_TEXT_SCALE
        } else {
            blip_size
        },
        dimensions.y / 2.0,
    )
}

// =============================================================================
// Text
// =============================================================================

/// Distance readout: decimals only matter up close.
pub fn format_distance(distance: f32) -> String {
    if distance < 50.0 {
        format!("{:.1}", distance)
    } else if distance < 1000.0 {
        format!("{:.0}", distance)
    } else {
        format!("{:.1}k", distance / 1000.0)
    }
}

pub fn blip_label(name: &str, distance: f32) -> String {
    format!("{} ({})", name, format_distance(distance))
}

pub fn coord_text(position: Vec2) -> String {
    format!("({:.1}, {:.1})", position.x, position.y)
}

/// Dimmed companion color for the coordinate line.
pub fn coord_color(label_color: Color) -> Color {
    let srgba = label_color.to_srgba();
    Color::srgba(srgba.red * 0.8, srgba.green * 0.8, srgba.blue * 0.8, 0.5)
}

// =============================================================================
// Label emission
// =============================================================================

/// Emits the name/distance label (and the hover coordinate line) for one
/// blip, returning nothing but text ops; markers batch separately.
#[allow(clippy::too_many_arguments)]
pub fn emit_blip_labels(
    buffer: &mut DrawBuffer,
    position: Vec2,
    control_width: f32,
    ui_scale: f32,
    name: &str,
    distance: f32,
    target_absolute: Vec2,
    label_color: Color,
    hovered: bool,
    hide_coords: bool,
) {
    let label = blip_label(name, distance);
    let dimensions = text_dimensions(&label, 1.0);
    let offset = label_offset(position, control_width, dimensions);
    buffer.text((position + offset) * ui_scale, label, 1.0, label_color);

    if hovered && !hide_coords {
        let coords = coord_text(target_absolute);
        let dimensions = text_dimensions(&coords, COORD_TEXT_SCALE);
        let offset = coord_offset(position, control_width, dimensions);
        buffer.text(
            (position + offset) * ui_scale,
            coords,
            COORD_TEXT_SCALE,
            coord_color(label_color),
        );
    }
}

/// Draws the deferred marker batch. Runs after every label of the frame
/// so markers never occlude text.
pub fn draw_blip_markers(buffer: &mut DrawBuffer, blips: &[BlipRecord], ui_scale: f32) {
    for blip in blips {
        let center = blip.position * ui_scale;
        if blip.outside {
            // Edge marker, elongated along the direction to the target.
            let rotation = if blip.direction == Vec2::ZERO {
                0.0
            } else {
                blip.direction.to_angle()
            };
            buffer.filled_rect(
                center,
                Vec2::new(RADAR_BLIP_SIZE * 0.3, RADAR_BLIP_SIZE * 0.15) * ui_scale,
                rotation,
                blip.color,
            );
        } else {
            buffer.filled_rect(
                center,
                Vec2::splat(RADAR_BLIP_SIZE * 0.25) * ui_scale,
                std::f32::consts::FRAC_PI_4,
                blip.color,
            );
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::radar::surface::DrawOp;

    const CENTER: Vec2 = Vec2::new(128.0, 128.0);

    fn assert_close(a: f32, b: f32) {
        let diff = (a - b).abs();
        assert!(diff < 1e-3, "expected {} close to {}", a, b);
    }

    #[test]
    fn visible_requires_name_and_toggle() {
        assert!(blip_visible(true, true, Some("Ship"), false, false, true));
        assert!(!blip_visible(false, true, Some("Ship"), false, false, true));
        assert!(!blip_visible(true, true, None, false, false, true));
    }

    #[test]
    fn hide_label_flag_suppresses() {
        assert!(!blip_visible(true, true, Some("Ship"), true, false, true));
    }

    #[test]
    fn filter_verdict_suppresses() {
        assert!(!blip_visible(true, true, Some("Ship"), false, false, false));
    }

    #[test]
    fn player_shuttle_needs_its_own_toggle() {
        assert!(!blip_visible(true, false, Some("Ship"), false, true, true));
        assert!(blip_visible(true, true, Some("Ship"), false, true, true));
        // Non-shuttles ignore the shuttle toggle.
        assert!(blip_visible(true, false, Some("Station"), false, false, true));
    }

    #[test]
    fn range_gate_suppresses_past_cutoff() {
        let anchor = Vec2::ZERO;
        let target = Vec2::new(500.0, 0.0);
        assert!(!within_iff_range(anchor, target, 400.0));
        assert!(within_iff_range(anchor, target, 500.0));
    }

    #[test]
    fn negative_cutoff_is_unlimited() {
        assert!(within_iff_range(Vec2::ZERO, Vec2::new(1.0e6, 0.0), -1.0));
    }

    #[test]
    fn clamp_keeps_interior_point() {
        let clamped = clamp_to_viewport(Vec2::new(140.0, 120.0), CENTER);
        assert!(!clamped.outside);
        assert_close(clamped.position.x, 140.0);
        assert_close(clamped.position.y, 120.0);
    }

    #[test]
    fn clamp_zero_distance_is_centered() {
        let clamped = clamp_to_viewport(CENTER, CENTER);
        assert!(!clamped.outside);
        assert_close(clamped.position.x, CENTER.x);
    }

    #[test]
    fn clamp_marks_far_point_outside_with_inset() {
        let clamped = clamp_to_viewport(Vec2::new(128.0 + 600.0, 128.0), CENTER);
        assert!(clamped.outside);
        // Projection lands on the axis at 95% of the half-extent.
        assert_close(clamped.position.x, 128.0 + 128.0 * 0.95);
        assert_close(clamped.position.y, 128.0);
    }

    #[test]
    fn clamped_offsets_stay_within_inset_extent() {
        for raw in [
            Vec2::new(1000.0, 400.0),
            Vec2::new(-900.0, 128.0),
            Vec2::new(128.0, -2000.0),
            Vec2::new(600.0, 900.0),
        ] {
            let clamped = clamp_to_viewport(raw, CENTER);
            if !clamped.outside {
                continue;
            }
            let offset = clamped.position - CENTER;
            assert!(offset.x.abs() <= 0.95 * CENTER.x + 1e-3);
            assert!(offset.y.abs() <= 0.95 * CENTER.y + 1e-3);
            // Direction preserved per axis.
            let raw_offset = raw - CENTER;
            assert!(offset.x * raw_offset.x >= 0.0);
            assert!(offset.y * raw_offset.y >= 0.0);
        }
    }

    #[test]
    fn distance_formats_match_magnitude() {
        assert_eq!(format_distance(12.34), "12.3");
        assert_eq!(format_distance(734.0), "734");
        assert_eq!(format_distance(15_000.0), "15.0k");
    }

    #[test]
    fn blip_label_includes_name_and_distance() {
        assert_eq!(blip_label("Meridian", 734.0), "Meridian (734)");
    }

    #[test]
    fn coord_text_one_decimal() {
        assert_eq!(coord_text(Vec2::new(12.34, -5.0)), "(12.3, -5.0)");
    }

    #[test]
    fn hover_inclusive_at_radius() {
        let blip = Vec2::new(100.0, 100.0);
        assert!(is_hovered(Some(Vec2::new(130.0, 100.0)), blip));
        assert!(!is_hovered(Some(Vec2::new(131.0, 100.0)), blip));
        assert!(!is_hovered(None, blip));
    }

    #[test]
    fn label_sides_flip_at_midline() {
        let dimensions = Vec2::new(40.0, 16.0);
        let left = label_offset(Vec2::new(60.0, 128.0), 256.0, dimensions);
        assert_close(left.x, RADAR_BLIP_SIZE * 0.7);
        let right = label_offset(Vec2::new(200.0, 128.0), 256.0, dimensions);
        assert_close(right.x, -dimensions.x - RADAR_BLIP_SIZE * 0.7);
        assert_close(left.y, -8.0);
    }

    #[test]
    fn coord_offset_mirrors_label_side_rule() {
        let dimensions = Vec2::new(30.0, 12.0);
        let right = coord_offset(Vec2::new(200.0, 128.0), 256.0, dimensions);
        assert_close(right.x, -dimensions.x - RADAR_BLIP_SIZE * 0.7 / 0.7);
        assert_close(right.y, 6.0);
    }

    #[test]
    fn should_draw_label_gates() {
        // Inside the viewport: always.
        assert!(should_draw_label(false, true, false));
        // Clamped player shuttle, no hover: suppressed.
        assert!(!should_draw_label(true, true, false));
        // Clamped point of interest: still labeled.
        assert!(should_draw_label(true, false, false));
        // Hover overrides.
        assert!(should_draw_label(true, true, true));
    }

    #[test]
    fn markers_follow_labels_in_buffer() {
        let mut buffer = DrawBuffer::default();
        emit_blip_labels(
            &mut buffer,
            Vec2::new(60.0, 60.0),
            256.0,
            1.0,
            "Meridian",
            120.0,
            Vec2::new(40.0, -3.0),
            Color::WHITE,
            true,
            false,
        );
        let records = vec![BlipRecord {
            outside: false,
            position: Vec2::new(60.0, 60.0),
            direction: Vec2::new(-68.0, -68.0),
            color: Color::WHITE,
        }];
        draw_blip_markers(&mut buffer, &records, 1.0);

        let ops = buffer.ops();
        // Name label + hover coords, then the marker.
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[0], DrawOp::Text { .. }));
        assert!(matches!(ops[1], DrawOp::Text { .. }));
        assert!(matches!(ops[2], DrawOp::FilledRect { .. }));
    }

    #[test]
    fn hidden_coords_emit_single_label() {
        let mut buffer = DrawBuffer::default();
        emit_blip_labels(
            &mut buffer,
            Vec2::new(60.0, 60.0),
            256.0,
            1.0,
            "Meridian",
            120.0,
            Vec2::ZERO,
            Color::WHITE,
            true,
            true,
        );
        assert_eq!(buffer.ops().len(), 1);
    }
}
