//! Affine transform pipeline mapping world space to the controlled
//! vessel's local frame to view-space pixels.
//!
//! All composition is in glam column-vector order: the rightmost factor
//! applies first. Screen pixels grow downward, so `local_to_view` carries
//! a negative Y scale.

use bevy::math::Affine2;
use bevy::prelude::*;

/// Determinant floor below which a composed transform counts as degenerate.
const INVERT_EPSILON: f32 = 1e-6;

/// The per-frame transform chain. Built once per frame from the anchor and
/// the controlled entity, then reused for every grid and for pointer
/// queries.
#[derive(Clone, Copy, Debug)]
pub struct RadarTransforms {
    /// Anchor-local point to absolute world coordinates.
    pub local_to_absolute: Affine2,
    /// Absolute world coordinates to the anchor-local frame.
    pub absolute_to_local: Affine2,
    /// Anchor-local point to view pixels (Y flipped, offset to midpoint).
    pub local_to_view: Affine2,
    /// Absolute world coordinates straight to view pixels.
    pub world_to_view: Affine2,
    /// Entity rotation plus anchor orientation; orients the view bounds.
    pub combined_rotation: f32,
    pub minimap_scale: f32,
    pub midpoint: Vec2,
}

impl RadarTransforms {
    /// Builds the chain, or `None` when the composition is degenerate and
    /// the frame should be skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        anchor_offset: Vec2,
        anchor_rotation: f32,
        entity_position: Vec2,
        entity_rotation: f32,
        rotate_with_entity: bool,
        minimap_scale: f32,
        midpoint: Vec2,
    ) -> Option<Self> {
        let local_to_world = Affine2::from_angle_translation(anchor_rotation, anchor_offset);
        let our_rotation = if rotate_with_entity {
            entity_rotation
        } else {
            anchor_rotation
        };
        let entity_to_world = Affine2::from_angle_translation(our_rotation, entity_position);

        // Local point lands in the anchor frame first, then the entity frame.
        let local_to_absolute = entity_to_world * local_to_world;
        let absolute_to_local = invert_guarded(local_to_absolute)?;

        let local_to_view = Affine2::from_translation(midpoint)
            * Affine2::from_scale(Vec2::new(minimap_scale, -minimap_scale));

        Some(Self {
            local_to_absolute,
            absolute_to_local,
            local_to_view,
            world_to_view: local_to_view * absolute_to_local,
            combined_rotation: our_rotation + anchor_rotation,
            minimap_scale,
            midpoint,
        })
    }

    /// Absolute world position of the anchor (the view center).
    pub fn anchor_absolute(&self) -> Vec2 {
        self.local_to_absolute.translation
    }

    /// View transform for a grid with its own grid-to-absolute affine.
    pub fn grid_to_view(&self, grid_to_absolute: Affine2) -> Affine2 {
        self.world_to_view * grid_to_absolute
    }

    /// Anchor-local point to view pixels.
    pub fn scale_position(&self, local: Vec2) -> Vec2 {
        self.local_to_view.transform_point2(local)
    }

    /// Inverse pointer query: view pixels back to absolute world
    /// coordinates. Subtracts the midpoint, divides out the scale with Y
    /// negated, then re-expresses the local point through the anchor frame.
    pub fn view_to_world(&self, view: Vec2) -> Option<Vec2> {
        if self.minimap_scale == 0.0 {
            return None;
        }
        let offset = view - self.midpoint;
        let local = Vec2::new(offset.x, -offset.y) / self.minimap_scale;
        Some(self.local_to_absolute.transform_point2(local))
    }
}

/// Matrix inverse with a degenerate-composition guard. Valid rotation
/// components never trip it; a broken snapshot must skip the frame rather
/// than crash it.
pub fn invert_guarded(affine: Affine2) -> Option<Affine2> {
    if affine.matrix2.determinant().abs() < INVERT_EPSILON {
        return None;
    }
    Some(affine.inverse())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn assert_vec_close(a: Vec2, b: Vec2) {
        assert!(
            a.distance(b) < 1e-3,
            "expected {:?} close to {:?}",
            a,
            b
        );
    }

    fn pipeline() -> RadarTransforms {
        RadarTransforms::compute(
            Vec2::new(2.0, -1.5),
            FRAC_PI_4,
            Vec2::new(100.0, 40.0),
            FRAC_PI_2,
            true,
            0.5,
            Vec2::new(128.0, 128.0),
        )
        .expect("valid pipeline")
    }

    #[test]
    fn invert_guarded_rejects_degenerate() {
        assert!(invert_guarded(Affine2::from_scale(Vec2::ZERO)).is_none());
        assert!(invert_guarded(Affine2::from_angle(1.0)).is_some());
    }

    #[test]
    fn local_origin_maps_to_anchor_absolute() {
        let transforms = pipeline();
        let origin = transforms.local_to_absolute.transform_point2(Vec2::ZERO);
        assert_vec_close(origin, transforms.anchor_absolute());
    }

    #[test]
    fn absolute_round_trip() {
        let transforms = pipeline();
        let world = Vec2::new(87.0, 53.5);
        let local = transforms.absolute_to_local.transform_point2(world);
        let back = transforms.local_to_absolute.transform_point2(local);
        assert_vec_close(back, world);
    }

    #[test]
    fn local_to_view_flips_y() {
        let transforms = RadarTransforms::compute(
            Vec2::ZERO,
            0.0,
            Vec2::ZERO,
            0.0,
            false,
            1.0,
            Vec2::new(128.0, 128.0),
        )
        .unwrap();
        let above = transforms.scale_position(Vec2::new(0.0, 10.0));
        // World-up lands above the midpoint on a y-down screen.
        assert_vec_close(above, Vec2::new(128.0, 118.0));
    }

    #[test]
    fn pointer_round_trip_through_full_pipeline() {
        let transforms = pipeline();
        let world = Vec2::new(112.0, 31.0);
        let view = transforms.world_to_view.transform_point2(world);
        let back = transforms.view_to_world(view).expect("invertible");
        assert_vec_close(back, world);
    }

    #[test]
    fn view_to_world_at_midpoint_is_anchor() {
        let transforms = pipeline();
        let back = transforms.view_to_world(transforms.midpoint).unwrap();
        assert_vec_close(back, transforms.anchor_absolute());
    }

    #[test]
    fn grid_to_view_composes_with_grid_frame() {
        let transforms = pipeline();
        let grid_to_absolute = Affine2::from_angle_translation(0.3, Vec2::new(150.0, 10.0));
        let local_point = Vec2::new(1.0, 2.0);
        let direct = transforms
            .grid_to_view(grid_to_absolute)
            .transform_point2(local_point);
        let staged = transforms
            .world_to_view
            .transform_point2(grid_to_absolute.transform_point2(local_point));
        assert_vec_close(direct, staged);
    }

    #[test]
    fn anchor_orientation_used_when_not_rotating_with_entity() {
        let fixed = RadarTransforms::compute(
            Vec2::ZERO,
            0.25,
            Vec2::new(10.0, 0.0),
            2.0,
            false,
            1.0,
            Vec2::splat(128.0),
        )
        .unwrap();
        assert!((fixed.combined_rotation - 0.5).abs() < 1e-6);

        let rotating = RadarTransforms::compute(
            Vec2::ZERO,
            0.25,
            Vec2::new(10.0, 0.0),
            2.0,
            true,
            1.0,
            Vec2::splat(128.0),
        )
        .unwrap();
        assert!((rotating.combined_rotation - 2.25).abs() < 1e-6);
    }

    #[test]
    fn degenerate_scale_skips_frame() {
        let transforms = RadarTransforms::compute(
            Vec2::ZERO,
            0.0,
            Vec2::ZERO,
            0.0,
            false,
            0.0,
            Vec2::splat(128.0),
        )
        .unwrap();
        assert!(transforms.view_to_world(Vec2::splat(10.0)).is_none());
    }
}
