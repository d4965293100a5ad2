use bevy::math::Affine2;
use bevy::prelude::*;

/// IFF color used when a grid carries no identification data.
pub const DEFAULT_IFF_COLOR: Color = Color::srgb(1.0, 0.753, 0.0);

/// IFF color for the controlled grid itself.
pub const SELF_IFF_COLOR: Color = Color::srgb(0.0, 0.98, 0.6);

/// A movable vessel or station that the radar can locate and render.
///
/// The silhouette outline is a closed line strip in grid-local units; the
/// local AABB bounds it and drives the detail cull.
#[derive(Component, Clone)]
pub struct Grid {
    pub outline: Vec<Vec2>,
    pub local_aabb: Rect,
    /// Center of mass in grid-local units; blips anchor here.
    pub local_center: Vec2,
}

impl Grid {
    pub fn from_outline(outline: Vec<Vec2>) -> Self {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for point in &outline {
            min = min.min(*point);
            max = max.max(*point);
        }
        if outline.is_empty() {
            min = Vec2::ZERO;
            max = Vec2::ZERO;
        }
        let local_aabb = Rect { min, max };
        Self {
            outline,
            local_aabb,
            local_center: local_aabb.center(),
        }
    }

    pub fn has_shape(&self) -> bool {
        self.outline.len() >= 2
    }
}

/// Identification metadata for a grid. Owned externally, read-only during
/// a frame.
#[derive(Component, Clone, Debug, Default)]
pub struct IffData {
    pub label: Option<String>,
    pub color: Option<Color>,
    pub hide_label: bool,
    pub player_shuttle: bool,
}

impl IffData {
    pub fn named(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }
}

/// Marker for the grid the helm currently controls.
#[derive(Component)]
pub struct ControlledGrid;

/// Marker for the console entity driving the radar, when it is a separate
/// entity from the anchor grid.
#[derive(Component)]
pub struct HelmConsole;

// =============================================================================
// Utility Functions
// =============================================================================

/// Display color for a grid's blip and silhouette.
pub fn iff_color(iff: Option<&IffData>, is_self: bool) -> Color {
    if is_self {
        return SELF_IFF_COLOR;
    }
    match iff.and_then(|data| data.color) {
        Some(color) => color,
        None => DEFAULT_IFF_COLOR,
    }
}

/// Display label for a grid, if identification data names one.
pub fn iff_label(iff: Option<&IffData>) -> Option<&str> {
    iff.and_then(|data| data.label.as_deref())
}

/// 2D affine of an entity's world transform (translation + Z rotation).
pub fn grid_affine(transform: &Transform) -> Affine2 {
    let angle = transform.rotation.to_euler(EulerRot::ZYX).0;
    Affine2::from_angle_translation(angle, transform.translation.truncate())
}

/// World-space AABB of a local rect mapped through an affine.
pub fn world_aabb(affine: Affine2, local: Rect) -> Rect {
    let corners = [
        local.min,
        Vec2::new(local.max.x, local.min.y),
        local.max,
        Vec2::new(local.min.x, local.max.y),
    ];
    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    for corner in corners {
        let mapped = affine.transform_point2(corner);
        min = min.min(mapped);
        max = max.max(mapped);
    }
    Rect { min, max }
}

pub fn aabbs_intersect(a: Rect, b: Rect) -> bool {
    a.min.x <= b.max.x && b.min.x <= a.max.x && a.min.y <= b.max.y && b.min.y <= a.max.y
}

/// Stand-in for the external spatial index: grid handles whose world AABB
/// intersects a world-space query box.
pub fn grids_intersecting<'a>(
    query_box: Rect,
    grids: impl Iterator<Item = (Entity, &'a Transform, &'a Grid)>,
) -> Vec<Entity> {
    let mut found = Vec::new();
    for (entity, transform, grid) in grids {
        let aabb = world_aabb(grid_affine(transform), grid.local_aabb);
        if aabbs_intersect(aabb, query_box) {
            found.push(entity);
        }
    }
    found
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        let diff = (a - b).abs();
        assert!(diff < 1e-4, "expected {} close to {}", a, b);
    }

    fn square_outline(half: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
            Vec2::new(-half, -half),
        ]
    }

    #[test]
    fn grid_from_outline_bounds_and_center() {
        let grid = Grid::from_outline(square_outline(3.0));
        assert_close(grid.local_aabb.min.x, -3.0);
        assert_close(grid.local_aabb.max.y, 3.0);
        assert_close(grid.local_center.x, 0.0);
        assert!(grid.has_shape());
    }

    #[test]
    fn empty_outline_has_no_shape() {
        let grid = Grid::from_outline(Vec::new());
        assert!(!grid.has_shape());
    }

    #[test]
    fn world_aabb_grows_under_rotation() {
        let local = Rect {
            min: Vec2::splat(-1.0),
            max: Vec2::splat(1.0),
        };
        let rotated = world_aabb(Affine2::from_angle(std::f32::consts::FRAC_PI_4), local);
        let expected = 2f32.sqrt();
        assert_close(rotated.max.x, expected);
        assert_close(rotated.min.y, -expected);
    }

    #[test]
    fn world_aabb_translates() {
        let local = Rect {
            min: Vec2::splat(-1.0),
            max: Vec2::splat(1.0),
        };
        let moved = world_aabb(Affine2::from_translation(Vec2::new(10.0, -5.0)), local);
        assert_close(moved.min.x, 9.0);
        assert_close(moved.max.y, -4.0);
    }

    #[test]
    fn aabbs_touching_edges_intersect() {
        let a = Rect {
            min: Vec2::ZERO,
            max: Vec2::splat(1.0),
        };
        let b = Rect {
            min: Vec2::new(1.0, 0.0),
            max: Vec2::new(2.0, 1.0),
        };
        assert!(aabbs_intersect(a, b));
    }

    #[test]
    fn aabbs_apart_do_not_intersect() {
        let a = Rect {
            min: Vec2::ZERO,
            max: Vec2::splat(1.0),
        };
        let b = Rect {
            min: Vec2::splat(1.5),
            max: Vec2::splat(2.0),
        };
        assert!(!aabbs_intersect(a, b));
    }

    #[test]
    fn iff_color_prefers_self() {
        let iff = IffData {
            color: Some(Color::srgb(1.0, 0.0, 0.0)),
            ..Default::default()
        };
        let color = iff_color(Some(&iff), true);
        assert_eq!(color, SELF_IFF_COLOR);
    }

    #[test]
    fn iff_color_falls_back_to_default() {
        assert_eq!(iff_color(None, false), DEFAULT_IFF_COLOR);
    }

    #[test]
    fn iff_label_reads_name() {
        let iff = IffData::named("Waypoint Echo");
        assert_eq!(iff_label(Some(&iff)), Some("Waypoint Echo"));
        assert_eq!(iff_label(None), None);
    }
}
