//! Deferred drawing surface for the radar control.
//!
//! The frame renderer appends [`DrawOp`]s to the [`DrawBuffer`]; the
//! presenter executes them once per frame. Buffer order is paint order,
//! which is what lets markers defer until after label layout.

use bevy::prelude::*;

/// Base font size for radar text at scale 1.0.
pub const LABEL_FONT_SIZE: f32 = 14.0;

// Monospace advance/line-height ratios used to estimate text dimensions.
const GLYPH_ADVANCE: f32 = 0.6;
const LINE_HEIGHT: f32 = 1.2;

/// One deferred drawing primitive, in control-relative pixels.
#[derive(Clone, Debug)]
pub enum DrawOp {
    LineStrip {
        points: Vec<Vec2>,
        color: Color,
    },
    FilledRect {
        center: Vec2,
        half_extents: Vec2,
        rotation: f32,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
        filled: bool,
    },
    Text {
        position: Vec2,
        text: String,
        scale: f32,
        color: Color,
    },
}

#[derive(Resource, Default)]
pub struct DrawBuffer {
    ops: Vec<DrawOp>,
}

impl DrawBuffer {
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn line_strip(&mut self, points: Vec<Vec2>, color: Color) {
        if points.len() >= 2 {
            self.ops.push(DrawOp::LineStrip { points, color });
        }
    }

    pub fn filled_rect(&mut self, center: Vec2, half_extents: Vec2, rotation: f32, color: Color) {
        self.ops.push(DrawOp::FilledRect {
            center,
            half_extents,
            rotation,
            color,
        });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color, filled: bool) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
            filled,
        });
    }

    pub fn text(&mut self, position: Vec2, text: impl Into<String>, scale: f32, color: Color) {
        self.ops.push(DrawOp::Text {
            position,
            text: text.into(),
            scale,
            color,
        });
    }
}

/// The fixed screen rectangle the radar occupies, plus the UI scale used
/// when converting between logical and physical pixels.
#[derive(Resource)]
pub struct RadarGeometry {
    /// Top-left corner of the control in window pixels.
    pub origin: Vec2,
    /// Control size in logical pixels.
    pub size: Vec2,
    pub ui_scale: f32,
}

impl Default for RadarGeometry {
    fn default() -> Self {
        Self {
            origin: Vec2::new(24.0, 24.0),
            size: Vec2::new(256.0, 256.0),
            ui_scale: 1.0,
        }
    }
}

impl RadarGeometry {
    /// Viewport center in logical pixels.
    pub fn midpoint(&self) -> Vec2 {
        self.size / 2.0
    }

    /// Pixels per world unit at the given radar range.
    pub fn minimap_scale(&self, range: f32) -> f32 {
        if range > 0.0 {
            (self.size.x.min(self.size.y) / 2.0) / range
        } else {
            0.0
        }
    }

    /// Backing disk radius in pixels.
    pub fn disk_radius(&self) -> f32 {
        self.size.x.min(self.size.y) / 2.0
    }

    pub fn contains(&self, control_pos: Vec2) -> bool {
        control_pos.x >= 0.0
            && control_pos.y >= 0.0
            && control_pos.x <= self.size.x
            && control_pos.y <= self.size.y
    }
}

/// Estimated pixel dimensions of radar text. Stands in for backend text
/// measurement; the radar font is monospace.
pub fn text_dimensions(text: &str, scale: f32) -> Vec2 {
    let chars = text.chars().count() as f32;
    Vec2::new(
        chars * LABEL_FONT_SIZE * GLYPH_ADVANCE * scale,
        LABEL_FONT_SIZE * LINE_HEIGHT * scale,
    )
}

// =============================================================================
// Tests
// =============================================================================
