//! Executes the deferred draw buffer on Bevy: gizmo line work, per-frame
//! sprite rects, and per-frame absolutely positioned text nodes.

use bevy::prelude::*;
use bevy::ui::Node as UiNode;
use std::path::Path;

use crate::compat::{Camera2dBundle, SpriteBundle, TextBundle, TextStyle};

use super::surface::{DrawBuffer, DrawOp, RadarGeometry, LABEL_FONT_SIZE};

/// Ring spacing used to approximate filled circles with gizmo rings.
const FILL_RING_STEP: f32 = 1.5;

#[derive(Component)]
pub struct RadarSprite;

#[derive(Component)]
pub struct RadarLabel;

// =============================================================================
// Systems
// =============================================================================

pub fn setup_radar_camera(mut commands: Commands) {
    commands.spawn((Camera2dBundle::default(), Name::new("RadarCamera")));
}

pub fn present_draw_buffer(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    buffer: Res<DrawBuffer>,
    geometry: Res<RadarGeometry>,
    mut gizmos: Gizmos,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    sprites: Query<Entity, With<RadarSprite>>,
    labels: Query<Entity, With<RadarLabel>>,
) {
    for entity in sprites.iter() {
        commands.entity(entity).despawn();
    }
    for entity in labels.iter() {
        commands.entity(entity).despawn();
    }

    let (camera, camera_transform) = match cameras.single() {
        Ok(value) => value,
        Err(_) => {
            return;
        }
    };

    // Control pixels to window-logical, then into the camera's world.
    let to_logical = |point: Vec2| geometry.origin + point / geometry.ui_scale;
    let to_world = |point: Vec2| {
        camera
            .viewport_to_world_2d(camera_transform, to_logical(point))
            .ok()
    };

    let font_path = "fonts/SpaceMono-Regular.ttf";
    let font_available = Path::new("assets").join(font_path).exists();
    let font = asset_server.load(font_path);

    let mut depth = 0.0f32;
    for op in buffer.ops() {
        depth += 0.01;
        match op {
            DrawOp::LineStrip { points, color } => {
                let world: Option<Vec<Vec2>> =
                    points.iter().map(|point| to_world(*point)).collect();
                if let Some(world) = world {
                    gizmos.linestrip_2d(world, *color);
                }
            }
            DrawOp::Circle {
                center,
                radius,
                color,
                filled,
            } => {
                let Some(center_world) = to_world(*center) else {
                    continue;
                };
                let Some(edge_world) = to_world(*center + Vec2::new(*radius, 0.0)) else {
                    continue;
                };
                let radius_world = center_world.distance(edge_world);
                if *filled {
                    let rings = (radius_world / FILL_RING_STEP).ceil().max(1.0) as u32;
                    for ring in 1..=rings {
                        gizmos.circle_2d(
                            center_world,
                            radius_world * ring as f32 / rings as f32,
                            *color,
                        );
                    }
                } else {
                    gizmos.circle_2d(center_world, radius_world, *color);
                }
            }
            DrawOp::FilledRect {
                center,
                half_extents,
                rotation,
                color,
            } => {
                let axis = Vec2::from_angle(*rotation);
                let Some(center_world) = to_world(*center) else {
                    continue;
                };
                let Some(x_world) = to_world(*center + axis * half_extents.x) else {
                    continue;
                };
                let Some(y_world) = to_world(*center + axis.perp() * half_extents.y) else {
                    continue;
                };
                let half_x = x_world - center_world;
                let half_y = y_world - center_world;

                commands.spawn((
                    RadarSprite,
                    SpriteBundle {
                        sprite: Sprite {
                            color: *color,
                            custom_size: Some(Vec2::new(
                                half_x.length() * 2.0,
                                half_y.length() * 2.0,
                            )),
                            ..default()
                        },
                        transform: Transform::from_translation(
                            center_world.extend(1.0 + depth),
                        )
                        .with_rotation(Quat::from_rotation_z(half_x.to_angle())),
                        ..default()
                    },
                ));
            }
            DrawOp::Text {
                position,
                text,
                scale,
                color,
            } => {
                if !font_available {
                    continue;
                }
                let logical = to_logical(*position);
                commands.spawn((
                    RadarLabel,
                    TextBundle::from_section(
                        text.clone(),
                        TextStyle {
                            font: font.clone(),
                            font_size: LABEL_FONT_SIZE * scale,
                            color: *color,
                        },
                    )
                    .with_node(UiNode {
                        position_type: PositionType::Absolute,
                        left: Val::Px(logical.x),
                        top: Val::Px(logical.y),
                        ..default()
                    }),
                ));
            }
        }
    }
}
