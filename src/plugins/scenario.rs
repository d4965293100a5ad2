//! Scenario plugin: loads the demo sector from RON, spawns grid entities,
//! and feeds the radar whole-state snapshots the way a network layer would.

use bevy::prelude::*;
use std::collections::HashMap;
use std::fs;

use crate::compat::SpatialBundle;
use crate::grids::{ControlledGrid, Grid, HelmConsole, IffData};
use crate::plugins::radar::{
    DockState, NavSnapshot, PendingSnapshot, RadarAnchor, RadarState,
};

const SCENARIO_PATH: &str = "assets/scenarios/patrol.ron";

/// Seconds between re-emitted snapshots; stands in for the network tick.
const SNAPSHOT_INTERVAL: f32 = 0.5;

pub struct ScenarioPlugin;

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SnapshotSource>()
            .init_resource::<SnapshotTimer>()
            .add_systems(Startup, load_scenario)
            .add_systems(Update, (drift_grids, emit_snapshots));
    }
}

// =============================================================================
// Resources & Components
// =============================================================================

/// The canonical snapshot the feed re-emits each interval.
#[derive(Resource, Default)]
pub struct SnapshotSource(pub NavSnapshot);

#[derive(Resource)]
pub struct SnapshotTimer(pub Timer);

impl Default for SnapshotTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(SNAPSHOT_INTERVAL, TimerMode::Repeating))
    }
}

/// Slow constant motion for non-controlled grids so the radar is live.
#[derive(Component)]
pub struct Drift {
    pub velocity: Vec2,
    pub spin: f32,
}

// =============================================================================
// Scenario file format
// =============================================================================

fn default_true() -> bool {
    true
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ScenarioFile {
    /// Name of the grid the helm controls.
    controlled: String,
    rotation: f32,
    max_range: f32,
    #[serde(default)]
    anchor_offset_x: f32,
    #[serde(default)]
    anchor_offset_y: f32,
    #[serde(default = "default_true")]
    rotate_with_entity: bool,
    #[serde(default)]
    max_iff_distance: Option<f32>,
    #[serde(default)]
    hide_coords: bool,
    #[serde(default)]
    console: Option<ScenarioConsole>,
    grids: Vec<ScenarioGrid>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ScenarioConsole {
    x: f32,
    y: f32,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ScenarioGrid {
    name: String,
    x: f32,
    y: f32,
    #[serde(default)]
    rotation: f32,
    outline: Vec<ScenarioPoint>,
    #[serde(default)]
    iff: Option<ScenarioIff>,
    #[serde(default)]
    docks: Vec<ScenarioDock>,
    #[serde(default)]
    drift_x: f32,
    #[serde(default)]
    drift_y: f32,
    #[serde(default)]
    spin: f32,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ScenarioPoint {
    x: f32,
    y: f32,
}

#[derive(serde::Serialize, serde::Deserialize, Default)]
struct ScenarioIff {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    color: Option<ScenarioColor>,
    #[serde(default)]
    hide_label: bool,
    #[serde(default)]
    player_shuttle: bool,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy)]
struct ScenarioColor {
    r: f32,
    g: f32,
    b: f32,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ScenarioDock {
    x: f32,
    y: f32,
    color: ScenarioColor,
    #[serde(default)]
    label: Option<String>,
}

fn scenario_color(color: ScenarioColor) -> Color {
    Color::srgb(color.r, color.g, color.b)
}

fn outline_points(points: &[ScenarioPoint]) -> Vec<Vec2> {
    points.iter().map(|point| Vec2::new(point.x, point.y)).collect()
}

// =============================================================================
// Systems
// =============================================================================

fn load_scenario(
    mut commands: Commands,
    mut state: ResMut<RadarState>,
    mut source: ResMut<SnapshotSource>,
    mut pending: ResMut<PendingSnapshot>,
) {
    let file = match fs::read_to_string(SCENARIO_PATH) {
        Ok(contents) => match ron::from_str::<ScenarioFile>(&contents) {
            Ok(file) => file,
            Err(error) => {
                warn!("scenario parse failed ({}), using built-in", error);
                builtin_scenario()
            }
        },
        Err(_) => {
            info!("no scenario at {}, using built-in", SCENARIO_PATH);
            builtin_scenario()
        }
    };

    let mut by_name = HashMap::new();
    let mut docks = HashMap::new();

    for grid in &file.grids {
        let transform = Transform::from_xyz(grid.x, grid.y, 0.0)
            .with_rotation(Quat::from_rotation_z(grid.rotation));
        let mut entity = commands.spawn((
            SpatialBundle::from_transform(transform),
            Grid::from_outline(outline_points(&grid.outline)),
            Name::new(grid.name.clone()),
        ));

        if let Some(iff) = &grid.iff {
            entity.insert(IffData {
                label: iff.label.clone(),
                color: iff.color.map(scenario_color),
                hide_label: iff.hide_label,
                player_shuttle: iff.player_shuttle,
            });
        }
        if grid.drift_x != 0.0 || grid.drift_y != 0.0 || grid.spin != 0.0 {
            entity.insert(Drift {
                velocity: Vec2::new(grid.drift_x, grid.drift_y),
                spin: grid.spin,
            });
        }

        let id = entity.id();
        by_name.insert(grid.name.clone(), id);
        if !grid.docks.is_empty() {
            let ports = grid
                .docks
                .iter()
                .map(|dock| DockState {
                    position: Vec2::new(dock.x, dock.y),
                    color: scenario_color(dock.color),
                    label: dock.label.clone(),
                })
                .collect::<Vec<_>>();
            docks.insert(id, ports);
        }
    }

    let Some(&controlled) = by_name.get(&file.controlled) else {
        warn!(
            "scenario names unknown controlled grid '{}'; radar stays idle",
            file.controlled
        );
        return;
    };
    commands.entity(controlled).insert(ControlledGrid);

    if let Some(console) = &file.console {
        let console_entity = commands
            .spawn((
                SpatialBundle::from_transform(Transform::from_xyz(console.x, console.y, 0.0)),
                HelmConsole,
                Name::new("Helm Console"),
            ))
            .id();
        state.console = Some(console_entity);
    }

    let snapshot = NavSnapshot {
        anchor: Some(RadarAnchor {
            entity: controlled,
            offset: Vec2::new(file.anchor_offset_x, file.anchor_offset_y),
        }),
        rotation: Some(file.rotation),
        max_range: file.max_range,
        rotate_with_entity: file.rotate_with_entity,
        max_iff_distance: file.max_iff_distance,
        hide_coords: file.hide_coords,
        docks,
    };
    source.0 = snapshot.clone();
    pending.0 = Some(snapshot);
}

fn drift_grids(
    time: Res<Time>,
    mut grids: Query<(&mut Transform, &Drift), Without<ControlledGrid>>,
) {
    let delta = time.delta_secs();
    for (mut transform, drift) in grids.iter_mut() {
        transform.translation.x += drift.velocity.x * delta;
        transform.translation.y += drift.velocity.y * delta;
        if drift.spin != 0.0 {
            transform.rotate_z(drift.spin * delta);
        }
    }
}

/// Re-stages the canonical snapshot on the network tick; the ingester
/// applies it atomically before the next draw.
fn emit_snapshots(
    time: Res<Time>,
    mut timer: ResMut<SnapshotTimer>,
    source: Res<SnapshotSource>,
    mut pending: ResMut<PendingSnapshot>,
) {
    timer.0.tick(time.delta());
    if timer.0.just_finished() && source.0.anchor.is_some() {
        pending.0 = Some(source.0.clone());
    }
}

// =============================================================================
// Built-in scenario
// =============================================================================

fn builtin_scenario() -> ScenarioFile {
    let hull = vec![
        ScenarioPoint { x: 0.0, y: 6.0 },
        ScenarioPoint { x: 3.0, y: -4.0 },
        ScenarioPoint { x: 0.0, y: -2.0 },
        ScenarioPoint { x: -3.0, y: -4.0 },
        ScenarioPoint { x: 0.0, y: 6.0 },
    ];
    let station_ring = vec![
        ScenarioPoint { x: -8.0, y: -8.0 },
        ScenarioPoint { x: 8.0, y: -8.0 },
        ScenarioPoint { x: 8.0, y: 8.0 },
        ScenarioPoint { x: -8.0, y: 8.0 },
        ScenarioPoint { x: -8.0, y: -8.0 },
    ];

    ScenarioFile {
        controlled: "NX Aurora".to_string(),
        rotation: 0.0,
        max_range: 256.0,
        anchor_offset_x: 0.0,
        anchor_offset_y: 0.0,
        rotate_with_entity: true,
        max_iff_distance: None,
        hide_coords: false,
        console: Some(ScenarioConsole { x: 14.0, y: -6.0 }),
        grids: vec![
            ScenarioGrid {
                name: "NX Aurora".to_string(),
                x: 0.0,
                y: 0.0,
                rotation: 0.0,
                outline: hull.clone(),
                iff: None,
                docks: vec![
                    ScenarioDock {
                        x: 2.5,
                        y: -3.0,
                        color: ScenarioColor { r: 0.9, g: 0.2, b: 0.8 },
                        label: Some("Bay 1".to_string()),
                    },
                    ScenarioDock {
                        x: -2.5,
                        y: -3.0,
                        color: ScenarioColor { r: 0.9, g: 0.2, b: 0.8 },
                        label: Some("Bay 1".to_string()),
                    },
                ],
                drift_x: 0.0,
                drift_y: 0.0,
                spin: 0.0,
            },
            ScenarioGrid {
                name: "Meridian Station".to_string(),
                x: 90.0,
                y: 55.0,
                rotation: 0.4,
                outline: station_ring,
                iff: Some(ScenarioIff {
                    label: Some("Meridian Station".to_string()),
                    color: Some(ScenarioColor { r: 1.0, g: 0.75, b: 0.0 }),
                    ..Default::default()
                }),
                docks: vec![
                    ScenarioDock {
                        x: 8.0,
                        y: 0.0,
                        color: ScenarioColor { r: 0.2, g: 0.8, b: 0.9 },
                        label: Some("Cargo".to_string()),
                    },
                    ScenarioDock {
                        x: -8.0,
                        y: 0.0,
                        color: ScenarioColor { r: 0.2, g: 0.8, b: 0.9 },
                        label: Some("Cargo".to_string()),
                    },
                ],
                drift_x: 0.0,
                drift_y: 0.0,
                spin: 0.05,
            },
            ScenarioGrid {
                name: "Carthage".to_string(),
                x: -140.0,
                y: -60.0,
                rotation: 1.1,
                outline: hull.clone(),
                iff: Some(ScenarioIff {
                    label: Some("Carthage".to_string()),
                    color: Some(ScenarioColor { r: 0.3, g: 0.6, b: 1.0 }),
                    player_shuttle: true,
                    ..Default::default()
                }),
                docks: Vec::new(),
                drift_x: 3.0,
                drift_y: 1.5,
                spin: 0.0,
            },
            ScenarioGrid {
                name: "Silent Drift".to_string(),
                x: 60.0,
                y: -180.0,
                rotation: 0.0,
                outline: hull.clone(),
                iff: Some(ScenarioIff {
                    label: Some("Silent Drift".to_string()),
                    hide_label: true,
                    ..Default::default()
                }),
                docks: Vec::new(),
                drift_x: -2.0,
                drift_y: 0.5,
                spin: 0.0,
            },
            ScenarioGrid {
                name: "Relay Beacon".to_string(),
                x: 420.0,
                y: 390.0,
                rotation: 0.0,
                outline: hull,
                iff: Some(ScenarioIff {
                    label: Some("Relay Beacon".to_string()),
                    color: Some(ScenarioColor { r: 0.7, g: 0.7, b: 0.7 }),
                    ..Default::default()
                }),
                docks: Vec::new(),
                drift_x: 0.0,
                drift_y: 0.0,
                spin: 0.0,
            },
        ],
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenario_names_its_controlled_grid() {
        let file = builtin_scenario();
        assert!(file.grids.iter().any(|grid| grid.name == file.controlled));
    }

    #[test]
    fn builtin_scenario_round_trips_through_ron() {
        let file = builtin_scenario();
        let text = ron::to_string(&file).expect("serialize");
        let parsed: ScenarioFile = ron::from_str(&text).expect("parse");
        assert_eq!(parsed.controlled, file.controlled);
        assert_eq!(parsed.grids.len(), file.grids.len());
    }

    #[test]
    fn minimal_scenario_parses_with_defaults() {
        let text = r#"(
            controlled: "Lone",
            rotation: 0.0,
            max_range: 128.0,
            grids: [(
                name: "Lone",
                x: 0.0,
                y: 0.0,
                outline: [(x: -1.0, y: 0.0), (x: 1.0, y: 0.0)],
            )],
        )"#;
        let file: ScenarioFile = ron::from_str(text).expect("parse minimal");
        assert!(file.rotate_with_entity);
        assert!(file.max_iff_distance.is_none());
        assert!(file.console.is_none());
        assert!(file.grids[0].docks.is_empty());
    }

    #[test]
    fn scenario_color_maps_to_srgb() {
        let color = scenario_color(ScenarioColor { r: 1.0, g: 0.5, b: 0.0 });
        let srgba = color.to_srgba();
        assert!((srgba.red - 1.0).abs() < 1e-6);
        assert!((srgba.green - 0.5).abs() < 1e-6);
    }

    #[test]
    fn outline_points_preserve_order() {
        let points = outline_points(&[
            ScenarioPoint { x: 1.0, y: 2.0 },
            ScenarioPoint { x: 3.0, y: 4.0 },
        ]);
        assert_eq!(points, vec![Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)]);
    }
}
