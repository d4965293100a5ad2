use bevy::prelude::*;

mod compat;
mod grids;
mod plugins;

fn main() {
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.04, 0.06, 0.09)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Starhelm".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins((
            plugins::core::CorePlugin,
            plugins::scenario::ScenarioPlugin,
            plugins::radar::RadarPlugin,
        ))
        .run();
}
