//! First-person walk demo - renders a small level and walks the camera through it
//!
//! Click to capture the pointer, move with Z/Q/S/D (configurable), Escape to release,
//! `+` / `-` to change look sensitivity.

mod camera;
mod input;
mod level;

use std::path::PathBuf;

use bevy::math::DVec3;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use fps_shared::{configure, ControllerConfig, ControllerError, FirstPersonController};

use input::{ApplyPointerLock, CollectInput};

/// Overrides where the controller config is read from
const CONFIG_ENV_VAR: &str = "FPS_CONTROLLER_CONFIG";

const CONFIG_FILE_NAME: &str = "controller.ron";

/// Where the player stands when the level loads
const SPAWN_POSITION: DVec3 = DVec3::ZERO;

/// Find the controller config: env override, then bundled assets, then the dev assets folder
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    // Try to find assets relative to executable (for .app bundles)
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let bundled = exe_dir.join("assets").join(CONFIG_FILE_NAME);
            if bundled.exists() {
                return Some(bundled);
            }
        }
    }

    // `cargo run` sets the manifest dir; fall back to the working directory otherwise
    let base = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_default();
    let dev = base.join("assets").join(CONFIG_FILE_NAME);
    dev.exists().then_some(dev)
}

fn load_controller() -> Result<FirstPersonController, ControllerError> {
    let config = match config_path() {
        Some(path) => ControllerConfig::load(path)?,
        None => {
            info!("No {} found, using default controller config", CONFIG_FILE_NAME);
            ControllerConfig::default()
        }
    };
    configure(&config)
}

/// Build the controller from config, falling back to defaults if the config is unusable
fn setup_controller(mut commands: Commands) {
    let controller = load_controller().or_else(|err| {
        warn!("Controller config rejected ({err}), falling back to defaults");
        configure(&ControllerConfig::default())
    });

    match controller {
        Ok(controller) => {
            commands.insert_resource(controller.with_position(SPAWN_POSITION));
        }
        Err(err) => error!("Could not configure the controller: {err}"),
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "First Person Walk".to_string(),
            resolution: WindowResolution::new(1280, 720),
            ..default()
        }),
        ..default()
    }));

    app.add_plugins(input::InputBridgePlugin);
    app.add_plugins(level::LevelPlugin);

    app.add_systems(Startup, (setup_controller, camera::spawn_camera).chain());

    // ORDER MATTERS: raw input -> controller step + camera -> pointer lock requests.
    app.configure_sets(Update, (CollectInput, ApplyPointerLock).chain());
    app.add_systems(
        Update,
        camera::update_camera
            .after(CollectInput)
            .before(ApplyPointerLock),
    );

    info!("Starting first-person walk demo");
    app.run();
}
