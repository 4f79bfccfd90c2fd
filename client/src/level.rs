//! Demo level: a white floor, a handful of blue boxes and a light
//!
//! Presentation only. Nothing here collides with the player.

use bevy::prelude::*;

/// Floor extent along X and Z
pub const FLOOR_SIZE: Vec2 = Vec2::new(20.0, 20.0);

/// Number of boxes scattered over the floor
const BOX_COUNT: usize = 10;

/// Marker for the level root entity
#[derive(Component)]
pub struct LevelRoot;

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK));
        app.add_systems(Startup, spawn_level);
    }
}

fn spawn_level(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let root = commands
        .spawn((
            LevelRoot,
            Transform::default(),
            GlobalTransform::default(),
            Visibility::default(),
            InheritedVisibility::default(),
        ))
        .id();

    // --- Floor ---
    let floor = commands
        .spawn((
            Mesh3d(meshes.add(Plane3d::default().mesh().size(FLOOR_SIZE.x, FLOOR_SIZE.y))),
            MeshMaterial3d(materials.add(Color::WHITE)),
            Transform::default(),
        ))
        .id();
    commands.entity(root).add_child(floor);

    // --- Boxes ---
    let box_mesh = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
    let box_material = materials.add(Color::srgb(0.0, 0.0, 1.0));
    for _ in 0..BOX_COUNT {
        let x = (rand::random::<f32>() - 0.5) * FLOOR_SIZE.x;
        let z = (rand::random::<f32>() - 0.5) * FLOOR_SIZE.y;
        let entity = commands
            .spawn((
                Mesh3d(box_mesh.clone()),
                MeshMaterial3d(box_material.clone()),
                Transform::from_xyz(x, 0.5, z),
            ))
            .id();
        commands.entity(root).add_child(entity);
    }

    // --- Lights ---
    // Point light hanging over the middle; its range only covers part of the floor.
    let point_light = commands
        .spawn((
            PointLight {
                intensity: 900_000.0,
                range: FLOOR_SIZE.x.min(FLOOR_SIZE.y) / 1.5,
                shadows_enabled: true,
                ..default()
            },
            Transform::from_xyz(0.0, 3.0, 0.0),
        ))
        .id();
    commands.entity(root).add_child(point_light);

    // Dim fill from above so the far corners aren't pitch black
    let fill_light = commands
        .spawn((
            DirectionalLight {
                illuminance: 400.0,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -1.2, 0.3, 0.0)),
        ))
        .id();
    commands.entity(root).add_child(fill_light);

    info!(
        "Level spawned: {} boxes on a {}x{} floor",
        BOX_COUNT, FLOOR_SIZE.x, FLOOR_SIZE.y
    );
}
