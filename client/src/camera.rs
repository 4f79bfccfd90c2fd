//! First-person camera driven by the controller
//!
//! The controller owns the player; the camera entity only ever receives the
//! transform it hands back.

use bevy::prelude::*;
use fps_shared::{FirstPersonController, InputAttachment};

/// Marker for the camera that renders the player's view
#[derive(Component)]
pub struct PlayerCamera;

/// Vertical field of view (45°)
const FOV: f32 = std::f32::consts::FRAC_PI_4;

/// Far plane: the level is 20 units across, nothing beyond needs drawing
const FAR_PLANE: f32 = 40.0;

pub fn spawn_camera(mut commands: Commands, controller: Option<Res<FirstPersonController>>) {
    let transform = controller
        .map(|controller| controller.camera_transform().to_transform())
        .unwrap_or_default();

    commands.spawn((
        PlayerCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV,
            near: 0.1,
            far: FAR_PLANE,
            ..default()
        }),
        transform,
    ));

    info!("Player camera spawned at {:?}", transform.translation);
}

/// Deliver this frame's input, advance the controller, and place the camera
pub fn update_camera(
    attachment: Option<NonSendMut<InputAttachment>>,
    controller: Option<ResMut<FirstPersonController>>,
    time: Res<Time>,
    mut camera_query: Query<&mut Transform, With<PlayerCamera>>,
) {
    let Some(mut controller) = controller else {
        return;
    };

    if let Some(mut attachment) = attachment {
        attachment.pump(&mut controller);
    }

    let camera = controller.update(time.delta_secs_f64());

    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };
    *camera_transform = camera.to_transform();
}
