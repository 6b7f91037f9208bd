//! Camera follow. Keeps the player centred while never showing anything left of the world's
//! start, right of the last built chunk, above the sky or below the world height.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::render::to_screen;
use crate::state::GameSet;
use crate::world::GameWorld;

/// Registers the camera-follow system.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            follow_player_camera
                .after(GameSet::Simulation)
                .run_if(resource_exists::<GameWorld>),
        );
    }
}

/// Marker component so the follow system can locate the camera entity without relying on names.
#[derive(Component)]
pub struct FollowCamera;

/// Centre of the view in simulation coordinates, clamped to the world rectangle.
pub fn clamp_view_center(
    player_center: Vec2,
    half_view: Vec2,
    world_right: f32,
    world_height: f32,
) -> Vec2 {
    let clamp_axis = |value: f32, half: f32, extent: f32| {
        if extent > half * 2.0 {
            value.clamp(half, extent - half)
        } else {
            half
        }
    };

    Vec2::new(
        clamp_axis(player_center.x, half_view.x, world_right),
        clamp_axis(player_center.y, half_view.y, world_height),
    )
}

/// Sizes the projection to the fixed view height and eases the camera toward the clamped view
/// centre with exponential smoothing.
fn follow_player_camera(
    mut camera_query: Query<(&mut Transform, &mut OrthographicProjection), With<FollowCamera>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    world: Res<GameWorld>,
    time: Res<Time>,
) {
    let Ok((mut camera_transform, mut projection)) = camera_query.get_single_mut() else {
        return;
    };
    let Ok(window) = window_query.get_single() else {
        return;
    };

    let view = &world.tuning().world;
    let window_height = window.resolution.height();
    if window_height > 0.0 {
        projection.scale = view.view_height / window_height;
    }

    let half_view = Vec2::new(
        window.resolution.width() * 0.5 * projection.scale,
        window_height * 0.5 * projection.scale,
    );
    let center = clamp_view_center(
        world.player.body.center(),
        half_view,
        world.world_right(),
        view.world_height,
    );

    let desired = to_screen(center).extend(camera_transform.translation.z);
    let follow_speed = 8.0;
    let lerp_t = 1.0 - f32::exp(-follow_speed * time.delta_seconds());
    camera_transform.translation = camera_transform.translation.lerp(desired, lerp_t);
}
