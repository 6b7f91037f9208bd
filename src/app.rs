//! Plugin composition and frame ordering.
//!
//! Every subsystem registers its own resources and systems; this plugin only adds them in one
//! place and chains the `GameSet`s so a `Playing` frame always runs input, then the world step,
//! then the systems that present its results.

use bevy::prelude::*;

use crate::audio::GameAudioPlugin;
use crate::camera::{CameraPlugin, FollowCamera};
use crate::config::ConfigPlugin;
use crate::input::InputPlugin;
use crate::level::LevelPlugin;
use crate::render::RenderPlugin;
use crate::state::{toggle_pause, GameSet, GameState};
use crate::transition::TransitionPlugin;
use crate::ui::UiPlugin;
use crate::world::WorldPlugin;

/// Bundles every gameplay plugin into a single unit that can be added to the Bevy `App`.
pub struct GrasslandPlatformerPlugin;

impl Plugin for GrasslandPlatformerPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_plugins((
                ConfigPlugin,     // Tuning tables; must come before the world.
                LevelPlugin,      // Asset readiness gate.
                InputPlugin,      // Device sampling into `InputSnapshot`.
                WorldPlugin,      // The simulation itself.
                CameraPlugin,
                RenderPlugin,     // Coloured rectangles for every entity.
                GameAudioPlugin,
                TransitionPlugin, // Fade on level change.
                UiPlugin,         // HUD, pause overlay, end banners.
            ))
            .configure_sets(
                Update,
                (GameSet::Input, GameSet::Simulation, GameSet::Effects)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Startup, setup_camera)
            .add_systems(Update, toggle_pause);
    }
}

/// Spawns the 2D camera tagged with `FollowCamera` so the follow system can find it.
fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2dBundle::default(),
        FollowCamera,
    ));
}
