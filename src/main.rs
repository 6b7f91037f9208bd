//! Grassland platformer: a side-scrolling run across five procedurally assembled levels.
//!
//! `main` only configures the window and the default plugins; gameplay lives behind
//! `GrasslandPlatformerPlugin` in `app.rs`.

mod animation;
mod app;
mod audio;
mod camera;
mod collision;
mod config;
mod enemy;
mod input;
mod level;
mod movement;
mod player;
mod projectile;
mod render;
mod state;
mod transition;
mod ui;
mod world;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod wasm;

use app::GrasslandPlatformerPlugin;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::render::texture::ImagePlugin;
use bevy::window::{Window, WindowResizeConstraints, WindowResolution};

/// Builds the window and default plugins, then hands control to `GrasslandPlatformerPlugin`.
fn main() {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    wasm::set_panic_hook();

    // 1024x576 is four times the 256x144 view, so one world pixel is a 4x4 block on screen.
    let primary_window = Window {
        title: "Grassland Platformer".to_string(),
        resolution: WindowResolution::new(1024.0, 576.0),
        resizable: true,
        resize_constraints: WindowResizeConstraints {
            min_width: 512.0,
            min_height: 288.0,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
        },
        canvas: cfg!(all(target_arch = "wasm32", feature = "web"))
            .then(|| "#bevy-canvas".to_owned()),
        ..default()
    };

    let mut default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(primary_window),
            ..default()
        })
        .set(ImagePlugin::default_nearest());

    #[cfg(not(target_arch = "wasm32"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(true),
            ..default()
        });
    }

    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(false),
            ..default()
        });
    }

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.45, 0.7, 0.9)))
        .add_plugins(default_plugins)
        .add_plugins(GrasslandPlatformerPlugin)
        .run();
}
