//! Gameplay tuning tables. Defaults live in code and mirror `assets/config/tuning.ron`; native
//! builds read that file at startup so constants can be tweaked without recompiling.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use ron::Options;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::movement::BodyPhysics;

pub const TUNING_PATH: &str = "assets/config/tuning.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub arrow: ProjectileTuning,
    #[serde(deserialize_with = "seed_table")]
    pub seed: ProjectileTuning,
    pub patroller: PatrollerTuning,
    pub brawler: BrawlerTuning,
    pub shooter: ShooterTuning,
    pub damage: DamageTable,
    pub world: WorldTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            arrow: ProjectileTuning::default(),
            seed: ProjectileTuning::seed(),
            patroller: PatrollerTuning::default(),
            brawler: BrawlerTuning::default(),
            shooter: ShooterTuning::default(),
            damage: DamageTable::default(),
            world: WorldTuning::default(),
        }
    }
}

impl Tuning {
    pub fn from_ron(source: &str, path: &str) -> Result<Self, ConfigError> {
        ron_options()
            .from_str(source)
            .map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub width: f32,
    pub height: f32,
    pub run_speed: f32,
    pub jump_velocity: f32,
    #[serde(deserialize_with = "player_physics")]
    pub physics: BodyPhysics,
    pub lives: u32,
    /// Seconds before another arrow can be fired.
    pub attack_cooldown: f32,
    pub invincibility: f32,
    /// Upward speed imparted when taking a hit.
    pub hurt_bounce: f32,
    /// Upward speed imparted after stomping an enemy.
    pub stomp_bounce: f32,
    /// Length of one flicker tick while invincible.
    pub flicker_tick: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            spawn_x: 100.0,
            spawn_y: 100.0,
            width: 16.0,
            height: 16.0,
            run_speed: 120.0,
            jump_velocity: 480.0,
            physics: BodyPhysics::default(),
            lives: 3,
            attack_cooldown: 50.0 / 60.0,
            invincibility: 100.0 / 60.0,
            hurt_bounce: 300.0,
            stomp_bounce: 240.0,
            flicker_tick: 4.0 / 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    /// Horizontal distance from the spawn point after which the projectile is culled.
    pub range: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 300.0,
            width: 16.0,
            height: 4.0,
            range: 256.0,
        }
    }
}

impl ProjectileTuning {
    pub fn seed() -> Self {
        Self {
            speed: 80.0,
            width: 8.0,
            height: 8.0,
            range: 160.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrollerTuning {
    pub speed: f32,
    #[serde(deserialize_with = "patroller_physics")]
    pub physics: BodyPhysics,
}

impl Default for PatrollerTuning {
    fn default() -> Self {
        Self {
            speed: 20.0,
            physics: BodyPhysics {
                gravity: 220.0,
                terminal_velocity: 600.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrawlerTuning {
    pub speed: f32,
    #[serde(deserialize_with = "brawler_physics")]
    pub physics: BodyPhysics,
    pub hop_velocity: f32,
    pub hop_gap: f32,
    /// Horizontal distance under which the brawler commits to a punch.
    pub attack_range: f32,
    /// Vertical distance under which the player counts as level with the brawler.
    pub attack_band: f32,
    pub attack_cooldown: f32,
    pub punch_width: f32,
    pub punch_height: f32,
}

impl Default for BrawlerTuning {
    fn default() -> Self {
        Self {
            speed: 15.0,
            physics: BodyPhysics {
                gravity: 60.0,
                terminal_velocity: 600.0,
            },
            hop_velocity: 60.0,
            hop_gap: 0.25,
            attack_range: 30.0,
            attack_band: 40.0,
            attack_cooldown: 2.0,
            punch_width: 10.0,
            punch_height: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    pub speed: f32,
    #[serde(deserialize_with = "shooter_physics")]
    pub physics: BodyPhysics,
    pub hop_velocity: f32,
    pub hop_gap: f32,
    pub fire_cooldown: f32,
    /// Horizontal distance under which the shooter turns toward the player and fires.
    pub sight_range: f32,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            speed: 18.0,
            physics: BodyPhysics {
                gravity: 220.0,
                terminal_velocity: 600.0,
            },
            hop_velocity: 60.0,
            hop_gap: 0.2,
            fire_cooldown: 2.5,
            sight_range: 160.0,
        }
    }
}

/// Lives lost per damage source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageTable {
    pub contact: u32,
    pub punch: u32,
    pub seed: u32,
}

impl Default for DamageTable {
    fn default() -> Self {
        Self {
            contact: 1,
            punch: 1,
            seed: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub view_width: f32,
    pub view_height: f32,
    pub world_height: f32,
    /// Optional floor under the whole world. Without one, pits are lethal.
    pub floor_y: Option<f32>,
    /// Falling below this line kills the player.
    pub death_zone_y: f32,
    /// Longest frame the simulation will integrate in one step.
    pub max_frame_delta: f32,
    pub death_burst_size: f32,
    pub death_burst_frames: u32,
    pub death_burst_interval_ms: u32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            view_width: 256.0,
            view_height: 144.0,
            world_height: 240.0,
            floor_y: None,
            death_zone_y: 272.0,
            max_frame_delta: 0.1,
            death_burst_size: 40.0,
            death_burst_frames: 6,
            death_burst_interval_ms: 50,
        }
    }
}

// Overlays for tables whose built-in values depend on the owner (seed vs arrow, per-kind
// gravity). Omitted fields keep the owner's value, not the type's `Default`.

#[derive(Deserialize, Default)]
#[serde(default)]
struct ProjectileOverlay {
    speed: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    range: Option<f32>,
}

impl ProjectileOverlay {
    fn over(self, base: ProjectileTuning) -> ProjectileTuning {
        ProjectileTuning {
            speed: self.speed.unwrap_or(base.speed),
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            range: self.range.unwrap_or(base.range),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PhysicsOverlay {
    gravity: Option<f32>,
    terminal_velocity: Option<f32>,
}

impl PhysicsOverlay {
    fn over(self, base: BodyPhysics) -> BodyPhysics {
        BodyPhysics {
            gravity: self.gravity.unwrap_or(base.gravity),
            terminal_velocity: self.terminal_velocity.unwrap_or(base.terminal_velocity),
        }
    }
}

fn seed_table<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ProjectileTuning, D::Error> {
    ProjectileOverlay::deserialize(deserializer).map(|overlay| overlay.over(ProjectileTuning::seed()))
}

fn physics_over<'de, D: Deserializer<'de>>(
    deserializer: D,
    base: BodyPhysics,
) -> Result<BodyPhysics, D::Error> {
    PhysicsOverlay::deserialize(deserializer).map(|overlay| overlay.over(base))
}

fn player_physics<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BodyPhysics, D::Error> {
    physics_over(deserializer, PlayerTuning::default().physics)
}

fn patroller_physics<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BodyPhysics, D::Error> {
    physics_over(deserializer, PatrollerTuning::default().physics)
}

fn brawler_physics<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BodyPhysics, D::Error> {
    physics_over(deserializer, BrawlerTuning::default().physics)
}

fn shooter_physics<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BodyPhysics, D::Error> {
    physics_over(deserializer, ShooterTuning::default().physics)
}

fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

pub fn load_tuning(path: &Path) -> Result<Tuning, ConfigError> {
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    Tuning::from_ron(&contents, &display)
}

/// Inserts the `Tuning` resource before any other plugin reads it.
pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(startup_tuning());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn startup_tuning() -> Tuning {
    match load_tuning(Path::new(TUNING_PATH)) {
        Ok(tuning) => {
            info!("Loaded tuning from {}", TUNING_PATH);
            tuning
        }
        Err(error) => {
            warn!("{error}; using built-in tuning.");
            Tuning::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn startup_tuning() -> Tuning {
    Tuning::default()
}
