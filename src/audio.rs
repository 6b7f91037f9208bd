//! Sound effects. Handles are queued once while loading and kept alive in `AudioHandles`; each
//! world event that has a clip spawns a self-despawning audio entity.
//!
//! Missing files only produce asset-server warnings. The game stays silent until clips are placed
//! under `assets/audio/`.

use bevy::prelude::*;

use crate::state::{GameSet, GameState};
use crate::world::{DamageSource, KillCause, WorldEvent};

/// Registers sound loading and playback.
pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioHandles>()
            .add_systems(OnEnter(GameState::Loading), load_audio_handles)
            .add_systems(Update, play_world_sounds.in_set(GameSet::Effects));
    }
}

/// Strong handles for every effect clip, kept alive for the whole session.
#[derive(Resource, Default)]
pub struct AudioHandles {
    pub arrow: Option<Handle<AudioSource>>,
    pub seed: Option<Handle<AudioSource>>,
    pub stomp: Option<Handle<AudioSource>>,
    pub enemy_down: Option<Handle<AudioSource>>,
    pub hurt: Option<Handle<AudioSource>>,
    pub game_over: Option<Handle<AudioSource>>,
    pub level_up: Option<Handle<AudioSource>>,
    pub victory: Option<Handle<AudioSource>>,
}

/// Which clip (if any) an event plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Arrow,
    Seed,
    Stomp,
    EnemyDown,
    Hurt,
    GameOver,
    LevelUp,
    Victory,
}

impl Cue {
    pub fn for_event(event: &WorldEvent) -> Option<Cue> {
        match event {
            WorldEvent::ArrowFired => Some(Cue::Arrow),
            WorldEvent::SeedFired => Some(Cue::Seed),
            WorldEvent::EnemyKilled {
                cause: KillCause::Stomp,
                ..
            } => Some(Cue::Stomp),
            WorldEvent::EnemyKilled {
                cause: KillCause::Arrow,
                ..
            } => Some(Cue::EnemyDown),
            WorldEvent::PlayerHurt {
                source: DamageSource::Contact | DamageSource::Punch | DamageSource::Seed,
            } => Some(Cue::Hurt),
            WorldEvent::PlayerDied => Some(Cue::GameOver),
            WorldEvent::LevelAdvanced { .. } => Some(Cue::LevelUp),
            WorldEvent::GameWon => Some(Cue::Victory),
        }
    }
}

impl AudioHandles {
    fn get(&self, cue: Cue) -> Option<&Handle<AudioSource>> {
        match cue {
            Cue::Arrow => self.arrow.as_ref(),
            Cue::Seed => self.seed.as_ref(),
            Cue::Stomp => self.stomp.as_ref(),
            Cue::EnemyDown => self.enemy_down.as_ref(),
            Cue::Hurt => self.hurt.as_ref(),
            Cue::GameOver => self.game_over.as_ref(),
            Cue::LevelUp => self.level_up.as_ref(),
            Cue::Victory => self.victory.as_ref(),
        }
    }
}

/// Queues every clip while the game is loading.
fn load_audio_handles(asset_server: Res<AssetServer>, mut handles: ResMut<AudioHandles>) {
    handles.arrow = Some(asset_server.load("audio/arrow.ogg"));
    handles.seed = Some(asset_server.load("audio/seed.ogg"));
    handles.stomp = Some(asset_server.load("audio/stomp.ogg"));
    handles.enemy_down = Some(asset_server.load("audio/enemy_down.ogg"));
    handles.hurt = Some(asset_server.load("audio/hurt.ogg"));
    handles.game_over = Some(asset_server.load("audio/game_over.ogg"));
    handles.level_up = Some(asset_server.load("audio/level_up.ogg"));
    handles.victory = Some(asset_server.load("audio/victory.ogg"));

    info!("Queued sound effects from assets/audio/.");
}

/// Plays one clip per world event this frame. Each audio entity despawns when it finishes.
fn play_world_sounds(
    mut commands: Commands,
    mut events: EventReader<WorldEvent>,
    handles: Res<AudioHandles>,
) {
    for event in events.read() {
        let Some(handle) = Cue::for_event(event).and_then(|cue| handles.get(cue)) else {
            continue;
        };
        commands.spawn(AudioBundle {
            source: handle.clone(),
            settings: PlaybackSettings::DESPAWN,
        });
    }
}
