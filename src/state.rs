//! Top-level game states and the system sets that order one `Playing` frame.

use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

/// High-level state machine for the game loop.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    /// Waiting on the asset server. No simulation runs.
    #[default]
    Loading,
    /// The world steps once per frame.
    Playing,
    /// World frozen; only the pause overlay and ESC are live.
    Paused,
}

/// Input sampling, then the world step, then everything that reacts to it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Simulation,
    Effects,
}

/// ESC flips between `Playing` and `Paused`. Ignored while loading.
pub fn toggle_pause(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }

    match state.get() {
        GameState::Playing => next_state.set(GameState::Paused),
        GameState::Paused => next_state.set(GameState::Playing),
        GameState::Loading => {}
    }
}
