//! Device sampling. The simulation only ever sees an [`InputSnapshot`]; this module turns
//! keyboard and mouse state into one each frame.

use bevy::input::keyboard::KeyCode;
use bevy::input::mouse::MouseButton;
use bevy::prelude::*;

use crate::state::{GameSet, GameState};

const LEFT_KEYS: [KeyCode; 2] = [KeyCode::KeyA, KeyCode::ArrowLeft];
const RIGHT_KEYS: [KeyCode; 2] = [KeyCode::KeyD, KeyCode::ArrowRight];
const JUMP_KEYS: [KeyCode; 3] = [KeyCode::KeyW, KeyCode::ArrowUp, KeyCode::Space];
const ATTACK_KEYS: [KeyCode; 1] = [KeyCode::KeyJ];
pub const RESTART_KEY: KeyCode = KeyCode::KeyR;

/// Registers the input resources and the per-frame sampling system.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputSnapshot>()
            .init_resource::<InputTracker>()
            .add_systems(
                Update,
                read_player_input
                    .in_set(GameSet::Input)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnExit(GameState::Playing), clear_input);
    }
}

/// Buttons held this frame. At most one of `left` and `right` is set.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
}

/// Remembers when each horizontal direction was last pressed so simultaneous holds resolve to
/// the newer one.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct InputTracker {
    left_pressed_at: Option<f64>,
    right_pressed_at: Option<f64>,
}

impl InputTracker {
    /// Feeds one frame of raw direction state at time `now` (seconds) and returns the resolved
    /// `(left, right)` pair.
    pub fn resolve(&mut self, left_held: bool, right_held: bool, now: f64) -> (bool, bool) {
        self.left_pressed_at = track(self.left_pressed_at, left_held, now);
        self.right_pressed_at = track(self.right_pressed_at, right_held, now);

        match (self.left_pressed_at, self.right_pressed_at) {
            (Some(left), Some(right)) => {
                if left > right {
                    (true, false)
                } else {
                    (false, true)
                }
            }
            (Some(_), None) => (true, false),
            (None, Some(_)) => (false, true),
            (None, None) => (false, false),
        }
    }

    pub fn snapshot(
        &mut self,
        left_held: bool,
        right_held: bool,
        jump: bool,
        attack: bool,
        now: f64,
    ) -> InputSnapshot {
        let (left, right) = self.resolve(left_held, right_held, now);
        InputSnapshot {
            left,
            right,
            jump,
            attack,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Keeps the first press time while `held`, forgets it on release.
fn track(pressed_at: Option<f64>, held: bool, now: f64) -> Option<f64> {
    match (held, pressed_at) {
        (false, _) => None,
        (true, Some(at)) => Some(at),
        (true, None) => Some(now),
    }
}

fn any_pressed(keyboard: &ButtonInput<KeyCode>, keys: &[KeyCode]) -> bool {
    keys.iter().any(|key| keyboard.pressed(*key))
}

/// Samples keyboard and mouse into `InputSnapshot` at the start of every `Playing` frame.
fn read_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    mut tracker: ResMut<InputTracker>,
    mut snapshot: ResMut<InputSnapshot>,
) {
    *snapshot = tracker.snapshot(
        any_pressed(&keyboard, &LEFT_KEYS),
        any_pressed(&keyboard, &RIGHT_KEYS),
        any_pressed(&keyboard, &JUMP_KEYS),
        any_pressed(&keyboard, &ATTACK_KEYS) || mouse.pressed(MouseButton::Left),
        time.elapsed_seconds_f64(),
    );
}

/// Drops held buttons when play stops so nothing sticks across a pause.
fn clear_input(mut tracker: ResMut<InputTracker>, mut snapshot: ResMut<InputSnapshot>) {
    tracker.clear();
    *snapshot = InputSnapshot::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_direction_passes_through() {
        let mut tracker = InputTracker::default();
        assert_eq!(tracker.resolve(true, false, 0.0), (true, false));
        assert_eq!(tracker.resolve(false, true, 0.1), (false, true));
        assert_eq!(tracker.resolve(false, false, 0.2), (false, false));
    }

    #[test]
    fn most_recent_press_wins() {
        let mut tracker = InputTracker::default();
        tracker.resolve(true, false, 0.0);
        assert_eq!(tracker.resolve(true, true, 0.5), (false, true));

        // Releasing and re-pressing left makes it the newer press.
        tracker.resolve(false, true, 0.6);
        assert_eq!(tracker.resolve(true, true, 0.7), (true, false));
    }

    #[test]
    fn releasing_the_newer_key_falls_back_to_the_held_one() {
        let mut tracker = InputTracker::default();
        tracker.resolve(false, true, 0.0);
        tracker.resolve(true, true, 0.2);
        assert_eq!(tracker.resolve(true, false, 0.3), (true, false));
    }

    #[test]
    fn snapshot_carries_buttons() {
        let mut tracker = InputTracker::default();
        let snapshot = tracker.snapshot(true, true, true, false, 0.0);
        assert!(snapshot.jump);
        assert!(!snapshot.attack);
        assert!(!(snapshot.left && snapshot.right));
    }

    #[test]
    fn clear_forgets_presses() {
        let mut tracker = InputTracker::default();
        tracker.resolve(true, false, 0.0);
        tracker.clear();
        assert_eq!(tracker, InputTracker::default());
    }
}
