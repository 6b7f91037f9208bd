//! Level-change fade. When the player crosses into a new level the screen dips to black and back
//! while the simulation keeps running underneath; the new level is already there when it clears.

use bevy::prelude::*;

use crate::state::GameSet;
use crate::world::WorldEvent;

/// Registers the fade overlay and the systems that drive it.
pub struct TransitionPlugin;

impl Plugin for TransitionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TransitionState>()
            .add_systems(Startup, spawn_fade_overlay)
            .add_systems(
                Update,
                (start_level_fade, advance_fade)
                    .chain()
                    .in_set(GameSet::Effects),
            )
            .add_systems(Update, update_fade_overlay);
    }
}

const FADE_DURATION: f32 = 0.8;

/// Tracks the running fade, if any.
#[derive(Resource, Debug, Default)]
pub struct TransitionState {
    pub is_transitioning: bool,
    pub fade_timer: f32,
    pub fade_duration: f32,
    pub level: Option<usize>,
}

impl TransitionState {
    pub fn start_transition(&mut self, level: usize) {
        self.is_transitioning = true;
        self.fade_timer = 0.0;
        self.fade_duration = FADE_DURATION;
        self.level = Some(level);
    }

    pub fn reset(&mut self) {
        self.is_transitioning = false;
        self.fade_timer = 0.0;
        self.level = None;
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.is_transitioning {
            return;
        }
        self.fade_timer += dt;
        if self.fade_timer >= self.fade_duration {
            self.reset();
        }
    }

    /// 0.0 is transparent, 1.0 fully black. Peaks halfway through.
    pub fn get_fade_alpha(&self) -> f32 {
        if !self.is_transitioning || self.fade_duration <= 0.0 {
            return 0.0;
        }

        let half_duration = self.fade_duration * 0.5;
        let alpha = if self.fade_timer < half_duration {
            self.fade_timer / half_duration
        } else {
            1.0 - (self.fade_timer - half_duration) / half_duration
        };
        alpha.clamp(0.0, 1.0)
    }
}

/// Marker component for the fade overlay node.
#[derive(Component)]
pub struct FadeOverlay;

/// Full-window UI node so it covers the view wherever the camera is.
fn spawn_fade_overlay(mut commands: Commands) {
    commands.spawn((
        FadeOverlay,
        Name::new("FadeOverlay"),
        NodeBundle {
            background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
            style: Style {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            z_index: ZIndex::Global(100),
            ..default()
        },
    ));
}

/// Starts a fade for every level change reported this frame.
fn start_level_fade(mut events: EventReader<WorldEvent>, mut transition: ResMut<TransitionState>) {
    for event in events.read() {
        if let WorldEvent::LevelAdvanced { level } = event {
            info!("Fading into level {level}");
            transition.start_transition(*level);
        }
    }
}

/// Advances the running fade by this frame's delta.
fn advance_fade(time: Res<Time>, mut transition: ResMut<TransitionState>) {
    transition.advance(time.delta_seconds());
}

/// Updates the overlay opacity from the transition state.
fn update_fade_overlay(
    transition: Res<TransitionState>,
    mut overlay_query: Query<&mut BackgroundColor, With<FadeOverlay>>,
) {
    for mut background in &mut overlay_query {
        background.0 = Color::srgba(0.0, 0.0, 0.0, transition.get_fade_alpha());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_fade_is_transparent() {
        assert_eq!(TransitionState::default().get_fade_alpha(), 0.0);
    }

    #[test]
    fn fade_peaks_at_the_midpoint_and_clears() {
        let mut transition = TransitionState::default();
        transition.start_transition(2);
        assert_eq!(transition.get_fade_alpha(), 0.0);

        transition.advance(FADE_DURATION * 0.25);
        assert!((transition.get_fade_alpha() - 0.5).abs() < 1e-4);

        transition.advance(FADE_DURATION * 0.25);
        assert!((transition.get_fade_alpha() - 1.0).abs() < 1e-4);

        transition.advance(FADE_DURATION * 0.25);
        assert!((transition.get_fade_alpha() - 0.5).abs() < 1e-4);

        transition.advance(FADE_DURATION * 0.3);
        assert!(!transition.is_transitioning);
        assert_eq!(transition.level, None);
        assert_eq!(transition.get_fade_alpha(), 0.0);
    }

    #[test]
    fn new_level_restarts_a_running_fade() {
        let mut transition = TransitionState::default();
        transition.start_transition(2);
        transition.advance(FADE_DURATION * 0.4);
        transition.start_transition(3);
        assert_eq!(transition.fade_timer, 0.0);
        assert_eq!(transition.level, Some(3));
    }
}
