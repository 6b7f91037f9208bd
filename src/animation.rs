//! Frame-cadence animation state machine shared by every entity.
//!
//! Each entity kind declares a closed state enum implementing [`AnimState`]; the enum's static
//! clip table is the only source of `{image, frame_interval_ms, total_frames}`. `Animator::switch`
//! is the only way those values change, so they can never drift from the active state.

use std::fmt::Debug;

use bevy::log::warn;

/// Whether a clip loops or plays once and hands control back to the resting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipMode {
    Loop,
    OneShot,
}

/// Static description of one animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clip {
    pub image: &'static str,
    pub frame_interval_ms: u32,
    pub total_frames: u32,
    pub mode: ClipMode,
    /// Frame index whose arrival fires the state's side effect (hit test, projectile spawn).
    pub action_frame: Option<u32>,
}

impl Clip {
    pub const fn looping(image: &'static str, total_frames: u32, frame_interval_ms: u32) -> Self {
        Self {
            image,
            frame_interval_ms,
            total_frames,
            mode: ClipMode::Loop,
            action_frame: None,
        }
    }

    pub const fn one_shot(image: &'static str, total_frames: u32, frame_interval_ms: u32) -> Self {
        Self {
            image,
            frame_interval_ms,
            total_frames,
            mode: ClipMode::OneShot,
            action_frame: None,
        }
    }

    pub const fn with_action_frame(mut self, frame: u32) -> Self {
        self.action_frame = Some(frame);
        self
    }
}

/// Closed per-entity animation state set.
pub trait AnimState: Copy + Eq + Debug {
    fn clip(self) -> Clip;

    /// State a finished one-shot clip returns to, and the fallback for unknown names.
    fn resting() -> Self;

    fn key(self) -> &'static str;

    fn from_key(key: &str) -> Option<Self>;
}

/// What happened during one `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTick<S> {
    /// The clip's action frame was reached during this advance (fires once per playthrough).
    pub action_frame_reached: bool,
    /// A one-shot clip completed; the animator has already switched to the resting state.
    pub finished: Option<S>,
}

impl<S> Default for AnimationTick<S> {
    fn default() -> Self {
        Self {
            action_frame_reached: false,
            finished: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Animator<S: AnimState> {
    state: S,
    clip: Clip,
    current_frame: u32,
    elapsed_ms: f32,
    action_fired: bool,
}

impl<S: AnimState> Animator<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            clip: state.clip(),
            current_frame: 0,
            elapsed_ms: 0.0,
            action_fired: false,
        }
    }

    pub fn state(&self) -> S {
        self.state
    }

    pub fn clip(&self) -> Clip {
        self.clip
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    pub fn image(&self) -> &'static str {
        self.clip.image
    }

    /// Enters `state`, resetting the frame counter and reloading the clip. Returns false (and
    /// changes nothing) when already in that state.
    pub fn switch(&mut self, state: S) -> bool {
        if self.state == state {
            return false;
        }

        self.state = state;
        self.clip = state.clip();
        self.current_frame = 0;
        self.elapsed_ms = 0.0;
        self.action_fired = false;
        true
    }

    /// Switches by state name. Unknown names fall back to the resting state.
    pub fn switch_named(&mut self, key: &str) -> S {
        let state = S::from_key(key).unwrap_or_else(|| {
            warn!(
                "Unknown animation state '{}'; falling back to '{}'.",
                key,
                S::resting().key()
            );
            S::resting()
        });
        self.switch(state);
        state
    }

    /// Advances by `dt` seconds on the clip's fixed millisecond cadence.
    pub fn advance(&mut self, dt: f32) -> AnimationTick<S> {
        let mut tick = AnimationTick::default();
        if !crate::movement::is_valid_dt(dt) {
            return tick;
        }

        self.elapsed_ms += dt * 1000.0;
        let interval = self.clip.frame_interval_ms.max(1) as f32;

        while self.elapsed_ms >= interval {
            self.elapsed_ms -= interval;
            self.current_frame += 1;

            if !self.action_fired && Some(self.current_frame) == self.clip.action_frame {
                self.action_fired = true;
                tick.action_frame_reached = true;
            }

            if self.current_frame >= self.clip.total_frames {
                match self.clip.mode {
                    ClipMode::Loop => {
                        self.current_frame = 0;
                        self.action_fired = false;
                    }
                    ClipMode::OneShot => {
                        let finished = self.state;
                        self.switch(S::resting());
                        tick.finished = Some(finished);
                        return tick;
                    }
                }
            }
        }

        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Demo {
        Walk,
        Swing,
    }

    impl AnimState for Demo {
        fn clip(self) -> Clip {
            match self {
                Demo::Walk => Clip::looping("walk.png", 4, 100),
                Demo::Swing => Clip::one_shot("swing.png", 5, 50).with_action_frame(2),
            }
        }

        fn resting() -> Self {
            Demo::Walk
        }

        fn key(self) -> &'static str {
            match self {
                Demo::Walk => "walk",
                Demo::Swing => "swing",
            }
        }

        fn from_key(key: &str) -> Option<Self> {
            match key {
                "walk" => Some(Demo::Walk),
                "swing" => Some(Demo::Swing),
                _ => None,
            }
        }
    }

    #[test]
    fn switch_resets_frame_and_loads_clip() {
        let mut animator = Animator::new(Demo::Walk);
        animator.advance(0.25);
        assert_eq!(animator.current_frame(), 2);

        assert!(animator.switch(Demo::Swing));
        assert_eq!(animator.current_frame(), 0);
        assert_eq!(animator.elapsed_ms(), 0.0);
        assert_eq!(animator.clip(), Demo::Swing.clip());
        assert_eq!(animator.image(), "swing.png");
    }

    #[test]
    fn switch_is_idempotent() {
        let mut animator = Animator::new(Demo::Walk);
        animator.advance(0.15);
        let frame = animator.current_frame();

        assert!(!animator.switch(Demo::Walk));
        assert_eq!(animator.current_frame(), frame);
    }

    #[test]
    fn looping_clip_wraps() {
        let mut animator = Animator::new(Demo::Walk);
        for _ in 0..5 {
            animator.advance(0.1);
        }
        assert_eq!(animator.current_frame(), 1);
        assert_eq!(animator.state(), Demo::Walk);
    }

    #[test]
    fn one_shot_returns_to_resting_state() {
        let mut animator = Animator::new(Demo::Walk);
        animator.switch(Demo::Swing);

        let mut finished = None;
        for _ in 0..5 {
            let tick = animator.advance(0.05);
            finished = finished.or(tick.finished);
        }

        assert_eq!(finished, Some(Demo::Swing));
        assert_eq!(animator.state(), Demo::Walk);
        assert_eq!(animator.current_frame(), 0);
    }

    #[test]
    fn action_frame_fires_once_per_playthrough() {
        let mut animator = Animator::new(Demo::Swing);
        let mut fired = 0;
        for _ in 0..4 {
            if animator.advance(0.05).action_frame_reached {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn large_step_still_reports_action_frame() {
        let mut animator = Animator::new(Demo::Swing);
        let tick = animator.advance(0.16);
        assert!(tick.action_frame_reached);
        assert_eq!(animator.current_frame(), 3);
    }

    #[test]
    fn unknown_name_falls_back_to_resting() {
        let mut animator = Animator::new(Demo::Swing);
        animator.advance(0.05);

        assert_eq!(animator.switch_named("cartwheel"), Demo::Walk);
        assert_eq!(animator.state(), Demo::Walk);
        assert_eq!(animator.clip(), Demo::Walk.clip());

        assert_eq!(animator.switch_named("swing"), Demo::Swing);
        assert_eq!(animator.current_frame(), 0);
    }

    #[test]
    fn zero_delta_is_a_dropped_frame() {
        let mut animator = Animator::new(Demo::Walk);
        let tick = animator.advance(0.0);
        assert_eq!(tick, AnimationTick::default());
        assert_eq!(animator.elapsed_ms(), 0.0);
    }
}
