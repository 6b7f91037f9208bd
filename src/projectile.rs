//! Straight-line projectiles (player arrows, shooter seeds) and the one-shot death burst.

use bevy::math::Vec2;

use crate::animation::{AnimState, Animator, Clip};
use crate::collision::Aabb;
use crate::config::ProjectileTuning;
use crate::movement::{is_valid_dt, Facing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Arrow,
    Seed,
}

impl AnimState for ProjectileKind {
    fn clip(self) -> Clip {
        match self {
            ProjectileKind::Arrow => Clip::looping("sprites/tracy/arrow.png", 1, 100),
            ProjectileKind::Seed => Clip::looping("sprites/cebolete/seed.png", 2, 150),
        }
    }

    fn resting() -> Self {
        ProjectileKind::Arrow
    }

    fn key(self) -> &'static str {
        match self {
            ProjectileKind::Arrow => "arrow",
            ProjectileKind::Seed => "seed",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "arrow" => Some(ProjectileKind::Arrow),
            "seed" => Some(ProjectileKind::Seed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub position: Vec2,
    pub velocity_x: f32,
    pub width: f32,
    pub height: f32,
    pub facing: Facing,
    spawn_x: f32,
    range: f32,
    animator: Animator<ProjectileKind>,
}

impl Projectile {
    /// Spawns a projectile whose near edge touches `anchor_x` on the `facing` side, vertically
    /// centred on `center_y`.
    pub fn launch(
        kind: ProjectileKind,
        anchor_x: f32,
        center_y: f32,
        facing: Facing,
        tuning: &ProjectileTuning,
    ) -> Self {
        let x = match facing {
            Facing::Right => anchor_x,
            Facing::Left => anchor_x - tuning.width,
        };
        let position = Vec2::new(x, center_y - tuning.height * 0.5);

        Self {
            kind,
            position,
            velocity_x: tuning.speed * facing.sign(),
            width: tuning.width,
            height: tuning.height,
            facing,
            spawn_x: x,
            range: tuning.range,
            animator: Animator::new(kind),
        }
    }

    pub fn update(&mut self, dt: f32) {
        if !is_valid_dt(dt) {
            return;
        }
        self.animator.advance(dt);
        self.position.x += self.velocity_x * dt;
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position, self.width, self.height)
    }

    pub fn current_frame(&self) -> u32 {
        self.animator.current_frame()
    }

    /// True once the projectile has left its travel window or the world's horizontal span.
    pub fn is_expired(&self, world_right: f32) -> bool {
        (self.position.x - self.spawn_x).abs() > self.range
            || self.position.x + self.width < 0.0
            || self.position.x > world_right
    }
}

/// One-shot explosion left behind by a removed enemy or the dead player.
#[derive(Debug, Clone, PartialEq)]
pub struct DeathBurst {
    pub position: Vec2,
    pub size: f32,
    frame: u32,
    frames: u32,
    interval_ms: f32,
    elapsed_ms: f32,
}

impl DeathBurst {
    /// Centres a burst of `size` on `center`.
    pub fn centered_on(center: Vec2, size: f32, frames: u32, interval_ms: u32) -> Self {
        Self {
            position: center - Vec2::splat(size * 0.5),
            size,
            frame: 0,
            frames: frames.max(1),
            interval_ms: interval_ms.max(1) as f32,
            elapsed_ms: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.is_done() || !is_valid_dt(dt) {
            return;
        }
        self.elapsed_ms += dt * 1000.0;
        while self.elapsed_ms >= self.interval_ms && !self.is_done() {
            self.elapsed_ms -= self.interval_ms;
            self.frame += 1;
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame.min(self.frames - 1)
    }

    pub fn is_done(&self) -> bool {
        self.frame >= self.frames
    }
}
