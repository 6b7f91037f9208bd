//! Player controller: input-driven kinematic body with attack, hurt and death handling.
//!
//! The controller never reads devices or clocks. Each frame the world hands it an
//! [`InputSnapshot`], the frame delta, and a borrowed view of the platform pools.

use bevy::log::debug;
use bevy::math::Vec2;

use crate::animation::{AnimState, Animator, Clip};
use crate::collision::Aabb;
use crate::config::{PlayerTuning, ProjectileTuning};
use crate::input::InputSnapshot;
use crate::movement::{is_valid_dt, Facing, KinematicBody, LevelGeometry};
use crate::projectile::{Projectile, ProjectileKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Idle,
    Run,
    Jump,
    Fall,
    Attack,
    Hurt,
}

impl AnimState for PlayerState {
    fn clip(self) -> Clip {
        match self {
            PlayerState::Idle => Clip::looping("sprites/tracy/idle.png", 5, 100),
            PlayerState::Run => Clip::looping("sprites/tracy/run.png", 6, 80),
            PlayerState::Jump => Clip::looping("sprites/tracy/jump.png", 1, 100),
            PlayerState::Fall => Clip::looping("sprites/tracy/fall.png", 1, 100),
            PlayerState::Attack => Clip::one_shot("sprites/tracy/crossbow_shot.png", 4, 50),
            PlayerState::Hurt => Clip::one_shot("sprites/tracy/hurt.png", 1, 400),
        }
    }

    fn resting() -> Self {
        PlayerState::Idle
    }

    fn key(self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Run => "run",
            PlayerState::Jump => "jump",
            PlayerState::Fall => "fall",
            PlayerState::Attack => "attack",
            PlayerState::Hurt => "hurt",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "idle" => Some(PlayerState::Idle),
            "run" => Some(PlayerState::Run),
            "jump" => Some(PlayerState::Jump),
            "fall" => Some(PlayerState::Fall),
            "attack" => Some(PlayerState::Attack),
            "hurt" => Some(PlayerState::Hurt),
            _ => None,
        }
    }
}

/// Inputs to the player transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Locomotion {
        grounded: bool,
        moving: bool,
        rising: bool,
    },
    AttackTriggered,
    Damaged,
}

impl PlayerState {
    /// Transition table keyed by `(state, event)`. `None` means the event is ignored.
    pub fn on(self, event: PlayerEvent) -> Option<PlayerState> {
        use PlayerState::*;

        match (self, event) {
            (Attack | Hurt, PlayerEvent::Locomotion { .. }) => None,
            (_, PlayerEvent::Locomotion { grounded: false, rising: true, .. }) => Some(Jump),
            (_, PlayerEvent::Locomotion { grounded: false, .. }) => Some(Fall),
            (_, PlayerEvent::Locomotion { moving: true, .. }) => Some(Run),
            (_, PlayerEvent::Locomotion { .. }) => Some(Idle),
            (Attack | Hurt, PlayerEvent::AttackTriggered) => None,
            (_, PlayerEvent::AttackTriggered) => Some(Attack),
            (_, PlayerEvent::Damaged) => Some(Hurt),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: KinematicBody,
    pub facing: Facing,
    pub lives: u32,
    pub is_dead: bool,
    /// Set by the world once the death burst for this death has been spawned.
    pub death_animation_spawned: bool,
    pub projectiles: Vec<Projectile>,
    animator: Animator<PlayerState>,
    invincibility_timer: f32,
    cooldown: f32,
    tuning: PlayerTuning,
    arrow: ProjectileTuning,
}

impl Player {
    pub fn new(tuning: &PlayerTuning, arrow: &ProjectileTuning) -> Self {
        let spawn = Vec2::new(tuning.spawn_x, tuning.spawn_y);
        Self {
            body: KinematicBody::new(spawn, Vec2::new(tuning.width, tuning.height)),
            facing: Facing::Right,
            lives: tuning.lives,
            is_dead: false,
            death_animation_spawned: false,
            projectiles: Vec::new(),
            animator: Animator::new(PlayerState::Idle),
            invincibility_timer: 0.0,
            cooldown: 0.0,
            tuning: tuning.clone(),
            arrow: arrow.clone(),
        }
    }

    /// Scene (re)load: lives, position and every timer go back to their initial values.
    pub fn reset(&mut self) {
        *self = Self::new(&self.tuning, &self.arrow);
    }

    pub fn state(&self) -> PlayerState {
        self.animator.state()
    }

    pub fn animator(&self) -> &Animator<PlayerState> {
        &self.animator
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    pub fn hitbox(&self) -> Aabb {
        self.body.hitbox()
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0.0
    }

    /// Even-numbered flicker ticks of the invincibility window render at half opacity.
    pub fn flicker_dimmed(&self) -> bool {
        if !self.is_invincible() || self.is_dead {
            return false;
        }
        let tick = (self.invincibility_timer / self.tuning.flicker_tick.max(f32::EPSILON)) as u32;
        tick % 2 == 0
    }

    fn apply(&mut self, event: PlayerEvent) {
        if let Some(next) = self.state().on(event) {
            self.animator.switch(next);
        }
    }

    /// One simulation step. Returns true when an arrow was fired this frame.
    pub fn update(&mut self, input: &InputSnapshot, dt: f32, geometry: &LevelGeometry) -> bool {
        if self.is_dead || !is_valid_dt(dt) {
            return false;
        }

        self.cooldown = (self.cooldown - dt).max(0.0);
        if self.invincibility_timer > 0.0 {
            self.invincibility_timer = (self.invincibility_timer - dt).max(0.0);
        }

        let fired = input.attack && self.attack();
        self.move_with(input);
        self.body.integrate(dt, self.tuning.physics, geometry);
        self.animator.advance(dt);

        fired
    }

    /// Sets horizontal velocity and jump impulse from the input snapshot, then picks the
    /// locomotion state. Attack and hurt hold the player in place horizontally.
    pub fn move_with(&mut self, input: &InputSnapshot) {
        if self.is_dead {
            return;
        }

        self.body.velocity.x = 0.0;
        if matches!(self.state(), PlayerState::Attack | PlayerState::Hurt) {
            return;
        }

        if input.left {
            self.body.velocity.x = -self.tuning.run_speed;
            self.facing = Facing::Left;
        } else if input.right {
            self.body.velocity.x = self.tuning.run_speed;
            self.facing = Facing::Right;
        }

        if input.jump && self.body.on_ground {
            self.body.velocity.y = -self.tuning.jump_velocity;
            self.body.on_ground = false;
        }

        self.apply(PlayerEvent::Locomotion {
            grounded: self.body.on_ground,
            moving: self.body.velocity.x != 0.0,
            rising: self.body.velocity.y < 0.0,
        });
    }

    /// Fires an arrow from the leading edge. No-op while cooling down, hurt, or dead.
    pub fn attack(&mut self) -> bool {
        if self.is_dead || self.cooldown > 0.0 || self.state() == PlayerState::Hurt {
            return false;
        }

        self.apply(PlayerEvent::AttackTriggered);
        self.cooldown = self.tuning.attack_cooldown;

        let bounds = self.body.bounds();
        let anchor_x = match self.facing {
            Facing::Right => bounds.right(),
            Facing::Left => bounds.left(),
        };
        self.projectiles.push(Projectile::launch(
            ProjectileKind::Arrow,
            anchor_x,
            bounds.center().y,
            self.facing,
            &self.arrow,
        ));
        true
    }

    /// Applies `amount` lives of damage. Returns false when the hit was ignored.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if self.is_invincible() || self.is_dead {
            return false;
        }

        self.lives = self.lives.saturating_sub(amount);
        self.invincibility_timer = self.tuning.invincibility;
        debug!("Player hit for {}, {} lives left", amount, self.lives);

        if self.lives == 0 {
            self.die();
        } else {
            self.apply(PlayerEvent::Damaged);
            self.body.velocity.y = -self.tuning.hurt_bounce;
            self.body.on_ground = false;
        }
        true
    }

    pub fn die(&mut self) {
        if self.is_dead {
            return;
        }
        self.is_dead = true;
        self.body.velocity = Vec2::ZERO;
    }

    /// Upward impulse after a stomp.
    pub fn bounce(&mut self) {
        if self.is_dead {
            return;
        }
        self.body.velocity.y = -self.tuning.stomp_bounce;
        self.body.on_ground = false;
    }

    /// Moves arrows and drops the ones that left their window or the world.
    pub fn update_projectiles(&mut self, dt: f32, world_right: f32) {
        for arrow in &mut self.projectiles {
            arrow.update(dt);
        }
        self.projectiles.retain(|arrow| !arrow.is_expired(world_right));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Cropbox, Platform};

    const DT: f32 = 1.0 / 60.0;

    fn player() -> Player {
        Player::new(&PlayerTuning::default(), &ProjectileTuning::default())
    }

    fn ground() -> Vec<Platform> {
        (0..20)
            .map(|i| {
                Platform::new(
                    Vec2::new(i as f32 * 16.0, 116.0),
                    Cropbox::new(0.0, 0.0, 16.0, 16.0),
                )
            })
            .collect()
    }

    fn settle(player: &mut Player, solids: &[Platform]) {
        let geometry = LevelGeometry::new(&[], solids);
        for _ in 0..10 {
            player.update(&InputSnapshot::default(), DT, &geometry);
        }
    }

    #[test]
    fn transition_table_covers_locomotion() {
        let grounded_still = PlayerEvent::Locomotion {
            grounded: true,
            moving: false,
            rising: false,
        };
        let grounded_moving = PlayerEvent::Locomotion {
            grounded: true,
            moving: true,
            rising: false,
        };
        let rising = PlayerEvent::Locomotion {
            grounded: false,
            moving: false,
            rising: true,
        };
        let falling = PlayerEvent::Locomotion {
            grounded: false,
            moving: true,
            rising: false,
        };

        assert_eq!(PlayerState::Run.on(grounded_still), Some(PlayerState::Idle));
        assert_eq!(PlayerState::Idle.on(grounded_moving), Some(PlayerState::Run));
        assert_eq!(PlayerState::Idle.on(rising), Some(PlayerState::Jump));
        assert_eq!(PlayerState::Jump.on(falling), Some(PlayerState::Fall));
        assert_eq!(PlayerState::Attack.on(grounded_moving), None);
        assert_eq!(PlayerState::Hurt.on(rising), None);
        assert_eq!(PlayerState::Hurt.on(PlayerEvent::AttackTriggered), None);
        assert_eq!(PlayerState::Run.on(PlayerEvent::Damaged), Some(PlayerState::Hurt));
    }

    #[test]
    fn runs_and_faces_input_direction() {
        let solids = ground();
        let mut player = player();
        settle(&mut player, &solids);
        let geometry = LevelGeometry::new(&[], &solids);

        let input = InputSnapshot {
            left: true,
            ..Default::default()
        };
        player.update(&input, DT, &geometry);

        assert_eq!(player.facing, Facing::Left);
        assert_eq!(player.state(), PlayerState::Run);
        assert!(player.position().x < 100.0);
    }

    #[test]
    fn jump_only_from_ground() {
        let solids = ground();
        let mut player = player();
        settle(&mut player, &solids);
        assert!(player.body.on_ground);
        let geometry = LevelGeometry::new(&[], &solids);

        let jump = InputSnapshot {
            jump: true,
            ..Default::default()
        };
        player.update(&jump, DT, &geometry);
        assert!(player.velocity().y < 0.0);
        let vy = player.velocity().y;

        player.update(&jump, DT, &geometry);
        assert_eq!(player.state(), PlayerState::Jump);
        assert!(player.velocity().y > vy, "no second impulse mid-air");
    }

    #[test]
    fn attack_spawns_one_arrow_and_respects_cooldown() {
        let mut player = player();

        assert!(player.attack());
        assert_eq!(player.state(), PlayerState::Attack);
        assert_eq!(player.projectiles.len(), 1);
        let arrow = &player.projectiles[0];
        assert_eq!(arrow.position.x, player.body.bounds().right());
        assert_eq!(arrow.aabb().center().y, player.body.bounds().center().y);
        assert!(arrow.velocity_x > 0.0);

        assert!(!player.attack());
        assert_eq!(player.projectiles.len(), 1);
    }

    #[test]
    fn attack_returns_to_idle_after_its_frames() {
        let solids = ground();
        let mut player = player();
        settle(&mut player, &solids);
        let geometry = LevelGeometry::new(&[], &solids);

        player.attack();
        for _ in 0..15 {
            player.update(&InputSnapshot::default(), DT, &geometry);
        }

        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[test]
    fn attack_is_ignored_while_hurt_or_dead() {
        let mut player = player();
        player.take_damage(1);
        assert_eq!(player.state(), PlayerState::Hurt);
        assert!(!player.attack());

        let mut dead = self::player();
        dead.die();
        assert!(!dead.attack());
        assert!(dead.projectiles.is_empty());
    }

    #[test]
    fn repeated_damage_inside_window_costs_one_life() {
        let mut player = player();

        assert!(player.take_damage(1));
        for _ in 0..10 {
            assert!(!player.take_damage(1));
        }

        assert_eq!(player.lives, 2);
        assert!(player.is_invincible());
        assert!(player.velocity().y < 0.0);
    }

    #[test]
    fn invincibility_expires_and_allows_next_hit() {
        let solids = ground();
        let mut player = player();
        let geometry = LevelGeometry::new(&[], &solids);

        player.take_damage(1);
        for _ in 0..120 {
            player.update(&InputSnapshot::default(), DT, &geometry);
        }

        assert!(!player.is_invincible());
        assert!(player.take_damage(1));
        assert_eq!(player.lives, 1);
    }

    #[test]
    fn last_life_kills_and_freezes() {
        let mut player = player();
        player.lives = 1;

        player.take_damage(1);

        assert!(player.is_dead);
        assert_eq!(player.lives, 0);
        assert_eq!(player.velocity(), Vec2::ZERO);

        let before = player.position();
        let input = InputSnapshot {
            right: true,
            jump: true,
            attack: true,
            ..Default::default()
        };
        player.update(&input, DT, &LevelGeometry::new(&[], &[]));
        player.move_with(&input);
        assert!(!player.take_damage(1));
        assert_eq!(player.position(), before);
        assert_eq!(player.velocity(), Vec2::ZERO);
    }

    #[test]
    fn die_is_idempotent() {
        let mut player = player();
        player.die();
        player.die();
        assert!(player.is_dead);
        assert!(!player.death_animation_spawned);
    }

    #[test]
    fn zero_delta_skips_the_frame() {
        let mut player = player();
        let before = player.body;
        let input = InputSnapshot {
            right: true,
            ..Default::default()
        };

        player.update(&input, 0.0, &LevelGeometry::new(&[], &[]));

        assert_eq!(player.body, before);
    }

    #[test]
    fn flicker_alternates_while_invincible() {
        let mut player = player();
        assert!(!player.flicker_dimmed());

        player.take_damage(1);
        let geometry = LevelGeometry::new(&[], &[]);
        let mut seen = [false, false];
        for _ in 0..20 {
            player.update(&InputSnapshot::default(), DT, &geometry);
            seen[player.flicker_dimmed() as usize] = true;
        }

        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn reset_restores_spawn_state() {
        let mut player = player();
        player.take_damage(1);
        player.attack();
        player.body.position = Vec2::new(500.0, 10.0);
        player.die();

        player.reset();

        assert_eq!(player.lives, 3);
        assert!(!player.is_dead);
        assert!(!player.is_invincible());
        assert!(player.projectiles.is_empty());
        assert_eq!(player.position(), Vec2::new(100.0, 100.0));
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[test]
    fn arrows_are_culled_past_their_range() {
        let mut player = player();
        player.attack();

        for _ in 0..30 {
            player.update_projectiles(DT, 10_000.0);
        }
        assert_eq!(player.projectiles.len(), 1);

        for _ in 0..40 {
            player.update_projectiles(DT, 10_000.0);
        }
        assert!(player.projectiles.is_empty());
    }
}
