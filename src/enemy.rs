//! Enemy behaviours. All three kinds share `KinematicBody` + `Animator` and differ only in the
//! decision logic layered on top:
//!
//! - `Patroller` walks its patrol segment at constant speed.
//! - `Brawler` patrols with short hops and punches a nearby player on a fixed action frame.
//! - `Shooter` patrols with short hops and, on landing with its cooldown elapsed, fires a seed.
//!
//! Patrol reversal is purely positional: the body turns around when it reaches a bound while
//! moving toward it, or when a solid wall stops it.

use bevy::log::debug;
use bevy::math::Vec2;

use crate::animation::{AnimState, Animator, Clip};
use crate::collision::{collision, Aabb};
use crate::config::{BrawlerTuning, PatrollerTuning, ProjectileTuning, ShooterTuning, Tuning};
use crate::movement::{
    is_valid_dt, BodyPhysics, Facing, KinematicBody, LevelGeometry, VerticalContact,
};
use crate::projectile::{Projectile, ProjectileKind};

pub const BODY_SIZE: Vec2 = Vec2::new(20.0, 20.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Patroller,
    Brawler,
    Shooter,
}

/// Placement produced by the course builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    pub patrol_start_x: f32,
    pub patrol_end_x: f32,
}

/// What an enemy may react to this frame. Absent once the player is dead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub position: Vec2,
    pub hitbox: Aabb,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnemyReport {
    /// A punch connected with the target this frame.
    pub melee_hit: bool,
    pub seed_fired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatrollerState {
    Run,
}

impl AnimState for PatrollerState {
    fn clip(self) -> Clip {
        Clip::looping("sprites/cerejinha/run.png", 6, 100)
    }

    fn resting() -> Self {
        PatrollerState::Run
    }

    fn key(self) -> &'static str {
        "run"
    }

    fn from_key(key: &str) -> Option<Self> {
        (key == "run").then_some(PatrollerState::Run)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrawlerState {
    Run,
    Air,
    Attack,
}

/// Punch animation frame on which the attack hitbox goes live.
pub const PUNCH_ACTION_FRAME: u32 = 3;

impl AnimState for BrawlerState {
    fn clip(self) -> Clip {
        match self {
            BrawlerState::Run => Clip::looping("sprites/astro/run.png", 6, 90),
            BrawlerState::Air => Clip::looping("sprites/astro/jump.png", 1, 120),
            BrawlerState::Attack => Clip::one_shot("sprites/astro/punch.png", 7, 80)
                .with_action_frame(PUNCH_ACTION_FRAME),
        }
    }

    fn resting() -> Self {
        BrawlerState::Run
    }

    fn key(self) -> &'static str {
        match self {
            BrawlerState::Run => "run",
            BrawlerState::Air => "air",
            BrawlerState::Attack => "attack",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "run" => Some(BrawlerState::Run),
            "air" => Some(BrawlerState::Air),
            "attack" => Some(BrawlerState::Attack),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShooterState {
    Run,
    Air,
    Attack,
}

pub const SEED_ACTION_FRAME: u32 = 2;

impl AnimState for ShooterState {
    fn clip(self) -> Clip {
        match self {
            ShooterState::Run => Clip::looping("sprites/cebolete/run.png", 6, 90),
            ShooterState::Air => Clip::looping("sprites/cebolete/jump.png", 1, 120),
            ShooterState::Attack => Clip::one_shot("sprites/cebolete/seed_launch.png", 4, 100)
                .with_action_frame(SEED_ACTION_FRAME),
        }
    }

    fn resting() -> Self {
        ShooterState::Run
    }

    fn key(self) -> &'static str {
        match self {
            ShooterState::Run => "run",
            ShooterState::Air => "air",
            ShooterState::Attack => "attack",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "run" => Some(ShooterState::Run),
            "air" => Some(ShooterState::Air),
            "attack" => Some(ShooterState::Attack),
            _ => None,
        }
    }
}

/// Forward punch box, live only on the punch's action frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttackHitbox {
    pub aabb: Aabb,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct Patroller {
    animator: Animator<PatrollerState>,
    tuning: PatrollerTuning,
}

#[derive(Debug, Clone)]
pub struct Brawler {
    animator: Animator<BrawlerState>,
    pub attack_cooldown: f32,
    pub attack_hitbox: AttackHitbox,
    hop_timer: f32,
    tuning: BrawlerTuning,
}

#[derive(Debug, Clone)]
pub struct Shooter {
    animator: Animator<ShooterState>,
    pub attack_cooldown: f32,
    pub has_fired: bool,
    pub projectiles: Vec<Projectile>,
    hop_timer: f32,
    tuning: ShooterTuning,
    seed: ProjectileTuning,
}

#[derive(Debug, Clone)]
pub enum Behavior {
    Patroller(Patroller),
    Brawler(Brawler),
    Shooter(Shooter),
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub body: KinematicBody,
    pub facing: Facing,
    pub patrol_start_x: f32,
    pub patrol_end_x: f32,
    pub behavior: Behavior,
}

impl Enemy {
    pub fn spawn(spawn: &EnemySpawn, tuning: &Tuning) -> Self {
        let position = Vec2::new(spawn.x, spawn.y);
        let (body, behavior) = match spawn.kind {
            EnemyKind::Patroller => (
                KinematicBody::new(position, BODY_SIZE)
                    .with_hitbox(Vec2::new(3.0, 6.0), Vec2::splat(14.0)),
                Behavior::Patroller(Patroller {
                    animator: Animator::new(PatrollerState::Run),
                    tuning: tuning.patroller.clone(),
                }),
            ),
            EnemyKind::Brawler => (
                KinematicBody::new(position, BODY_SIZE)
                    .with_hitbox(Vec2::new(3.0, 6.0), Vec2::splat(14.0)),
                Behavior::Brawler(Brawler {
                    animator: Animator::new(BrawlerState::Run),
                    attack_cooldown: 0.0,
                    attack_hitbox: AttackHitbox::default(),
                    hop_timer: tuning.brawler.hop_gap,
                    tuning: tuning.brawler.clone(),
                }),
            ),
            EnemyKind::Shooter => (
                KinematicBody::new(position, BODY_SIZE)
                    .with_hitbox(Vec2::new(2.0, 4.0), Vec2::splat(16.0)),
                Behavior::Shooter(Shooter {
                    animator: Animator::new(ShooterState::Run),
                    attack_cooldown: 0.0,
                    has_fired: false,
                    projectiles: Vec::new(),
                    hop_timer: tuning.shooter.hop_gap,
                    tuning: tuning.shooter.clone(),
                    seed: tuning.seed.clone(),
                }),
            ),
        };

        let facing = Facing::Right;
        let mut enemy = Self {
            body,
            facing,
            patrol_start_x: spawn.patrol_start_x,
            patrol_end_x: spawn.patrol_end_x,
            behavior,
        };
        enemy.body.velocity.x = enemy.speed() * facing.sign();
        enemy
    }

    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Patroller(_) => EnemyKind::Patroller,
            Behavior::Brawler(_) => EnemyKind::Brawler,
            Behavior::Shooter(_) => EnemyKind::Shooter,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        self.body.hitbox()
    }

    fn speed(&self) -> f32 {
        match &self.behavior {
            Behavior::Patroller(p) => p.tuning.speed,
            Behavior::Brawler(b) => b.tuning.speed,
            Behavior::Shooter(s) => s.tuning.speed,
        }
    }

    /// Active clip, for the renderer.
    pub fn clip(&self) -> Clip {
        match &self.behavior {
            Behavior::Patroller(p) => p.animator.clip(),
            Behavior::Brawler(b) => b.animator.clip(),
            Behavior::Shooter(s) => s.animator.clip(),
        }
    }

    pub fn current_frame(&self) -> u32 {
        match &self.behavior {
            Behavior::Patroller(p) => p.animator.current_frame(),
            Behavior::Brawler(b) => b.animator.current_frame(),
            Behavior::Shooter(s) => s.animator.current_frame(),
        }
    }

    pub fn seeds(&self) -> &[Projectile] {
        match &self.behavior {
            Behavior::Shooter(s) => &s.projectiles,
            _ => &[],
        }
    }

    pub fn seeds_mut(&mut self) -> Option<&mut Vec<Projectile>> {
        match &mut self.behavior {
            Behavior::Shooter(s) => Some(&mut s.projectiles),
            _ => None,
        }
    }

    pub fn update(
        &mut self,
        dt: f32,
        geometry: &LevelGeometry,
        target: Option<&Target>,
    ) -> EnemyReport {
        if !is_valid_dt(dt) {
            return EnemyReport::default();
        }

        let Enemy {
            body,
            facing,
            patrol_start_x,
            patrol_end_x,
            behavior,
        } = self;
        let patrol = Patrol {
            start_x: *patrol_start_x,
            end_x: *patrol_end_x,
        };

        match behavior {
            Behavior::Patroller(p) => p.update(body, facing, patrol, dt, geometry),
            Behavior::Brawler(b) => b.update(body, facing, patrol, dt, geometry, target),
            Behavior::Shooter(s) => s.update(body, facing, patrol, dt, geometry, target),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Patrol {
    start_x: f32,
    end_x: f32,
}

/// Walks the body along its facing, integrates, then turns around at the patrol bounds or
/// against a wall.
fn patrol_step(
    body: &mut KinematicBody,
    facing: &mut Facing,
    patrol: Patrol,
    speed: f32,
    dt: f32,
    physics: BodyPhysics,
    geometry: &LevelGeometry,
) -> VerticalContact {
    body.velocity.x = speed * facing.sign();
    let contact = body.integrate(dt, physics, geometry);

    if body.velocity.x == 0.0 && speed > 0.0 {
        *facing = match facing {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        };
        body.velocity.x = speed * facing.sign();
    }

    if body.position.x + body.size.x >= patrol.end_x && body.velocity.x > 0.0 {
        body.position.x = patrol.end_x - body.size.x;
        body.velocity.x = -speed;
        *facing = Facing::Left;
    } else if body.position.x <= patrol.start_x && body.velocity.x < 0.0 {
        body.position.x = patrol.start_x;
        body.velocity.x = speed;
        *facing = Facing::Right;
    }

    contact
}

impl Patroller {
    fn update(
        &mut self,
        body: &mut KinematicBody,
        facing: &mut Facing,
        patrol: Patrol,
        dt: f32,
        geometry: &LevelGeometry,
    ) -> EnemyReport {
        self.animator.advance(dt);
        patrol_step(
            body,
            facing,
            patrol,
            self.tuning.speed,
            dt,
            self.tuning.physics,
            geometry,
        );
        EnemyReport::default()
    }
}

impl Brawler {
    pub fn state(&self) -> BrawlerState {
        self.animator.state()
    }

    fn wants_to_punch(&self, body: &KinematicBody, target: Option<&Target>) -> Option<Facing> {
        if self.attack_cooldown > 0.0 || self.state() != BrawlerState::Run {
            return None;
        }
        let target = target?;
        let dx = target.position.x - body.position.x;
        let dy = target.position.y - body.position.y;

        (dx.abs() < self.tuning.attack_range && dy.abs() < self.tuning.attack_band)
            .then(|| Facing::toward(body.position.x, target.position.x))
    }

    fn place_punch(&mut self, body: &KinematicBody, facing: Facing) {
        let width = self.tuning.punch_width;
        let height = self.tuning.punch_height;
        let x = match facing {
            Facing::Right => body.position.x + body.size.x,
            Facing::Left => body.position.x - width,
        };
        let y = body.position.y + body.size.y * 0.5 - height * 0.5;
        self.attack_hitbox = AttackHitbox {
            aabb: Aabb::new(Vec2::new(x, y), width, height),
            is_active: true,
        };
    }

    fn update(
        &mut self,
        body: &mut KinematicBody,
        facing: &mut Facing,
        patrol: Patrol,
        dt: f32,
        geometry: &LevelGeometry,
        target: Option<&Target>,
    ) -> EnemyReport {
        let mut report = EnemyReport::default();

        if self.attack_cooldown > 0.0 {
            self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        }
        self.attack_hitbox.is_active = false;

        let tick = self.animator.advance(dt);
        let attacking =
            self.state() == BrawlerState::Attack || tick.finished == Some(BrawlerState::Attack);

        if attacking {
            if tick.action_frame_reached {
                self.place_punch(body, *facing);
                if let Some(target) = target {
                    if collision(&self.attack_hitbox.aabb, &target.hitbox) {
                        report.melee_hit = true;
                        self.attack_hitbox.is_active = false;
                        debug!("Brawler punch connected");
                    }
                }
            }
            body.velocity.x = 0.0;
            body.integrate(dt, self.tuning.physics, geometry);
            return report;
        }

        if let Some(toward) = self.wants_to_punch(body, target) {
            *facing = toward;
            self.animator.switch(BrawlerState::Attack);
            self.attack_cooldown = self.tuning.attack_cooldown;
            body.velocity.x = 0.0;
            body.integrate(dt, self.tuning.physics, geometry);
            return report;
        }

        let contact = patrol_step(
            body,
            facing,
            patrol,
            self.tuning.speed,
            dt,
            self.tuning.physics,
            geometry,
        );

        if contact.landed {
            self.animator.switch(BrawlerState::Run);
            self.hop_timer -= dt;
            if self.hop_timer <= 0.0 {
                body.velocity.y = -self.tuning.hop_velocity;
                body.on_ground = false;
                self.animator.switch(BrawlerState::Air);
                self.hop_timer = self.tuning.hop_gap;
            }
        } else {
            self.animator.switch(BrawlerState::Air);
        }

        report
    }
}

impl Shooter {
    pub fn state(&self) -> ShooterState {
        self.animator.state()
    }

    fn target_in_sight(&self, body: &KinematicBody, target: Option<&Target>) -> Option<Facing> {
        let target = target?;
        let dx = target.position.x - body.position.x;
        (dx.abs() <= self.tuning.sight_range)
            .then(|| Facing::toward(body.position.x, target.position.x))
    }

    fn fire(&mut self, body: &KinematicBody, facing: Facing) {
        let bounds = body.bounds();
        let anchor_x = match facing {
            Facing::Right => bounds.right(),
            Facing::Left => bounds.left(),
        };
        self.projectiles.push(Projectile::launch(
            ProjectileKind::Seed,
            anchor_x,
            bounds.center().y,
            facing,
            &self.seed,
        ));
        self.has_fired = true;
    }

    fn update(
        &mut self,
        body: &mut KinematicBody,
        facing: &mut Facing,
        patrol: Patrol,
        dt: f32,
        geometry: &LevelGeometry,
        target: Option<&Target>,
    ) -> EnemyReport {
        let mut report = EnemyReport::default();

        if self.attack_cooldown > 0.0 {
            self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        }

        for seed in &mut self.projectiles {
            seed.update(dt);
        }
        self.projectiles.retain(|seed| !seed.is_expired(f32::INFINITY));

        let tick = self.animator.advance(dt);
        let attacking =
            self.state() == ShooterState::Attack || tick.finished == Some(ShooterState::Attack);

        if attacking {
            if tick.action_frame_reached && !self.has_fired {
                self.fire(body, *facing);
                report.seed_fired = true;
            }
            body.velocity.x = 0.0;
            body.integrate(dt, self.tuning.physics, geometry);
            return report;
        }

        let contact = patrol_step(
            body,
            facing,
            patrol,
            self.tuning.speed,
            dt,
            self.tuning.physics,
            geometry,
        );

        if !contact.landed {
            self.animator.switch(ShooterState::Air);
            return report;
        }

        self.animator.switch(ShooterState::Run);
        if self.attack_cooldown <= 0.0 {
            if let Some(toward) = self.target_in_sight(body, target) {
                *facing = toward;
                self.animator.switch(ShooterState::Attack);
                self.has_fired = false;
                self.attack_cooldown = self.tuning.fire_cooldown;
                body.velocity.x = 0.0;
                return report;
            }
        }

        self.hop_timer -= dt;
        if self.hop_timer <= 0.0 {
            body.velocity.y = -self.tuning.hop_velocity;
            body.on_ground = false;
            self.animator.switch(ShooterState::Air);
            self.hop_timer = self.tuning.hop_gap;
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Cropbox, Platform};

    const DT: f32 = 1.0 / 60.0;

    impl Enemy {
        fn state_key(&self) -> &'static str {
            match &self.behavior {
                Behavior::Patroller(p) => p.animator.state().key(),
                Behavior::Brawler(b) => b.animator.state().key(),
                Behavior::Shooter(s) => s.animator.state().key(),
            }
        }

        fn is_attacking(&self) -> bool {
            self.state_key() == BrawlerState::Attack.key()
        }
    }

    fn ground() -> Vec<Platform> {
        (0..40)
            .map(|i| {
                Platform::new(
                    Vec2::new(i as f32 * 16.0, 120.0),
                    Cropbox::new(0.0, 0.0, 16.0, 16.0),
                )
            })
            .collect()
    }

    fn spawn(kind: EnemyKind, x: f32) -> Enemy {
        Enemy::spawn(
            &EnemySpawn {
                kind,
                x,
                y: 100.0,
                patrol_start_x: 148.0,
                patrol_end_x: 231.0,
            },
            &Tuning::default(),
        )
    }

    fn target_at(x: f32, y: f32) -> Target {
        let position = Vec2::new(x, y);
        Target {
            position,
            hitbox: Aabb::new(position, 16.0, 16.0),
        }
    }

    fn brawler(enemy: &Enemy) -> &Brawler {
        match &enemy.behavior {
            Behavior::Brawler(b) => b,
            _ => panic!("not a brawler"),
        }
    }

    fn shooter(enemy: &Enemy) -> &Shooter {
        match &enemy.behavior {
            Behavior::Shooter(s) => s,
            _ => panic!("not a shooter"),
        }
    }

    #[test]
    fn patrol_stays_within_bounds_and_flips_at_them() {
        let solids = ground();
        let geometry = LevelGeometry::new(&[], &solids);

        for kind in [EnemyKind::Patroller, EnemyKind::Brawler, EnemyKind::Shooter] {
            let mut enemy = spawn(kind, 180.0);
            let width = enemy.body.size.x;
            let mut flips = 0;
            let mut last_sign = enemy.body.velocity.x.signum();

            for _ in 0..(60 * 30) {
                enemy.update(DT, &geometry, None);
                let x = enemy.body.position.x;
                assert!(x >= 148.0, "{kind:?} left bound crossed at {x}");
                assert!(x <= 231.0 + width, "{kind:?} right bound crossed at {x}");

                let sign = enemy.body.velocity.x.signum();
                if sign != 0.0 && sign != last_sign {
                    flips += 1;
                    let at_bound = (x - 148.0).abs() < 1e-3 || (x + width - 231.0).abs() < 1e-3;
                    assert!(at_bound, "{kind:?} turned at {x}");
                    last_sign = sign;
                }
            }

            assert!(flips >= 2, "{kind:?} never patrolled both ways");
        }
    }

    #[test]
    fn patroller_turns_around_at_walls() {
        let mut solids = ground();
        solids.push(Platform::new(
            Vec2::new(190.0, 104.0),
            Cropbox::new(0.0, 0.0, 16.0, 16.0),
        ));
        let geometry = LevelGeometry::new(&[], &solids);
        let mut enemy = spawn(EnemyKind::Patroller, 160.0);

        for _ in 0..120 {
            enemy.update(DT, &geometry, None);
        }

        assert!(enemy.hitbox().right() <= 190.0);
    }

    #[test]
    fn brawler_punch_hits_once_per_swing() {
        let solids = ground();
        let geometry = LevelGeometry::new(&[], &solids);
        let mut enemy = spawn(EnemyKind::Brawler, 180.0);
        for _ in 0..5 {
            enemy.update(DT, &geometry, None);
        }

        let x = enemy.body.position.x + 24.0;
        let target = target_at(x, enemy.body.position.y + 2.0);
        let mut hits = 0;
        let mut attacked = false;
        for _ in 0..60 {
            let report = enemy.update(DT, &geometry, Some(&target));
            attacked |= enemy.is_attacking();
            if report.melee_hit {
                hits += 1;
            }
        }

        assert!(attacked);
        assert_eq!(hits, 1);
        assert_eq!(enemy.facing, Facing::Right);
    }

    #[test]
    fn brawler_stands_still_while_punching() {
        let solids = ground();
        let geometry = LevelGeometry::new(&[], &solids);
        let mut enemy = spawn(EnemyKind::Brawler, 180.0);
        for _ in 0..5 {
            enemy.update(DT, &geometry, None);
        }
        let target = target_at(enemy.body.position.x - 20.0, enemy.body.position.y);

        enemy.update(DT, &geometry, Some(&target));
        assert!(enemy.is_attacking());
        assert_eq!(enemy.facing, Facing::Left);
        let x = enemy.body.position.x;

        for _ in 0..10 {
            enemy.update(DT, &geometry, Some(&target));
            assert_eq!(enemy.body.position.x, x);
        }
    }

    #[test]
    fn brawler_cooldown_blocks_reentry() {
        let solids = ground();
        let geometry = LevelGeometry::new(&[], &solids);
        let mut enemy = spawn(EnemyKind::Brawler, 180.0);
        for _ in 0..5 {
            enemy.update(DT, &geometry, None);
        }

        let mut swings = 0;
        let mut was_attacking = false;
        for _ in 0..(60 + 30) {
            let target = target_at(enemy.body.position.x + 10.0, enemy.body.position.y);
            enemy.update(DT, &geometry, Some(&target));
            if enemy.is_attacking() && !was_attacking {
                swings += 1;
            }
            was_attacking = enemy.is_attacking();
        }

        // 1.5 s of constant proximity with a 2 s cooldown allows exactly one swing.
        assert_eq!(swings, 1);
        assert!(brawler(&enemy).attack_cooldown > 0.0);
    }

    #[test]
    fn brawler_ignores_distant_player() {
        let solids = ground();
        let geometry = LevelGeometry::new(&[], &solids);
        let mut enemy = spawn(EnemyKind::Brawler, 180.0);
        let far = target_at(400.0, 100.0);
        let high = target_at(185.0, 20.0);

        for _ in 0..120 {
            enemy.update(DT, &geometry, Some(&far));
            enemy.update(DT, &geometry, Some(&high));
            assert!(!enemy.is_attacking());
        }
    }

    #[test]
    fn shooter_fires_once_per_attack_and_respects_cooldown() {
        let solids = ground();
        let geometry = LevelGeometry::new(&[], &solids);
        let mut enemy = spawn(EnemyKind::Shooter, 180.0);
        let target = target_at(60.0, 100.0);

        let mut fire_times = Vec::new();
        for frame in 0..(60 * 6) {
            let report = enemy.update(DT, &geometry, Some(&target));
            if report.seed_fired {
                fire_times.push(frame as f32 * DT);
            }
        }

        assert!(fire_times.len() >= 2);
        for pair in fire_times.windows(2) {
            assert!(pair[1] - pair[0] >= 2.5 - 1e-3, "fired again after {:?}", pair);
        }
        assert!(shooter(&enemy).projectiles.len() <= fire_times.len());
    }

    #[test]
    fn shooter_seed_leaves_from_leading_edge() {
        let solids = ground();
        let geometry = LevelGeometry::new(&[], &solids);
        let mut enemy = spawn(EnemyKind::Shooter, 180.0);
        let target = target_at(300.0, 100.0);

        let mut fired = false;
        for _ in 0..120 {
            if enemy.update(DT, &geometry, Some(&target)).seed_fired {
                fired = true;
                break;
            }
        }

        assert!(fired);
        assert_eq!(enemy.facing, Facing::Right);
        let seed = &enemy.seeds()[0];
        assert!(seed.velocity_x > 0.0);
        assert!((seed.position.x - enemy.body.bounds().right()).abs() < 1e-3);
        assert!(shooter(&enemy).has_fired);
    }

    #[test]
    fn shooter_holds_fire_without_target() {
        let solids = ground();
        let geometry = LevelGeometry::new(&[], &solids);
        let mut enemy = spawn(EnemyKind::Shooter, 180.0);

        for _ in 0..300 {
            assert!(!enemy.update(DT, &geometry, None).seed_fired);
        }
        assert!(enemy.seeds().is_empty());
    }

    #[test]
    fn hoppers_leave_the_ground_periodically() {
        let solids = ground();
        let geometry = LevelGeometry::new(&[], &solids);
        let mut enemy = spawn(EnemyKind::Brawler, 180.0);

        let mut airborne = false;
        for _ in 0..120 {
            enemy.update(DT, &geometry, None);
            airborne |= enemy.state_key() == "air" && enemy.body.velocity.y < 0.0;
        }
        assert!(airborne);
    }

    #[test]
    fn zero_delta_changes_nothing() {
        let geometry = LevelGeometry::new(&[], &[]);
        let mut enemy = spawn(EnemyKind::Shooter, 180.0);
        let before = enemy.body;

        let report = enemy.update(0.0, &geometry, Some(&target_at(180.0, 100.0)));

        assert_eq!(report, EnemyReport::default());
        assert_eq!(enemy.body, before);
    }
}
