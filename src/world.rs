//! The frame-loop aggregate. `GameWorld` owns every simulated entity plus the platform pools and
//! runs one step per frame: player, enemies with combat adjudication, compaction, then course
//! bookkeeping. Nothing outside this module mutates entities between steps.

use bevy::prelude::*;

use crate::collision::{collision, platform_collision, Platform};
use crate::config::Tuning;
use crate::enemy::{Enemy, EnemyKind, EnemySpawn, Target};
use crate::input::{InputSnapshot, RESTART_KEY};
use crate::level::{recycle_threshold, ChunkContent, Course};
use crate::movement::{is_valid_dt, LevelGeometry};
use crate::player::Player;
use crate::projectile::DeathBurst;
use crate::state::GameSet;

/// Owns the `GameWorld` resource and the systems that restart and step it.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<WorldEvent>()
            .add_systems(Startup, setup_world)
            .add_systems(
                Update,
                (
                    restart_on_key.in_set(GameSet::Input),
                    advance_world.in_set(GameSet::Simulation),
                ),
            );
    }
}

/// What cost the player a life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Contact,
    Punch,
    Seed,
}

/// How an enemy was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillCause {
    Arrow,
    Stomp,
}

/// Things that happened during a step, for audio, transitions and logging.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    ArrowFired,
    SeedFired,
    EnemyKilled { kind: EnemyKind, cause: KillCause },
    PlayerHurt { source: DamageSource },
    PlayerDied,
    LevelAdvanced { level: usize },
    GameWon,
}

/// Every simulated entity plus the platform pools, stepped once per `Playing` frame.
#[derive(Resource, Debug, Clone)]
pub struct GameWorld {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// One-sided platforms.
    pub platforms: Vec<Platform>,
    pub solid_platforms: Vec<Platform>,
    pub effects: Vec<DeathBurst>,
    course: Course,
    initial_course: Course,
    tuning: Tuning,
    world_right: f32,
    game_won: bool,
}

impl GameWorld {
    /// Full course, with the opening chunks already built.
    pub fn new(tuning: &Tuning) -> Self {
        Self::with_course(tuning, Course::new())
    }

    /// No course at all. Geometry and enemies are added by hand.
    pub fn empty(tuning: &Tuning) -> Self {
        Self::with_course(tuning, Course::empty())
    }

    fn with_course(tuning: &Tuning, course: Course) -> Self {
        let mut world = Self {
            player: Player::new(&tuning.player, &tuning.arrow),
            enemies: Vec::new(),
            platforms: Vec::new(),
            solid_platforms: Vec::new(),
            effects: Vec::new(),
            course: course.clone(),
            initial_course: course,
            tuning: tuning.clone(),
            world_right: 0.0,
            game_won: false,
        };
        world.extend_course();
        world
    }

    /// Scene reload: the player respawns with full lives and the course is rebuilt from its
    /// first chunk.
    pub fn restart(&mut self) {
        self.player.reset();
        self.enemies.clear();
        self.platforms.clear();
        self.solid_platforms.clear();
        self.effects.clear();
        self.course = self.initial_course.clone();
        self.world_right = 0.0;
        self.game_won = false;
        self.extend_course();
        info!("Course restarted");
    }

    pub fn spawn_enemy(&mut self, spawn: &EnemySpawn) {
        self.enemies.push(Enemy::spawn(spawn, &self.tuning));
    }

    pub fn add_solid_platform(&mut self, platform: Platform) {
        self.world_right = self.world_right.max(platform.right());
        self.solid_platforms.push(platform);
    }

    pub fn add_platform(&mut self, platform: Platform) {
        self.world_right = self.world_right.max(platform.right());
        self.platforms.push(platform);
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn lives(&self) -> u32 {
        self.player.lives
    }

    pub fn remaining_enemies(&self) -> usize {
        self.enemies.len()
    }

    pub fn level(&self) -> usize {
        self.course.level()
    }

    pub fn total_levels(&self) -> usize {
        self.course.total_levels()
    }

    pub fn is_dead(&self) -> bool {
        self.player.is_dead
    }

    pub fn game_won(&self) -> bool {
        self.game_won
    }

    /// Right edge of everything built so far.
    pub fn world_right(&self) -> f32 {
        self.world_right.max(self.course.build_limit())
    }

    fn add_chunk(&mut self, chunk: ChunkContent) {
        for platform in chunk.solid_platforms {
            self.add_solid_platform(platform);
        }
        for platform in chunk.platforms {
            self.add_platform(platform);
        }
        for spawn in &chunk.enemies {
            self.spawn_enemy(spawn);
        }
    }

    fn extend_course(&mut self) {
        let view_width = self.tuning.world.view_width;
        while self.course.wants_chunk(self.player.position().x, view_width) {
            let Some(chunk) = self.course.build_next() else {
                break;
            };
            debug!(
                "Built chunk {} ({} enemies)",
                self.course.chunks_built(),
                chunk.enemies.len()
            );
            self.add_chunk(chunk);
        }
    }

    /// Spawns the player's death burst the first time death is observed.
    fn observe_player_death(&mut self, events: &mut Vec<WorldEvent>) {
        if !self.player.is_dead || self.player.death_animation_spawned {
            return;
        }

        self.player.death_animation_spawned = true;
        let burst = self.burst_at(self.player.body.center());
        self.effects.push(burst);
        events.push(WorldEvent::PlayerDied);
        info!("Player died on level {}", self.course.level());
    }

    fn burst_at(&self, center: Vec2) -> DeathBurst {
        let world = &self.tuning.world;
        DeathBurst::centered_on(
            center,
            world.death_burst_size,
            world.death_burst_frames,
            world.death_burst_interval_ms,
        )
    }

    /// Advances the whole simulation by `dt` seconds. A non-positive or non-finite `dt` is a
    /// dropped frame and changes nothing.
    pub fn step(&mut self, input: &InputSnapshot, dt: f32) -> Vec<WorldEvent> {
        let mut events = Vec::new();
        if !is_valid_dt(dt) {
            return events;
        }

        self.step_player(input, dt, &mut events);
        self.step_enemies(dt, &mut events);
        self.observe_player_death(&mut events);

        for effect in &mut self.effects {
            effect.update(dt);
        }
        self.effects.retain(|effect| !effect.is_done());

        self.step_course(&mut events);

        if !self.game_won
            && self.course.is_complete()
            && self.enemies.is_empty()
            && !self.player.is_dead
        {
            self.game_won = true;
            events.push(WorldEvent::GameWon);
            info!("All enemies cleared");
        }

        events
    }

    fn step_player(&mut self, input: &InputSnapshot, dt: f32, events: &mut Vec<WorldEvent>) {
        let world_right = self.world_right();
        let geometry = LevelGeometry::new(&self.platforms, &self.solid_platforms)
            .with_floor(self.tuning.world.floor_y);

        if self.player.update(input, dt, &geometry) {
            events.push(WorldEvent::ArrowFired);
        }

        // The right edge only closes once the last chunk exists.
        let body = &mut self.player.body;
        body.position.x = body.position.x.max(0.0);
        if self.course.is_complete() && world_right > body.size.x {
            body.position.x = body.position.x.min(world_right - body.size.x);
        }

        if !self.player.is_dead && self.player.body.position.y > self.tuning.world.death_zone_y {
            debug!("Player fell out of the world");
            self.player.die();
        }
        self.observe_player_death(events);

        self.player.update_projectiles(dt, world_right);
    }

    fn step_enemies(&mut self, dt: f32, events: &mut Vec<WorldEvent>) {
        let geometry = LevelGeometry::new(&self.platforms, &self.solid_platforms)
            .with_floor(self.tuning.world.floor_y);
        let damage = &self.tuning.damage;
        let death_zone_y = self.tuning.world.death_zone_y;
        let player = &mut self.player;

        let mut removed = vec![false; self.enemies.len()];
        let mut spent_arrows = vec![false; player.projectiles.len()];
        let mut bursts = Vec::new();

        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            let target = (!player.is_dead).then(|| Target {
                position: player.position(),
                hitbox: player.hitbox(),
            });
            let report = enemy.update(dt, &geometry, target.as_ref());
            if report.seed_fired {
                events.push(WorldEvent::SeedFired);
            }

            let enemy_hitbox = enemy.hitbox();

            let arrow_hit = player
                .projectiles
                .iter()
                .enumerate()
                .find(|(arrow, projectile)| {
                    !spent_arrows[*arrow] && collision(&projectile.aabb(), &enemy_hitbox)
                })
                .map(|(arrow, _)| arrow);
            if let Some(arrow) = arrow_hit {
                spent_arrows[arrow] = true;
                removed[index] = true;
                bursts.push(enemy.body.center());
                events.push(WorldEvent::EnemyKilled {
                    kind: enemy.kind(),
                    cause: KillCause::Arrow,
                });
                debug!("{:?} shot down", enemy.kind());
                continue;
            }

            if enemy.body.position.y > death_zone_y {
                removed[index] = true;
                debug!("{:?} fell out of the world", enemy.kind());
                continue;
            }

            if player.is_dead {
                continue;
            }

            if report.melee_hit {
                hurt(player, damage.punch, DamageSource::Punch, events);
            }

            let player_hitbox = player.hitbox();
            if platform_collision(&player_hitbox, &enemy_hitbox) && player.velocity().y > 0.0 {
                removed[index] = true;
                bursts.push(enemy.body.center());
                player.bounce();
                events.push(WorldEvent::EnemyKilled {
                    kind: enemy.kind(),
                    cause: KillCause::Stomp,
                });
                debug!("{:?} stomped", enemy.kind());
                continue;
            }
            if collision(&player_hitbox, &enemy_hitbox) {
                hurt(player, damage.contact, DamageSource::Contact, events);
            }

            if let Some(seeds) = enemy.seeds_mut() {
                let before = seeds.len();
                seeds.retain(|seed| !collision(&seed.aabb(), &player_hitbox));
                for _ in seeds.len()..before {
                    hurt(player, damage.seed, DamageSource::Seed, events);
                }
            }
        }

        let mut index = 0;
        self.enemies.retain(|_| {
            let keep = !removed[index];
            index += 1;
            keep
        });

        let mut arrow = 0;
        self.player.projectiles.retain(|_| {
            let keep = !spent_arrows[arrow];
            arrow += 1;
            keep
        });

        for center in bursts {
            let burst = self.burst_at(center);
            self.effects.push(burst);
        }
    }

    fn step_course(&mut self, events: &mut Vec<WorldEvent>) {
        let player_x = self.player.position().x;

        self.extend_course();

        // Only ledges are recycled. Ground stays so enemies left behind keep their footing.
        let threshold = recycle_threshold(player_x);
        self.platforms.retain(|platform| platform.right() >= threshold);

        if let Some(level) = self.course.track_player(player_x) {
            events.push(WorldEvent::LevelAdvanced { level });
        }
    }
}

fn hurt(player: &mut Player, amount: u32, source: DamageSource, events: &mut Vec<WorldEvent>) {
    if player.take_damage(amount) && !player.is_dead {
        events.push(WorldEvent::PlayerHurt { source });
    }
}

/// Builds the opening scene from the loaded tuning.
fn setup_world(mut commands: Commands, tuning: Res<Tuning>) {
    commands.insert_resource(GameWorld::new(&tuning));
}

/// Steps the world once with this frame's clamped delta and publishes what happened.
fn advance_world(
    time: Res<Time>,
    input: Res<InputSnapshot>,
    mut world: ResMut<GameWorld>,
    mut events: EventWriter<WorldEvent>,
) {
    let dt = time
        .delta_seconds()
        .min(world.tuning().world.max_frame_delta);
    events.send_batch(world.step(&input, dt));
}

/// Reloads the scene when R is pressed, whether the run is live, lost or won.
fn restart_on_key(keyboard: Res<ButtonInput<KeyCode>>, mut world: ResMut<GameWorld>) {
    if keyboard.just_pressed(RESTART_KEY) {
        world.restart();
    }
}
