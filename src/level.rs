//! Course construction and asset readiness.
//!
//! The course is a fixed sequence of chunks, `CHUNKS_PER_LEVEL` per level. Each chunk is a strip
//! of solid ground (with an optional pit), a few one-sided ledges and a handful of enemy spawns,
//! all taken from the static layout tables below. The world asks for the next chunk whenever the
//! player gets close to the build limit.

use std::ops::Range;

use bevy::asset::LoadState;
use bevy::math::Vec2;
use bevy::prelude::*;

use crate::animation::AnimState;
use crate::collision::{Cropbox, Platform};
use crate::enemy::{BrawlerState, EnemyKind, EnemySpawn, PatrollerState, ShooterState, BODY_SIZE};
use crate::player::PlayerState;
use crate::projectile::ProjectileKind;
use crate::state::GameState;

pub const CHUNKS_PER_LEVEL: usize = 4;
pub const TOTAL_LEVELS: usize = 5;
pub const TILES_PER_CHUNK: usize = 20;
pub const TILE_SPACING: f32 = 15.4;
pub const CHUNK_WIDTH: f32 = TILES_PER_CHUNK as f32 * TILE_SPACING;
pub const GROUND_TOP: f32 = 190.0;
pub const LEDGE_TILE: f32 = 16.0;

pub const TERRAIN_SHEET: &str = "tiles/grassland_terrain.png";

const GROUND: Cropbox = Cropbox::new(149.0, 123.0, 17.0, 19.0);
const LEDGE_LEFT: Cropbox = Cropbox::new(144.0, 48.0, 16.0, 16.0);
const LEDGE_CENTER: Cropbox = Cropbox::new(160.0, 48.0, 16.0, 16.0);
const LEDGE_RIGHT: Cropbox = Cropbox::new(208.0, 48.0, 16.0, 16.0);

/// A run of one-sided ledge tiles `rise` pixels above the ground top.
#[derive(Debug, Clone, Copy)]
struct LedgeLayout {
    x: f32,
    rise: f32,
    tiles: usize,
}

#[derive(Debug, Clone, Copy)]
struct EnemyLayout {
    kind: EnemyKind,
    x: f32,
    patrol: (f32, f32),
}

#[derive(Debug, Clone)]
struct ChunkLayout {
    /// Ground tile indices left out of the strip.
    pit: Option<Range<usize>>,
    ledges: &'static [LedgeLayout],
    enemies: &'static [EnemyLayout],
}

const fn enemy(kind: EnemyKind, x: f32, start: f32, end: f32) -> EnemyLayout {
    EnemyLayout {
        kind,
        x,
        patrol: (start, end),
    }
}

const fn ledge(x: f32, rise: f32, tiles: usize) -> LedgeLayout {
    LedgeLayout { x, rise, tiles }
}

static OPENING_ENEMIES: [EnemyLayout; 3] = [
    enemy(EnemyKind::Patroller, 150.0, 148.0, 231.0),
    enemy(EnemyKind::Brawler, 185.0, 148.0, 231.0),
    enemy(EnemyKind::Shooter, 210.0, 148.0, 231.0),
];

static STEPPED_LEDGES: [LedgeLayout; 3] = [
    ledge(32.0, 64.0, 3),
    ledge(128.0, 48.0, 4),
    ledge(224.0, 32.0, 2),
];
static HIGH_LEDGES: [LedgeLayout; 2] = [ledge(60.0, 56.0, 5), ledge(200.0, 40.0, 3)];

static FIELD_ENEMIES: [EnemyLayout; 2] = [
    enemy(EnemyKind::Patroller, 40.0, 20.0, 140.0),
    enemy(EnemyKind::Shooter, 200.0, 170.0, 290.0),
];
static DUEL_ENEMIES: [EnemyLayout; 2] = [
    enemy(EnemyKind::Brawler, 80.0, 30.0, 150.0),
    enemy(EnemyKind::Patroller, 230.0, 200.0, 300.0),
];
static GAUNTLET_ENEMIES: [EnemyLayout; 3] = [
    enemy(EnemyKind::Shooter, 20.0, 4.0, 110.0),
    enemy(EnemyKind::Brawler, 150.0, 130.0, 200.0),
    enemy(EnemyKind::Shooter, 260.0, 250.0, 300.0),
];

fn layout(level: usize, chunk_in_level: usize) -> ChunkLayout {
    match (level, chunk_in_level) {
        (1, 0) => ChunkLayout {
            pit: Some(15..17),
            ledges: &[],
            enemies: &OPENING_ENEMIES,
        },
        (_, 0) => ChunkLayout {
            pit: None,
            ledges: &STEPPED_LEDGES,
            enemies: &FIELD_ENEMIES,
        },
        (_, 1) => ChunkLayout {
            pit: Some(9..11),
            ledges: &HIGH_LEDGES,
            enemies: &FIELD_ENEMIES[..1],
        },
        (_, 2) => ChunkLayout {
            pit: None,
            ledges: &STEPPED_LEDGES,
            enemies: &DUEL_ENEMIES,
        },
        _ => ChunkLayout {
            pit: Some(6..8),
            ledges: &[],
            enemies: &GAUNTLET_ENEMIES[1..],
        },
    }
}

/// Geometry and spawns for one freshly built chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkContent {
    pub solid_platforms: Vec<Platform>,
    pub platforms: Vec<Platform>,
    pub enemies: Vec<EnemySpawn>,
}

fn build_chunk(level: usize, chunk_in_level: usize, start_x: f32) -> ChunkContent {
    let layout = layout(level, chunk_in_level);
    let mut content = ChunkContent::default();

    for tile in 0..TILES_PER_CHUNK {
        if layout.pit.as_ref().is_some_and(|pit| pit.contains(&tile)) {
            continue;
        }
        content.solid_platforms.push(Platform::new(
            Vec2::new(start_x + TILE_SPACING * tile as f32, GROUND_TOP),
            GROUND,
        ));
    }

    for ledge in layout.ledges {
        let y = GROUND_TOP - ledge.rise;
        for i in 0..ledge.tiles {
            let cropbox = match i {
                _ if ledge.tiles == 1 => LEDGE_CENTER,
                0 => LEDGE_LEFT,
                i if i == ledge.tiles - 1 => LEDGE_RIGHT,
                _ => LEDGE_CENTER,
            };
            content.platforms.push(Platform::new(
                Vec2::new(start_x + ledge.x + LEDGE_TILE * i as f32, y),
                cropbox,
            ));
        }
    }

    content.enemies = layout
        .enemies
        .iter()
        .map(|spawn| EnemySpawn {
            kind: spawn.kind,
            x: start_x + spawn.x,
            y: GROUND_TOP - BODY_SIZE.y,
            patrol_start_x: start_x + spawn.patrol.0,
            patrol_end_x: start_x + spawn.patrol.1,
        })
        .collect();

    content
}

/// Chunk builder state for one playthrough.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    build_limit: f32,
    chunks_built: usize,
    total_chunks: usize,
    level: usize,
}

impl Default for Course {
    fn default() -> Self {
        Self::new()
    }
}

impl Course {
    pub fn new() -> Self {
        Self {
            build_limit: 0.0,
            chunks_built: 0,
            total_chunks: TOTAL_LEVELS * CHUNKS_PER_LEVEL,
            level: 1,
        }
    }

    /// A course with nothing to build, for hand-assembled worlds.
    pub fn empty() -> Self {
        Self {
            total_chunks: 0,
            ..Self::new()
        }
    }

    pub fn build_limit(&self) -> f32 {
        self.build_limit
    }

    pub fn chunks_built(&self) -> usize {
        self.chunks_built
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn total_levels(&self) -> usize {
        TOTAL_LEVELS
    }

    /// Every chunk of the last level has been built.
    pub fn is_complete(&self) -> bool {
        self.chunks_built >= self.total_chunks
    }

    pub fn wants_chunk(&self, player_x: f32, view_width: f32) -> bool {
        !self.is_complete() && player_x + view_width > self.build_limit - CHUNK_WIDTH
    }

    pub fn build_next(&mut self) -> Option<ChunkContent> {
        if self.is_complete() {
            return None;
        }

        let level = self.chunks_built / CHUNKS_PER_LEVEL + 1;
        let chunk_in_level = self.chunks_built % CHUNKS_PER_LEVEL;
        let content = build_chunk(level, chunk_in_level, self.build_limit);

        self.build_limit += CHUNK_WIDTH;
        self.chunks_built += 1;
        Some(content)
    }

    /// Level the player is standing in, from its x position. Returns the new level when the
    /// player just crossed into it.
    pub fn track_player(&mut self, player_x: f32) -> Option<usize> {
        if self.total_chunks == 0 {
            return None;
        }

        let level_width = CHUNK_WIDTH * CHUNKS_PER_LEVEL as f32;
        let reached = ((player_x.max(0.0) / level_width) as usize + 1).min(TOTAL_LEVELS);
        if reached > self.level {
            self.level = reached;
            info!("Entering level {}/{}", self.level, TOTAL_LEVELS);
            return Some(self.level);
        }
        None
    }
}

/// One-sided platforms whose right edge is left of this line are recycled.
pub fn recycle_threshold(player_x: f32) -> f32 {
    player_x - CHUNK_WIDTH * 2.0
}

/// Queues course textures and holds the game in `Loading` until they settle.
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AssetReadiness>()
            .add_systems(OnEnter(GameState::Loading), queue_level_assets)
            .add_systems(
                Update,
                monitor_asset_readiness.run_if(in_state(GameState::Loading)),
            );
    }
}

/// Texture handles the course needs before the first frame is simulated. Once loading settles,
/// only the handles that actually loaded are kept.
#[derive(Resource, Default)]
pub struct AssetReadiness {
    pub textures: Vec<(&'static str, Handle<Image>)>,
    pub ready: bool,
}

impl AssetReadiness {
    /// Loaded texture for `path`, or `None` while still loading or when the file failed.
    pub fn texture(&self, path: &str) -> Option<&Handle<Image>> {
        if !self.ready {
            return None;
        }
        self.textures
            .iter()
            .find(|(image, _)| *image == path)
            .map(|(_, handle)| handle)
    }

    /// Drops failed handles and opens the gate.
    fn settle(&mut self, failed: &[&'static str]) {
        self.textures.retain(|(path, _)| !failed.contains(path));
        self.ready = true;
    }
}

/// Every image referenced by the clip tables plus the terrain sheet.
pub fn required_images() -> Vec<&'static str> {
    let mut images = vec![TERRAIN_SHEET];
    images.extend(
        [
            PlayerState::Idle,
            PlayerState::Run,
            PlayerState::Jump,
            PlayerState::Fall,
            PlayerState::Attack,
            PlayerState::Hurt,
        ]
        .map(|state| state.clip().image),
    );
    images.push(PatrollerState::Run.clip().image);
    images.extend(
        [BrawlerState::Run, BrawlerState::Air, BrawlerState::Attack].map(|state| state.clip().image),
    );
    images.extend(
        [ShooterState::Run, ShooterState::Air, ShooterState::Attack].map(|state| state.clip().image),
    );
    images.extend([ProjectileKind::Arrow, ProjectileKind::Seed].map(|kind| kind.clip().image));
    images.dedup();
    images
}

/// Starts loading every required texture.
fn queue_level_assets(asset_server: Res<AssetServer>, mut readiness: ResMut<AssetReadiness>) {
    readiness.ready = false;
    readiness.textures = required_images()
        .into_iter()
        .map(|path| (path, asset_server.load::<Image>(path)))
        .collect();
}

/// Polls the asset server until no handle is pending, then enters `Playing`.
fn monitor_asset_readiness(
    asset_server: Res<AssetServer>,
    mut readiness: ResMut<AssetReadiness>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let mut pending = 0;
    let mut failed = Vec::new();

    for (path, handle) in &readiness.textures {
        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => {}
            Some(LoadState::Failed(_)) => failed.push(*path),
            _ => pending += 1,
        }
    }

    if pending > 0 {
        return;
    }

    if !failed.is_empty() {
        warn!(
            "Unable to load {} texture(s) ({}); continuing with placeholder shapes.",
            failed.len(),
            failed.join(", ")
        );
    }

    info!("Course assets ready");
    readiness.settle(&failed);
    next_state.set(GameState::Playing);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_chunk_has_the_water_gap_and_three_enemies() {
        let mut course = Course::new();
        let chunk = course.build_next().unwrap();

        assert_eq!(chunk.solid_platforms.len(), TILES_PER_CHUNK - 2);
        let gap_start = TILE_SPACING * 15.0;
        assert!(chunk
            .solid_platforms
            .iter()
            .all(|tile| (tile.position.x - gap_start).abs() > 1.0
                && (tile.position.x - TILE_SPACING * 16.0).abs() > 1.0));

        let kinds: Vec<_> = chunk.enemies.iter().map(|spawn| spawn.kind).collect();
        assert_eq!(
            kinds,
            vec![EnemyKind::Patroller, EnemyKind::Brawler, EnemyKind::Shooter]
        );
        for spawn in &chunk.enemies {
            assert_eq!(spawn.y + BODY_SIZE.y, GROUND_TOP);
            assert_eq!((spawn.patrol_start_x, spawn.patrol_end_x), (148.0, 231.0));
        }
    }

    #[test]
    fn chunks_are_laid_end_to_end() {
        let mut course = Course::new();
        course.build_next();
        let second = course.build_next().unwrap();

        assert_eq!(course.build_limit(), CHUNK_WIDTH * 2.0);
        let first_tile = second.solid_platforms[0].position.x;
        assert!((first_tile - CHUNK_WIDTH).abs() < 1e-3);
        for spawn in &second.enemies {
            assert!(spawn.patrol_start_x >= CHUNK_WIDTH);
            assert!(spawn.patrol_end_x <= CHUNK_WIDTH * 2.0);
        }
    }

    #[test]
    fn enemies_patrol_over_solid_ground() {
        let mut course = Course::new();
        while let Some(chunk) = course.build_next() {
            for spawn in &chunk.enemies {
                assert!(spawn.patrol_start_x <= spawn.x);
                assert!(spawn.x + BODY_SIZE.x <= spawn.patrol_end_x);

                let mut x = spawn.patrol_start_x;
                while x <= spawn.patrol_end_x {
                    let supported = chunk
                        .solid_platforms
                        .iter()
                        .any(|tile| tile.position.x <= x && x <= tile.right());
                    assert!(supported, "no ground under x={x} for {:?}", spawn.kind);
                    x += 4.0;
                }
            }
        }
    }

    #[test]
    fn ledges_are_one_sided_and_capped() {
        let mut course = Course::new();
        course.build_next();
        let chunk = course.build_next().unwrap();

        assert!(!chunk.platforms.is_empty());
        assert!(chunk.platforms.iter().all(|p| p.position.y < GROUND_TOP));
        assert_eq!(chunk.platforms[0].cropbox, LEDGE_LEFT);
    }

    #[test]
    fn course_stops_after_the_last_level() {
        let mut course = Course::new();
        let mut built = 0;
        while course.build_next().is_some() {
            built += 1;
        }

        assert_eq!(built, TOTAL_LEVELS * CHUNKS_PER_LEVEL);
        assert!(course.is_complete());
        assert!(!course.wants_chunk(course.build_limit(), 256.0));
    }

    #[test]
    fn extension_rule_builds_ahead_of_the_player() {
        let mut course = Course::new();
        assert!(course.wants_chunk(100.0, 256.0));
        course.build_next();
        assert!(course.wants_chunk(100.0, 256.0));
        course.build_next();
        assert!(course.wants_chunk(100.0, 256.0));
        course.build_next();
        assert!(!course.wants_chunk(100.0, 256.0));
        assert!(course.wants_chunk(CHUNK_WIDTH + 60.0, 256.0));
    }

    #[test]
    fn level_follows_the_player() {
        let mut course = Course::new();
        assert_eq!(course.track_player(100.0), None);
        assert_eq!(course.track_player(CHUNK_WIDTH * 4.0 + 1.0), Some(2));
        assert_eq!(course.track_player(CHUNK_WIDTH * 4.0 + 2.0), None);
        assert_eq!(course.track_player(CHUNK_WIDTH * 100.0), Some(TOTAL_LEVELS));
        assert_eq!(course.level(), TOTAL_LEVELS);
    }

    #[test]
    fn empty_course_is_complete() {
        let mut course = Course::empty();
        assert!(course.is_complete());
        assert!(course.build_next().is_none());
        assert_eq!(course.track_player(10_000.0), None);
        assert_eq!(course.level(), 1);
    }

    #[test]
    fn textures_are_hidden_until_loading_settles() {
        let mut readiness = AssetReadiness {
            textures: vec![
                (TERRAIN_SHEET, Handle::default()),
                (PlayerState::Idle.clip().image, Handle::default()),
            ],
            ready: false,
        };
        assert!(readiness.texture(TERRAIN_SHEET).is_none());

        readiness.settle(&[PlayerState::Idle.clip().image]);

        assert!(readiness.ready);
        assert!(readiness.texture(TERRAIN_SHEET).is_some());
        assert!(readiness.texture(PlayerState::Idle.clip().image).is_none());
    }

    #[test]
    fn every_clip_image_is_required() {
        let images = required_images();
        assert!(images.contains(&TERRAIN_SHEET));
        assert!(images.contains(&PlayerState::Attack.clip().image));
        assert!(images.contains(&ProjectileKind::Seed.clip().image));
    }
}
