//! Draws the world. Terrain tiles and animation frames are cut from their sheets once the
//! textures have loaded; anything without a loaded texture falls back to a flat coloured rectangle.
//!
//! The simulation's y axis points down; Bevy's points up. `to_screen` is the only place the two
//! meet. Shape entities are pooled: each frame the existing sprites are rewritten in order, extra
//! ones are spawned and leftovers despawned.

use bevy::prelude::*;

use crate::animation::{AnimState, Clip};
use crate::collision::{Aabb, Cropbox};
use crate::enemy::{Behavior, EnemyKind};
use crate::level::{AssetReadiness, TERRAIN_SHEET};
use crate::movement::Facing;
use crate::state::GameSet;
use crate::world::GameWorld;

/// Registers the shape sync system after the world step.
pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            sync_shapes
                .after(GameSet::Simulation)
                .run_if(resource_exists::<GameWorld>),
        );
    }
}

pub fn to_screen(position: Vec2) -> Vec2 {
    Vec2::new(position.x, -position.y)
}

/// Marker on pooled sprite entities owned by the renderer.
#[derive(Component)]
struct WorldShape;

/// Where on its sheet a textured shape is cut from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Source {
    Crop(Cropbox),
    /// Frame `index` of a horizontal strip of `count` equal frames.
    Frame { index: u32, count: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texture {
    pub image: &'static str,
    pub source: Source,
    pub flip_x: bool,
}

impl Texture {
    fn frame(clip: Clip, index: u32, facing: Facing) -> Self {
        Self {
            image: clip.image,
            source: Source::Frame {
                index,
                count: clip.total_frames,
            },
            flip_x: facing == Facing::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub rect: Aabb,
    pub color: Color,
    pub z: f32,
    pub texture: Option<Texture>,
}

impl Shape {
    fn new(rect: Aabb, color: Color, z: f32) -> Self {
        Self {
            rect,
            color,
            z,
            texture: None,
        }
    }

    fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    fn translation(&self) -> Vec3 {
        to_screen(self.rect.center()).extend(self.z)
    }
}

/// Pixel rectangle of `source` on a sheet of `sheet_size`.
pub fn source_rect(source: Source, sheet_size: Vec2) -> Rect {
    match source {
        Source::Crop(crop) => Rect::new(crop.x, crop.y, crop.x + crop.width, crop.y + crop.height),
        Source::Frame { index, count } => {
            let width = sheet_size.x / count.max(1) as f32;
            let index = index.min(count.saturating_sub(1)) as f32;
            Rect::new(index * width, 0.0, (index + 1.0) * width, sheet_size.y)
        }
    }
}

const GROUND: Color = Color::srgb(0.36, 0.55, 0.2);
const LEDGE: Color = Color::srgb(0.55, 0.4, 0.22);
const PLAYER: Color = Color::srgb(0.95, 0.85, 0.3);
const ARROW: Color = Color::srgb(0.9, 0.9, 0.9);
const SEED: Color = Color::srgb(0.4, 0.75, 0.25);
const PUNCH: Color = Color::srgb(1.0, 0.2, 0.2);
const BURST: Color = Color::srgba(1.0, 0.55, 0.1, 0.8);

fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Patroller => Color::srgb(0.85, 0.2, 0.35),
        EnemyKind::Brawler => Color::srgb(0.45, 0.3, 0.8),
        EnemyKind::Shooter => Color::srgb(0.3, 0.65, 0.45),
    }
}

/// Everything visible this frame, back to front.
pub fn collect_shapes(world: &GameWorld) -> Vec<Shape> {
    let mut shapes = Vec::new();

    shapes.extend(
        world
            .solid_platforms
            .iter()
            .map(|platform| {
                Shape::new(platform.aabb(), GROUND, 0.0).with_texture(Texture {
                    image: TERRAIN_SHEET,
                    source: Source::Crop(platform.cropbox),
                    flip_x: false,
                })
            }),
    );
    shapes.extend(
        world
            .platforms
            .iter()
            .map(|platform| {
                Shape::new(platform.aabb(), LEDGE, 1.0).with_texture(Texture {
                    image: TERRAIN_SHEET,
                    source: Source::Crop(platform.cropbox),
                    flip_x: false,
                })
            }),
    );

    for enemy in &world.enemies {
        shapes.push(
            Shape::new(enemy.body.bounds(), enemy_color(enemy.kind()), 2.0).with_texture(
                Texture::frame(enemy.clip(), enemy.current_frame(), enemy.facing),
            ),
        );
        match &enemy.behavior {
            Behavior::Brawler(brawler) if brawler.attack_hitbox.is_active => {
                shapes.push(Shape::new(brawler.attack_hitbox.aabb, PUNCH, 3.0));
            }
            _ => {}
        }
        shapes.extend(
            enemy
                .seeds()
                .iter()
                .map(|seed| {
                    Shape::new(seed.aabb(), SEED, 3.0).with_texture(Texture::frame(
                        seed.kind.clip(),
                        seed.current_frame(),
                        seed.facing,
                    ))
                }),
        );
    }

    shapes.extend(
        world
            .player
            .projectiles
            .iter()
            .map(|arrow| {
                Shape::new(arrow.aabb(), ARROW, 3.0).with_texture(Texture::frame(
                    arrow.kind.clip(),
                    arrow.current_frame(),
                    arrow.facing,
                ))
            }),
    );

    if !world.player.is_dead {
        let player = &world.player;
        let alpha = if player.flicker_dimmed() { 0.5 } else { 1.0 };
        shapes.push(
            Shape::new(player.body.bounds(), PLAYER.with_alpha(alpha), 4.0).with_texture(
                Texture::frame(
                    player.animator().clip(),
                    player.animator().current_frame(),
                    player.facing,
                ),
            ),
        );
    }

    let burst_frames = world.tuning().world.death_burst_frames.max(1) as f32;
    for burst in &world.effects {
        // Later frames of the burst fade out.
        let fade = 1.0 - burst.frame() as f32 / burst_frames;
        shapes.push(Shape::new(
            Aabb::new(burst.position, burst.size, burst.size),
            BURST.with_alpha(0.8 * fade.max(0.1)),
            5.0,
        ));
    }

    shapes
}

/// Sprite settings and texture for one shape. Textured shapes keep the shape's alpha so the
/// invincibility flicker still shows.
fn sprite_for(
    shape: &Shape,
    readiness: &AssetReadiness,
    images: &Assets<Image>,
) -> (Sprite, Handle<Image>) {
    let size = shape.rect.size();
    let textured = shape.texture.and_then(|texture| {
        let handle = readiness.texture(texture.image)?;
        let image = images.get(handle)?;
        let sheet = Vec2::new(image.width() as f32, image.height() as f32);
        Some((texture, handle.clone(), sheet))
    });

    match textured {
        Some((texture, handle, sheet)) => (
            Sprite {
                color: Color::WHITE.with_alpha(shape.color.alpha()),
                custom_size: Some(size),
                rect: Some(source_rect(texture.source, sheet)),
                flip_x: texture.flip_x,
                ..default()
            },
            handle,
        ),
        None => (
            Sprite {
                color: shape.color,
                custom_size: Some(size),
                ..default()
            },
            Handle::default(),
        ),
    }
}

/// Rewrites the pooled sprite entities from this frame's shapes.
fn sync_shapes(
    mut commands: Commands,
    world: Res<GameWorld>,
    readiness: Res<AssetReadiness>,
    images: Res<Assets<Image>>,
    mut existing: Query<(Entity, &mut Transform, &mut Sprite, &mut Handle<Image>), With<WorldShape>>,
) {
    let shapes = collect_shapes(&world);
    let mut pending = shapes.iter();

    for (entity, mut transform, mut sprite, mut texture) in &mut existing {
        match pending.next() {
            Some(shape) => {
                let (next_sprite, next_texture) = sprite_for(shape, &readiness, &images);
                transform.translation = shape.translation();
                *sprite = next_sprite;
                if *texture != next_texture {
                    *texture = next_texture;
                }
            }
            None => commands.entity(entity).despawn(),
        }
    }

    for shape in pending {
        let (sprite, texture) = sprite_for(shape, &readiness, &images);
        commands.spawn((
            WorldShape,
            SpriteBundle {
                sprite,
                texture,
                transform: Transform::from_translation(shape.translation()),
                ..default()
            },
        ));
    }
}
