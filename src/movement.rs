//! Shared kinematic body: position/velocity integration and axis-separated platform resolution.
//!
//! Every simulated entity embeds a `KinematicBody`. Horizontal motion is resolved before
//! vertical motion, and solids are tested before one-sided platforms.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::{collision, platform_collision, Aabb, Platform};

/// Gap left between a resolved body and the surface it was pushed out of. Keeps a grounded
/// body from touching the floor tile during the next horizontal pass.
pub const SKIN: f32 = 0.01;

/// Returns false for frames that must not integrate (zero, negative, NaN or infinite delta).
pub fn is_valid_dt(dt: f32) -> bool {
    dt.is_finite() && dt > 0.0
}

/// Horizontal facing; drives sprite mirroring and where attacks/projectiles spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn toward(from_x: f32, to_x: f32) -> Self {
        if to_x - from_x > 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    }
}

/// Gravity parameters applied during integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyPhysics {
    pub gravity: f32,
    pub terminal_velocity: f32,
}

impl Default for BodyPhysics {
    fn default() -> Self {
        Self {
            gravity: 1800.0,
            terminal_velocity: 900.0,
        }
    }
}

/// Read-only view of the platform pools handed to every body update.
#[derive(Debug, Clone, Copy)]
pub struct LevelGeometry<'a> {
    pub platforms: &'a [Platform],
    pub solid_platforms: &'a [Platform],
    /// World floor that catches anything no platform caught. `None` leaves pits open.
    pub floor_y: Option<f32>,
}

impl<'a> LevelGeometry<'a> {
    pub fn new(platforms: &'a [Platform], solid_platforms: &'a [Platform]) -> Self {
        Self {
            platforms,
            solid_platforms,
            floor_y: None,
        }
    }

    pub fn with_floor(mut self, floor_y: Option<f32>) -> Self {
        self.floor_y = floor_y;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerticalContact {
    pub landed: bool,
    pub bumped_head: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub hitbox_inset: Vec2,
    pub hitbox_size: Vec2,
    pub on_ground: bool,
}

impl KinematicBody {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            hitbox_inset: Vec2::ZERO,
            hitbox_size: size,
            on_ground: false,
        }
    }

    pub fn with_hitbox(mut self, inset: Vec2, size: Vec2) -> Self {
        self.hitbox_inset = inset;
        self.hitbox_size = size;
        self
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_offset(self.position, self.hitbox_inset, self.hitbox_size)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Integrates one frame: x, horizontal resolution, gravity, y, vertical resolution.
    pub fn integrate(
        &mut self,
        dt: f32,
        physics: BodyPhysics,
        geometry: &LevelGeometry,
    ) -> VerticalContact {
        if !is_valid_dt(dt) {
            return VerticalContact {
                landed: self.on_ground,
                bumped_head: false,
            };
        }

        self.position.x += self.velocity.x * dt;
        self.resolve_horizontal(geometry.solid_platforms);

        self.velocity.y = (self.velocity.y + physics.gravity * dt).min(physics.terminal_velocity);
        self.position.y += self.velocity.y * dt;
        let contact = self.resolve_vertical(geometry);
        self.on_ground = contact.landed;
        contact
    }

    fn resolve_horizontal(&mut self, solids: &[Platform]) {
        let hitbox = self.hitbox();

        for platform in solids {
            if !collision(&hitbox, &platform.aabb()) {
                continue;
            }

            if self.velocity.x > 0.0 {
                self.position.x =
                    platform.position.x - self.hitbox_size.x - self.hitbox_inset.x - SKIN;
                self.velocity.x = 0.0;
                return;
            }
            if self.velocity.x < 0.0 {
                self.position.x = platform.right() - self.hitbox_inset.x + SKIN;
                self.velocity.x = 0.0;
                return;
            }
        }
    }

    fn resolve_vertical(&mut self, geometry: &LevelGeometry) -> VerticalContact {
        let mut contact = VerticalContact::default();
        let hitbox = self.hitbox();

        for platform in geometry.solid_platforms {
            if !collision(&hitbox, &platform.aabb()) {
                continue;
            }

            if self.velocity.y > 0.0 {
                self.land_on(platform.position.y);
                contact.landed = true;
                return contact;
            }
            if self.velocity.y < 0.0 {
                self.position.y = platform.position.y + platform.height - self.hitbox_inset.y + SKIN;
                self.velocity.y = 0.0;
                contact.bumped_head = true;
                break;
            }
        }

        if self.velocity.y > 0.0 {
            for platform in geometry.platforms {
                if platform_collision(&hitbox, &platform.aabb()) {
                    self.land_on(platform.position.y);
                    contact.landed = true;
                    return contact;
                }
            }
        }

        if let Some(floor_y) = geometry.floor_y {
            if self.hitbox().bottom() >= floor_y {
                self.position.y = floor_y - self.hitbox_size.y - self.hitbox_inset.y;
                self.velocity.y = 0.0;
                contact.landed = true;
            }
        }

        contact
    }

    fn land_on(&mut self, surface_y: f32) {
        self.position.y = surface_y - self.hitbox_size.y - self.hitbox_inset.y - SKIN;
        self.velocity.y = 0.0;
    }
}
