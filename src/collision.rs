//! Axis-aligned collision primitives and the static platform pools they are tested against.
//!
//! Everything here is plain data plus two pure predicates. Entities own their hitboxes and
//! rebuild them every frame; the predicates only ever borrow them.

use bevy::math::Vec2;

/// Axis-aligned bounding box in screen space (`+y` points down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub fn new(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            position,
            width,
            height,
        }
    }

    /// Hitbox placed at `position + inset` with the given size.
    pub fn from_offset(position: Vec2, inset: Vec2, size: Vec2) -> Self {
        Self::new(position + inset, size.x, size.y)
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        self.position + Vec2::new(self.width, self.height) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    fn overlaps_horizontally(&self, other: &Aabb) -> bool {
        self.left() <= other.right() && self.right() >= other.left()
    }
}

/// True when the boxes overlap on both axes. Bounds are inclusive, so touching edges count.
pub fn collision(a: &Aabb, b: &Aabb) -> bool {
    a.bottom() >= b.top() && a.top() <= b.bottom() && a.overlaps_horizontally(b)
}

/// True when `a`'s bottom edge sits inside `b`'s vertical span and the boxes overlap
/// horizontally. Where `a`'s top is does not matter, so a fast faller that already sank into a
/// thin platform still registers as landing on it.
pub fn platform_collision(a: &Aabb, b: &Aabb) -> bool {
    a.bottom() >= b.top() && a.bottom() <= b.bottom() && a.overlaps_horizontally(b)
}

/// Source rectangle on the terrain sheet. Only the renderer reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cropbox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Cropbox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Static level geometry. The platform takes its size from the tile it was cut from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    pub cropbox: Cropbox,
}

impl Platform {
    pub fn new(position: Vec2, cropbox: Cropbox) -> Self {
        Self {
            position,
            width: cropbox.width,
            height: cropbox.height,
            cropbox,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position, self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.width
    }
}
