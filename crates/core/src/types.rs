//! Shared value types: world/tile coordinates, rectangles, depth and theme.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

pub const ENTRANCE_DEPTH: u8 = 0;
pub const FIRST_FLOOR: u8 = 1;
pub const MAX_DEPTH: u8 = 120;
pub const ELEVATOR_INTERVAL: u8 = 5;

const ROCK_THEME_LAST_DEPTH: u8 = 40;
const ICE_THEME_LAST_DEPTH: u8 = 80;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

/// Column/row index into a floor's tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub row: i32,
    pub col: i32,
}

impl TilePos {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { row, col }
    }
}

/// Axis-aligned rectangle in world space. Edges are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { min: Vec2::new(x, y), max: Vec2::new(x + width, y + height) }
    }

    pub fn from_center(center: Vec2, half_width: f32, half_height: f32) -> Self {
        Self {
            min: Vec2::new(center.x - half_width, center.y - half_height),
            max: Vec2::new(center.x + half_width, center.y + half_height),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Squared distance from `point` to the nearest point of the rectangle; zero inside.
    pub fn distance_squared_to(&self, point: Vec2) -> f32 {
        let nearest = Vec2::new(
            point.x.max(self.min.x).min(self.max.x),
            point.y.max(self.min.y).min(self.max.y),
        );
        point.distance_squared(nearest)
    }

    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        self.distance_squared_to(center) <= radius * radius
    }
}

/// Dungeon depth. `0` is the entrance, `1..=120` are generated floors.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Depth(u8);

impl Depth {
    pub const ENTRANCE: Self = Self(ENTRANCE_DEPTH);
    pub const BOTTOM: Self = Self(MAX_DEPTH);

    /// Any depth including the entrance, clamped into `0..=120`.
    pub fn clamped(raw: i32) -> Self {
        Self(raw.clamp(i32::from(ENTRANCE_DEPTH), i32::from(MAX_DEPTH)) as u8)
    }

    /// A generated floor, clamped into `1..=120`.
    pub fn floor(raw: i32) -> Self {
        Self(raw.clamp(i32::from(FIRST_FLOOR), i32::from(MAX_DEPTH)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_entrance(self) -> bool {
        self.0 == ENTRANCE_DEPTH
    }

    pub fn is_bottom(self) -> bool {
        self.0 >= MAX_DEPTH
    }

    /// Multiples of five past the entrance unlock an elevator stop.
    pub fn is_elevator_stop(self) -> bool {
        self.0 > ENTRANCE_DEPTH && self.0 % ELEVATOR_INTERVAL == 0
    }

    pub fn theme(self) -> Theme {
        Theme::for_depth(self)
    }
}

impl From<Depth> for i32 {
    fn from(depth: Depth) -> Self {
        i32::from(depth.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Theme {
    Rock,
    Ice,
    Lava,
}

impl Theme {
    pub fn for_depth(depth: Depth) -> Self {
        if depth.get() <= ROCK_THEME_LAST_DEPTH {
            Self::Rock
        } else if depth.get() <= ICE_THEME_LAST_DEPTH {
            Self::Ice
        } else {
            Self::Lava
        }
    }
}
