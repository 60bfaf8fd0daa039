/// Width and height of the square stage, in logical pixels.
pub const STAGE_SIZE: f32 = 1024.0;
/// Distance covered by one movement key press.
pub const MOVE_STEP: f32 = 8.0;
/// Center-to-center distance below which the actor can use the whiteboard.
pub const PROXIMITY_THRESHOLD: f32 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Axis-aligned box stored as center + size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub center: Vec2,
    pub size: Vec2,
}

impl Bounds {
    pub const fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Box whose top-left corner is `origin`.
    pub fn from_origin(origin: Vec2, size: Vec2) -> Self {
        Self {
            center: origin.offset(size.x / 2.0, size.y / 2.0),
            size,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center.offset(-self.size.x / 2.0, -self.size.y / 2.0)
    }

    pub fn max(&self) -> Vec2 {
        self.center.offset(self.size.x / 2.0, self.size.y / 2.0)
    }

    /// Overlap on both axes. Boxes that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}
