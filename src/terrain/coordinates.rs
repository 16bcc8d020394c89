use bevy::math::{Vec2, Vec3};
use derive_more::{Add, AddAssign, Display, From, Mul, Sub, SubAssign};
use serde::{Deserialize, Serialize};

/// Grid coordinates into a height field: `x` is the column, `z` the row.
///
/// Signed so that candidate offsets may step off the grid; every consumer
/// rejects out-of-range points instead of clamping them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Add,
    Sub,
    Mul,
    AddAssign,
    SubAssign,
    Display,
    From,
    Serialize,
    Deserialize,
)]
#[display("({x}, {z})")]
pub struct GridPoint {
    pub x: i32,
    pub z: i32,
}

impl GridPoint {
    pub const UP: Self = Self::new(0, 1);
    pub const DOWN: Self = Self::new(0, -1);
    pub const RIGHT: Self = Self::new(1, 0);
    pub const LEFT: Self = Self::new(-1, 0);

    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.z as f32)
    }

    /// Truncates each component toward zero, the way an integer cast does.
    pub fn truncate(v: Vec2) -> Self {
        Self::new(v.x as i32, v.y as i32)
    }

    /// Inclusive range check on both axes.
    pub fn within(self, min: i32, max: i32) -> bool {
        self.x >= min && self.x <= max && self.z >= min && self.z <= max
    }
}

/// Layout of a square grid in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub resolution: u32,
    /// World units per grid cell
    pub cell_size: f32,
    /// World position of grid point (0, 0) at normalized height 0
    pub origin: Vec3,
}

impl GridGeometry {
    pub fn new(resolution: u32, cell_size: f32, origin: Vec3) -> Self {
        Self {
            resolution,
            cell_size,
            origin,
        }
    }

    /// One world unit per cell, anchored at the world origin.
    pub fn unit(resolution: u32) -> Self {
        Self::new(resolution, 1.0, Vec3::ZERO)
    }

    pub fn cell_count(&self) -> usize {
        (self.resolution as usize) * (self.resolution as usize)
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        point.within(0, self.resolution as i32 - 1)
    }

    /// Row-major index of an in-range point
    pub fn index(&self, point: GridPoint) -> Option<usize> {
        if !self.contains(point) {
            return None;
        }
        Some(point.z as usize * self.resolution as usize + point.x as usize)
    }

    /// Convert a (possibly fractional) grid position to world XZ
    pub fn to_world(&self, grid: Vec2) -> Vec2 {
        Vec2::new(
            self.origin.x + grid.x * self.cell_size,
            self.origin.z + grid.y * self.cell_size,
        )
    }

    /// Convert world XZ to a fractional grid position
    pub fn to_grid(&self, world_xz: Vec2) -> Vec2 {
        Vec2::new(
            (world_xz.x - self.origin.x) / self.cell_size,
            (world_xz.y - self.origin.z) / self.cell_size,
        )
    }

    /// Nearest grid point to a world XZ position, if it lies on the grid
    pub fn nearest_point(&self, world_xz: Vec2) -> Option<GridPoint> {
        let grid = self.to_grid(world_xz).round();
        let point = GridPoint::new(grid.x as i32, grid.y as i32);
        self.contains(point).then_some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_point_arithmetic() {
        let p = GridPoint::new(10, 4);
        assert_eq!(p + GridPoint::RIGHT * 5, GridPoint::new(15, 4));
        assert_eq!(p - GridPoint::new(10, 4), GridPoint::default());
        assert_eq!(p.to_string(), "(10, 4)");
        assert_eq!(GridPoint::from((3, 7)), GridPoint::new(3, 7));
    }

    #[test]
    fn test_truncate_drops_diagonal_components() {
        let diagonal = Vec2::new(1.0, 1.0).normalize();
        assert_eq!(GridPoint::truncate(diagonal), GridPoint::default());
        assert_eq!(GridPoint::truncate(Vec2::new(0.0, -1.0)), GridPoint::DOWN);
    }

    #[test]
    fn test_world_round_trip_with_offset() {
        let geometry = GridGeometry::new(64, 2.0, Vec3::new(-10.0, 0.0, 5.0));
        let world = geometry.to_world(Vec2::new(3.0, 4.0));
        assert_eq!(world, Vec2::new(-4.0, 13.0));
        assert_eq!(geometry.to_grid(world), Vec2::new(3.0, 4.0));
        assert_eq!(geometry.nearest_point(world), Some(GridPoint::new(3, 4)));
        assert_eq!(geometry.nearest_point(Vec2::new(-100.0, 0.0)), None);
    }

    #[test]
    fn test_index_is_row_major() {
        let geometry = GridGeometry::unit(4);
        assert_eq!(geometry.index(GridPoint::new(1, 2)), Some(9));
        assert_eq!(geometry.index(GridPoint::new(4, 0)), None);
        assert_eq!(geometry.index(GridPoint::new(0, -1)), None);
    }
}
