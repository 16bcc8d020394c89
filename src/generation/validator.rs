use crate::terrain::TerrainSampler;
use crate::terrain::constants::{CORRIDOR_FAR_OFFSET, CORRIDOR_NEAR_OFFSET, ROAD_SLOPE_LIMIT_DEGREES};
use crate::terrain::coordinates::GridPoint;
use crate::world::{ObjectTag, OccupancyOracle};
use bevy::math::Vec2;

/// Decides whether a road may run from one grid point to a candidate.
///
/// Checks run in order and stop at the first failure:
/// 1. the candidate keeps a one-cell margin from the grid edge,
/// 2. the candidate is gentler than the slope threshold,
/// 3. the corridor between the points is clear (see [`Self::corridor_is_clear`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementValidator {
    pub slope_threshold_degrees: f32,
}

impl Default for PlacementValidator {
    fn default() -> Self {
        Self::new(ROAD_SLOPE_LIMIT_DEGREES)
    }
}

impl PlacementValidator {
    pub fn new(slope_threshold_degrees: f32) -> Self {
        Self {
            slope_threshold_degrees,
        }
    }

    pub fn is_valid_segment<T, O>(
        &self,
        terrain: &T,
        world: &O,
        previous: GridPoint,
        candidate: GridPoint,
    ) -> bool
    where
        T: TerrainSampler + ?Sized,
        O: OccupancyOracle + ?Sized,
    {
        self.in_bounds(terrain, candidate)
            && terrain.slope_degrees(candidate) < self.slope_threshold_degrees
            && self.corridor_is_clear(terrain, world, previous, candidate)
    }

    /// Both coordinates in `(0, R-2]`
    pub fn in_bounds<T: TerrainSampler + ?Sized>(&self, terrain: &T, candidate: GridPoint) -> bool {
        let max = terrain.resolution() as i32 - 2;
        candidate.x > 0 && candidate.x <= max && candidate.z > 0 && candidate.z <= max
    }

    /// Walks from one step past `previous` toward `candidate` in unit steps
    /// while `step < distance - 1`, so neither endpoint is probed.
    ///
    /// At every step each side is probed at perpendicular offsets 1 and 2.
    /// When both probes on a side hit something and exactly one of them is a
    /// road, the segment would graze that road and is rejected. Two road hits
    /// pass, as do two non-road hits. A road directly on the travel line is
    /// always rejected.
    pub fn corridor_is_clear<T, O>(
        &self,
        terrain: &T,
        world: &O,
        previous: GridPoint,
        candidate: GridPoint,
    ) -> bool
    where
        T: TerrainSampler + ?Sized,
        O: OccupancyOracle + ?Sized,
    {
        let geometry = terrain.geometry();
        let probe = |grid: Vec2| world.material_at(geometry.to_world(grid));

        let start = previous.as_vec2();
        let end = candidate.as_vec2();
        let direction = (end - start).normalize_or_zero();
        let perpendicular = direction.perp();
        let distance = start.distance(end);

        let mut cursor = start + direction;
        let mut step = 0.0_f32;
        while step < distance - 1.0 {
            for side in [perpendicular, -perpendicular] {
                let near = probe(cursor + side * CORRIDOR_NEAR_OFFSET);
                let far = probe(cursor + side * CORRIDOR_FAR_OFFSET);
                if let (Some(near), Some(far)) = (near, far) {
                    if (near == ObjectTag::Road) != (far == ObjectTag::Road) {
                        return false;
                    }
                }
            }

            if probe(cursor) == Some(ObjectTag::Road) {
                return false;
            }

            cursor += direction;
            step += 1.0;
        }

        true
    }
}
