//! Terrain doubles for scenario tests.

use crate::terrain::TerrainSampler;
use crate::terrain::coordinates::{GridGeometry, GridPoint};
use bevy::math::Vec3;

/// Terrain whose heights and slopes are set directly instead of derived
/// from each other. Slope defaults to zero everywhere.
#[derive(Debug, Clone)]
pub struct ScriptedTerrain {
    geometry: GridGeometry,
    heights: Vec<f32>,
    slopes: Vec<f32>,
}

impl ScriptedTerrain {
    pub fn from_fn(resolution: u32, mut height: impl FnMut(GridPoint) -> f32) -> Self {
        let geometry = GridGeometry::unit(resolution);
        let mut heights = Vec::with_capacity(geometry.cell_count());
        for z in 0..resolution as i32 {
            for x in 0..resolution as i32 {
                heights.push(height(GridPoint::new(x, z)));
            }
        }
        Self {
            geometry,
            heights,
            slopes: vec![0.0; geometry.cell_count()],
        }
    }

    /// Flat plateau at `height` with a one-cell sea border
    pub fn bordered_plateau(resolution: u32, height: f32) -> Self {
        let max = resolution as i32 - 2;
        Self::from_fn(resolution, |p| if p.within(1, max) { height } else { 0.0 })
    }

    pub fn set_height(&mut self, point: GridPoint, height: f32) {
        let index = self.geometry.index(point).expect("point on grid");
        self.heights[index] = height;
    }

    pub fn set_slope(&mut self, point: GridPoint, degrees: f32) {
        let index = self.geometry.index(point).expect("point on grid");
        self.slopes[index] = degrees;
    }

    /// Mark every point matching `steep` with a 45 degree slope
    pub fn steepen(&mut self, steep: impl Fn(GridPoint) -> bool) {
        let r = self.geometry.resolution as i32;
        for z in 0..r {
            for x in 0..r {
                let point = GridPoint::new(x, z);
                if steep(point) {
                    self.set_slope(point, 45.0);
                }
            }
        }
    }
}

impl TerrainSampler for ScriptedTerrain {
    fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    fn height(&self, point: GridPoint) -> Option<f32> {
        self.geometry.index(point).map(|i| self.heights[i])
    }

    fn normal(&self, point: GridPoint) -> Option<Vec3> {
        self.geometry.index(point).map(|i| {
            let radians = self.slopes[i].to_radians();
            Vec3::new(radians.sin(), radians.cos(), 0.0)
        })
    }

    fn surface_point(&self, point: GridPoint) -> Vec3 {
        Vec3::new(
            point.x as f32,
            self.height(point).unwrap_or(0.0),
            point.z as f32,
        )
    }

    fn slope_degrees(&self, point: GridPoint) -> f32 {
        self.geometry
            .index(point)
            .map_or(90.0, |i| self.slopes[i])
    }
}
