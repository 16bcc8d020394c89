pub mod analyzer;
pub mod constants;
pub mod coordinates;

use crate::errors::{SettlementError, SettlementResult, describe_validation};
use bevy::math::{Vec2, Vec3};
use constants::{OCEAN_FLOOR_HEIGHT, UNKNOWN_SLOPE_DEGREES};
use coordinates::{GridGeometry, GridPoint};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Read-only height and surface queries over a grid.
///
/// Heights are normalized (0 = sea floor, 1 = terrain ceiling); world-space
/// answers go through [`TerrainSampler::surface_point`].
pub trait TerrainSampler {
    fn geometry(&self) -> GridGeometry;

    /// Normalized height, `None` off the grid
    fn height(&self, point: GridPoint) -> Option<f32>;

    /// Unit surface normal, `None` off the grid
    fn normal(&self, point: GridPoint) -> Option<Vec3>;

    /// World position of the terrain surface at a grid point
    fn surface_point(&self, point: GridPoint) -> Vec3;

    fn resolution(&self) -> u32 {
        self.geometry().resolution
    }

    /// Angle between the surface normal and world up, in degrees
    fn slope_degrees(&self, point: GridPoint) -> f32 {
        match self.normal(point) {
            Some(normal) if normal != Vec3::ZERO => normal.angle_between(Vec3::Y).to_degrees(),
            _ => UNKNOWN_SLOPE_DEGREES,
        }
    }
}

/// How a normalized height grid maps into world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct HeightFieldSettings {
    #[validate(range(min = 0.01, max = 100.0))]
    pub cell_size: f32,
    /// World units per normalized height unit
    #[validate(range(min = 0.01, max = 10000.0))]
    pub height_scale: f32,
    pub origin: Vec3,
}

impl Default for HeightFieldSettings {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            height_scale: 30.0,
            origin: Vec3::ZERO,
        }
    }
}

/// A frozen snapshot of terrain elevation with precomputed normals
#[derive(Debug, Clone)]
pub struct HeightField {
    geometry: GridGeometry,
    height_scale: f32,
    heights: Vec<f32>, // row-major, index = z * resolution + x
    normals: Vec<Vec3>,
}

impl HeightField {
    pub fn new(
        resolution: u32,
        heights: Vec<f32>,
        settings: HeightFieldSettings,
    ) -> SettlementResult<Self> {
        if resolution < 2 {
            return Err(SettlementError::InvalidHeightField {
                reason: format!("resolution must be at least 2, got {resolution}"),
            });
        }

        let expected = (resolution as usize) * (resolution as usize);
        if heights.len() != expected {
            return Err(SettlementError::InvalidHeightField {
                reason: format!(
                    "{} samples do not match a {resolution}x{resolution} grid (expected {expected})",
                    heights.len()
                ),
            });
        }

        if let Some(index) = heights.iter().position(|h| !h.is_finite()) {
            return Err(SettlementError::InvalidHeightField {
                reason: format!("sample {index} is not a finite number"),
            });
        }

        settings
            .validate()
            .map_err(|e| SettlementError::InvalidHeightField {
                reason: describe_validation(&e),
            })?;

        let geometry = GridGeometry::new(resolution, settings.cell_size, settings.origin);
        let normals = compute_normals(&geometry, settings.height_scale, &heights);

        Ok(Self {
            geometry,
            height_scale: settings.height_scale,
            heights,
            normals,
        })
    }

    /// Build from a closure over grid points
    pub fn from_fn(
        resolution: u32,
        settings: HeightFieldSettings,
        mut sample: impl FnMut(GridPoint) -> f32,
    ) -> SettlementResult<Self> {
        let mut heights = Vec::with_capacity((resolution as usize) * (resolution as usize));
        for z in 0..resolution as i32 {
            for x in 0..resolution as i32 {
                heights.push(sample(GridPoint::new(x, z)));
            }
        }
        Self::new(resolution, heights, settings)
    }

    /// Create flat terrain for testing
    pub fn create_flat(resolution: u32, height: f32) -> SettlementResult<Self> {
        Self::from_fn(resolution, HeightFieldSettings::default(), |_| height)
    }

    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Mean of every sample above the ocean floor, `None` when nothing is land
    pub fn land_average(&self) -> Option<f32> {
        let (sum, count) = self
            .heights
            .iter()
            .filter(|&&h| h > OCEAN_FLOOR_HEIGHT)
            .fold((0.0_f64, 0_usize), |(sum, count), &h| (sum + h as f64, count + 1));
        (count > 0).then(|| (sum / count as f64) as f32)
    }
}

impl TerrainSampler for HeightField {
    fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    fn height(&self, point: GridPoint) -> Option<f32> {
        self.geometry.index(point).map(|i| self.heights[i])
    }

    fn normal(&self, point: GridPoint) -> Option<Vec3> {
        self.geometry.index(point).map(|i| self.normals[i])
    }

    fn surface_point(&self, point: GridPoint) -> Vec3 {
        let xz = self.geometry.to_world(point.as_vec2());
        let height = self.height(point).unwrap_or(0.0);
        Vec3::new(xz.x, self.geometry.origin.y + height * self.height_scale, xz.y)
    }
}

/// Central-difference normals over world-space heights, one-sided at the edges
fn compute_normals(geometry: &GridGeometry, height_scale: f32, heights: &[f32]) -> Vec<Vec3> {
    let r = geometry.resolution as usize;
    let world_height = |x: usize, z: usize| heights[z * r + x] * height_scale;

    let mut normals = Vec::with_capacity(heights.len());
    for z in 0..r {
        for x in 0..r {
            let (x0, x1) = (x.saturating_sub(1), (x + 1).min(r - 1));
            let (z0, z1) = (z.saturating_sub(1), (z + 1).min(r - 1));

            let run_x = (x1 - x0) as f32 * geometry.cell_size;
            let run_z = (z1 - z0) as f32 * geometry.cell_size;
            let gradient = Vec2::new(
                (world_height(x1, z) - world_height(x0, z)) / run_x,
                (world_height(x, z1) - world_height(x, z0)) / run_z,
            );

            normals.push(Vec3::new(-gradient.x, 1.0, -gradient.y).normalize());
        }
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_field_creation() {
        let field =
            HeightField::new(2, vec![0.0, 0.25, 0.5, 0.75], HeightFieldSettings::default())
                .unwrap();
        assert_eq!(field.resolution(), 2);
        assert_eq!(field.height(GridPoint::new(1, 0)), Some(0.25));
        assert_eq!(field.height(GridPoint::new(0, 1)), Some(0.5));
        assert_eq!(field.height(GridPoint::new(2, 0)), None);
    }

    #[test]
    fn test_height_field_invalid_size() {
        let result = HeightField::new(2, vec![0.0, 1.0, 2.0], HeightFieldSettings::default());
        assert!(result.is_err());

        let result = HeightField::new(1, vec![0.0], HeightFieldSettings::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_height_field_rejects_nan_and_bad_settings() {
        let result = HeightField::new(
            2,
            vec![0.0, f32::NAN, 0.0, 0.0],
            HeightFieldSettings::default(),
        );
        assert!(result.is_err());

        let settings = HeightFieldSettings {
            cell_size: 0.0,
            ..Default::default()
        };
        assert!(HeightField::new(2, vec![0.0; 4], settings).is_err());
    }

    #[test]
    fn test_flat_terrain_has_zero_slope() {
        let field = HeightField::create_flat(8, 0.4).unwrap();
        for z in 0..8 {
            for x in 0..8 {
                let slope = field.slope_degrees(GridPoint::new(x, z));
                assert!(slope < 1e-3, "flat terrain sloped {slope} at ({x}, {z})");
            }
        }
    }

    #[test]
    fn test_ramp_slope_matches_gradient() {
        // rises one world unit per cell along x: a 45 degree ramp
        let settings = HeightFieldSettings {
            cell_size: 1.0,
            height_scale: 10.0,
            origin: Vec3::ZERO,
        };
        let field = HeightField::from_fn(10, settings, |p| p.x as f32 * 0.1).unwrap();

        let slope = field.slope_degrees(GridPoint::new(5, 5));
        assert!((slope - 45.0).abs() < 1e-2, "got {slope}");

        let normal = field.normal(GridPoint::new(5, 5)).unwrap();
        assert!(normal.x < 0.0, "normal should lean away from the rise");
    }

    #[test]
    fn test_unknown_points_report_unknown_slope() {
        let field = HeightField::create_flat(4, 0.5).unwrap();
        assert_eq!(
            field.slope_degrees(GridPoint::new(-1, 0)),
            UNKNOWN_SLOPE_DEGREES
        );
    }

    #[test]
    fn test_surface_point_applies_scale_and_origin() {
        let settings = HeightFieldSettings {
            cell_size: 2.0,
            height_scale: 10.0,
            origin: Vec3::new(100.0, -5.0, 50.0),
        };
        let field = HeightField::from_fn(4, settings, |_| 0.5).unwrap();
        assert_eq!(
            field.surface_point(GridPoint::new(1, 3)),
            Vec3::new(102.0, 0.0, 56.0)
        );
    }

    #[test]
    fn test_land_average_ignores_ocean() {
        let field = HeightField::new(
            2,
            vec![0.0, 0.01, 0.4, 0.6],
            HeightFieldSettings::default(),
        )
        .unwrap();
        let average = field.land_average().unwrap();
        assert!((average - 0.5).abs() < 1e-6);

        let ocean = HeightField::create_flat(4, 0.0).unwrap();
        assert_eq!(ocean.land_average(), None);
    }
}
