use super::TerrainSampler;
use super::constants::{
    BUILDABLE_HEIGHT_MARGIN, FOREST_SLOPE_LIMIT_DEGREES, OCEAN_FLOOR_HEIGHT,
    ROAD_SLOPE_LIMIT_DEGREES,
};
use super::coordinates::{GridGeometry, GridPoint};
use bevy::log::{info, warn};
use rand::Rng;

/// Grid points that passed the elevation and slope predicates of one pass.
///
/// Points keep scan order (column by column) so seeded picks are reproducible.
#[derive(Debug, Clone)]
pub struct BuildableSet {
    geometry: GridGeometry,
    points: Vec<GridPoint>,
    mask: Vec<bool>,
    average_height: Option<f32>,
}

impl BuildableSet {
    pub fn empty(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            points: Vec::new(),
            mask: vec![false; geometry.cell_count()],
            average_height: None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        self.geometry
            .index(point)
            .is_some_and(|index| self.mask[index])
    }

    /// Island average used for the elevation predicate, `None` when the
    /// height field had no land at all
    pub fn average_height(&self) -> Option<f32> {
        self.average_height
    }

    /// Uniformly random member
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GridPoint> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points[rng.gen_range(0..self.points.len())])
    }

    fn insert(&mut self, point: GridPoint) {
        if let Some(index) = self.geometry.index(point) {
            if !self.mask[index] {
                self.mask[index] = true;
                self.points.push(point);
            }
        }
    }
}

/// Scans a height field once to find buildable grid points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAnalyzer {
    pub slope_threshold_degrees: f32,
}

impl GridAnalyzer {
    pub fn new(slope_threshold_degrees: f32) -> Self {
        Self {
            slope_threshold_degrees,
        }
    }

    pub fn for_roads() -> Self {
        Self::new(ROAD_SLOPE_LIMIT_DEGREES)
    }

    pub fn for_forest() -> Self {
        Self::new(FOREST_SLOPE_LIMIT_DEGREES)
    }

    /// Mean height of every sample above the ocean floor.
    ///
    /// `None` when no sample clears the floor, in which case nothing on the
    /// grid can be buildable.
    pub fn average_height<T: TerrainSampler + ?Sized>(terrain: &T) -> Option<f32> {
        let r = terrain.resolution() as i32;
        let mut sum = 0.0_f64;
        let mut count = 0_usize;

        for x in 0..r {
            for z in 0..r {
                if let Some(h) = terrain.height(GridPoint::new(x, z)) {
                    if h > OCEAN_FLOOR_HEIGHT {
                        sum += h as f64;
                        count += 1;
                    }
                }
            }
        }

        (count > 0).then(|| (sum / count as f64) as f32)
    }

    pub fn compute_buildable_set<T: TerrainSampler + ?Sized>(&self, terrain: &T) -> BuildableSet {
        let geometry = terrain.geometry();
        let mut set = BuildableSet::empty(geometry);

        let Some(average) = Self::average_height(terrain) else {
            warn!("No terrain sample rises above the ocean floor; nothing is buildable");
            return set;
        };
        info!("Average height of the island: {average:.4}");
        set.average_height = Some(average);

        let r = geometry.resolution as i32;
        for x in 0..r {
            for z in 0..r {
                let point = GridPoint::new(x, z);
                if self.is_buildable(terrain, point, average) {
                    set.insert(point);
                }
            }
        }

        info!(
            "Found {} buildable points below {} degrees",
            set.len(),
            self.slope_threshold_degrees
        );
        set
    }

    fn is_buildable<T: TerrainSampler + ?Sized>(
        &self,
        terrain: &T,
        point: GridPoint,
        average: f32,
    ) -> bool {
        let Some(height) = terrain.height(point) else {
            return false;
        };
        height > average + BUILDABLE_HEIGHT_MARGIN
            && terrain.slope_degrees(point) < self.slope_threshold_degrees
    }
}
