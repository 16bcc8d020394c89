pub mod preview;

use crate::terrain::constants::{DEFAULT_HOUSE_HALF_EXTENT, DEFAULT_TREE_HALF_EXTENT, HOUSE_SETBACK};
use crate::terrain::coordinates::{GridGeometry, GridPoint};
use bevy::math::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectTag {
    #[default]
    Empty,
    Road,
    House,
    Tree,
}

/// A placement request handed to the sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Placement {
    Road { from: Vec3, to: Vec3 },
    House { position: Vec3, orientation: Quat },
    Tree { position: Vec3 },
}

/// Answers "what is already placed here" in world space
pub trait OccupancyOracle {
    /// Tag of whatever a downward probe at this world XZ position hits,
    /// `None` when the probe misses the world entirely
    fn material_at(&self, world_xz: Vec2) -> Option<ObjectTag>;

    /// Whether any placed object overlaps the box at `center`
    fn overlaps(&self, center: Vec3, half_extents: Vec3) -> bool;
}

/// Receives accepted placements; assumed never to fail
pub trait PlacementSink {
    fn place_road(&mut self, from: Vec3, to: Vec3);
    fn place_house(&mut self, position: Vec3, orientation: Quat);
    fn place_tree(&mut self, position: Vec3);
}

/// A world that can both be queried and receive placements, so every
/// check sees the placements made before it
pub trait PlacementWorld: OccupancyOracle + PlacementSink {}

impl<W: OccupancyOracle + PlacementSink> PlacementWorld for W {}

/// Occupancy index over the terrain grid that doubles as a placement sink.
///
/// Roads are rasterized one cell wide and always claim their cells. Houses
/// and trees only claim empty cells. Houses sit [`HOUSE_SETBACK`] behind the
/// direction they face.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    geometry: GridGeometry,
    cells: Vec<ObjectTag>,
    placements: Vec<Placement>,
    pub tree_half_extents: Vec3,
    pub house_half_extents: Vec3,
    pub house_setback: f32,
}

impl OccupancyGrid {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            cells: vec![ObjectTag::Empty; geometry.cell_count()],
            placements: Vec::new(),
            tree_half_extents: Vec3::splat(DEFAULT_TREE_HALF_EXTENT),
            house_half_extents: Vec3::splat(DEFAULT_HOUSE_HALF_EXTENT),
            house_setback: HOUSE_SETBACK,
        }
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn tag(&self, point: GridPoint) -> Option<ObjectTag> {
        self.geometry.index(point).map(|i| self.cells[i])
    }

    pub fn set_tag(&mut self, point: GridPoint, tag: ObjectTag) {
        if let Some(index) = self.geometry.index(point) {
            self.cells[index] = tag;
        }
    }

    /// Every placement received, in order
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn count(&self, tag: ObjectTag) -> usize {
        self.cells.iter().filter(|&&t| t == tag).count()
    }

    /// Cells whose centres fall inside the XZ footprint of a box, or the
    /// nearest cell when the box is too small to contain any centre
    fn footprint(&self, center: Vec3, half_extents: Vec3) -> Vec<GridPoint> {
        let lo = self
            .geometry
            .to_grid(Vec2::new(center.x - half_extents.x, center.z - half_extents.z));
        let hi = self
            .geometry
            .to_grid(Vec2::new(center.x + half_extents.x, center.z + half_extents.z));

        let (x0, x1) = (lo.x.ceil() as i32, hi.x.floor() as i32);
        let (z0, z1) = (lo.y.ceil() as i32, hi.y.floor() as i32);
        if x0 > x1 || z0 > z1 {
            return self
                .geometry
                .nearest_point(Vec2::new(center.x, center.z))
                .into_iter()
                .collect();
        }

        let mut cells = Vec::new();
        for z in z0..=z1 {
            for x in x0..=x1 {
                let point = GridPoint::new(x, z);
                if self.geometry.contains(point) {
                    cells.push(point);
                }
            }
        }
        cells
    }

    fn claim_empty(&mut self, center: Vec3, half_extents: Vec3, tag: ObjectTag) {
        for point in self.footprint(center, half_extents) {
            if self.tag(point) == Some(ObjectTag::Empty) {
                self.set_tag(point, tag);
            }
        }
    }
}

impl OccupancyOracle for OccupancyGrid {
    fn material_at(&self, world_xz: Vec2) -> Option<ObjectTag> {
        self.geometry
            .nearest_point(world_xz)
            .and_then(|point| self.tag(point))
    }

    fn overlaps(&self, center: Vec3, half_extents: Vec3) -> bool {
        self.footprint(center, half_extents)
            .into_iter()
            .any(|point| self.tag(point).is_some_and(|tag| tag != ObjectTag::Empty))
    }
}

impl PlacementSink for OccupancyGrid {
    fn place_road(&mut self, from: Vec3, to: Vec3) {
        let start = self.geometry.to_grid(Vec2::new(from.x, from.z));
        let end = self.geometry.to_grid(Vec2::new(to.x, to.z));

        // half-cell stepping so no cell along the line is skipped
        let samples = (start.distance(end) * 2.0).ceil().max(1.0) as usize;
        for i in 0..=samples {
            let p = start.lerp(end, i as f32 / samples as f32).round();
            self.set_tag(GridPoint::new(p.x as i32, p.y as i32), ObjectTag::Road);
        }

        self.placements.push(Placement::Road { from, to });
    }

    fn place_house(&mut self, position: Vec3, orientation: Quat) {
        let facing = orientation * Vec3::Z;
        let footprint_center = position - facing * self.house_setback;
        self.claim_empty(footprint_center, self.house_half_extents, ObjectTag::House);

        self.placements.push(Placement::House {
            position,
            orientation,
        });
    }

    fn place_tree(&mut self, position: Vec3) {
        self.claim_empty(position, self.tree_half_extents, ObjectTag::Tree);
        self.placements.push(Placement::Tree { position });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> OccupancyGrid {
        OccupancyGrid::new(GridGeometry::unit(20))
    }

    #[test]
    fn test_road_rasterizes_every_cell() {
        let mut world = grid();
        world.place_road(Vec3::new(2.0, 0.0, 5.0), Vec3::new(12.0, 3.0, 5.0));

        for x in 2..=12 {
            assert_eq!(world.tag(GridPoint::new(x, 5)), Some(ObjectTag::Road));
        }
        assert_eq!(world.tag(GridPoint::new(13, 5)), Some(ObjectTag::Empty));
        assert_eq!(world.tag(GridPoint::new(7, 6)), Some(ObjectTag::Empty));
        assert_eq!(world.count(ObjectTag::Road), 11);
        assert_eq!(world.placements().len(), 1);
    }

    #[test]
    fn test_material_probe_misses_off_grid() {
        let mut world = grid();
        world.set_tag(GridPoint::new(3, 3), ObjectTag::Road);

        assert_eq!(
            world.material_at(Vec2::new(3.2, 2.9)),
            Some(ObjectTag::Road)
        );
        assert_eq!(
            world.material_at(Vec2::new(4.0, 3.0)),
            Some(ObjectTag::Empty)
        );
        assert_eq!(world.material_at(Vec2::new(-1.0, 3.0)), None);
        assert_eq!(world.material_at(Vec2::new(3.0, 20.0)), None);
    }

    #[test]
    fn test_tree_footprint_blocks_overlap() {
        let mut world = grid();
        world.place_tree(Vec3::new(5.0, 1.0, 5.0));

        let half = Vec3::splat(0.5);
        assert!(world.overlaps(Vec3::new(5.0, 1.0, 5.0), half));
        assert!(!world.overlaps(Vec3::new(7.0, 1.0, 5.0), half));
        assert!(world.overlaps(Vec3::new(6.0, 1.0, 5.0), Vec3::splat(1.0)));
    }

    #[test]
    fn test_house_sits_behind_its_facing() {
        let mut world = grid();
        // facing +x
        let orientation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        world.place_house(Vec3::new(10.0, 0.0, 10.0), orientation);

        assert_eq!(world.tag(GridPoint::new(9, 10)), Some(ObjectTag::House));
        assert_eq!(world.tag(GridPoint::new(10, 10)), Some(ObjectTag::Empty));
    }

    #[test]
    fn test_houses_and_trees_never_cover_roads() {
        let mut world = grid();
        world.place_road(Vec3::new(0.0, 0.0, 4.0), Vec3::new(10.0, 0.0, 4.0));
        world.place_tree(Vec3::new(4.0, 0.0, 4.0));
        world.place_house(Vec3::new(6.0, 0.0, 3.0), Quat::IDENTITY);

        assert_eq!(world.tag(GridPoint::new(4, 4)), Some(ObjectTag::Road));
        assert_eq!(world.tag(GridPoint::new(6, 2)), Some(ObjectTag::House));
        assert_eq!(world.placements().len(), 3);
    }
}
