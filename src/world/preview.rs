use super::{ObjectTag, OccupancyGrid};
use crate::errors::SettlementResult;
use crate::terrain::TerrainSampler;
use crate::terrain::constants::OCEAN_FLOOR_HEIGHT;
use crate::terrain::coordinates::GridPoint;
use image::{ImageBuffer, Rgb, RgbImage};
use std::path::Path;

const SEA: Rgb<u8> = Rgb([30, 60, 120]);
const ROAD: Rgb<u8> = Rgb([200, 60, 40]);
const HOUSE: Rgb<u8> = Rgb([240, 200, 60]);
const TREE: Rgb<u8> = Rgb([30, 130, 50]);

/// Top-down picture of the terrain with every occupied cell coloured by tag.
/// One pixel per grid cell, `x` to the right and `z` downward.
pub fn render_preview<T: TerrainSampler + ?Sized>(terrain: &T, world: &OccupancyGrid) -> RgbImage {
    let r = terrain.resolution();
    ImageBuffer::from_fn(r, r, |x, z| {
        let point = GridPoint::new(x as i32, z as i32);
        match world.tag(point).unwrap_or_default() {
            ObjectTag::Road => ROAD,
            ObjectTag::House => HOUSE,
            ObjectTag::Tree => TREE,
            ObjectTag::Empty => match terrain.height(point) {
                Some(h) if h > OCEAN_FLOOR_HEIGHT => {
                    let g = (h * 255.0).clamp(0.0, 255.0) as u8;
                    Rgb([g, g, g])
                }
                _ => SEA,
            },
        }
    })
}

pub fn write_preview<T: TerrainSampler + ?Sized>(
    terrain: &T,
    world: &OccupancyGrid,
    path: &Path,
) -> SettlementResult<()> {
    render_preview(terrain, world).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedTerrain;
    use crate::world::PlacementSink;
    use bevy::math::Vec3;

    #[test]
    fn test_preview_colours_cells_by_tag() {
        let terrain = ScriptedTerrain::bordered_plateau(10, 1.0);
        let mut world = OccupancyGrid::new(terrain.geometry());
        world.place_road(Vec3::new(2.0, 1.0, 4.0), Vec3::new(6.0, 1.0, 4.0));
        world.place_tree(Vec3::new(7.0, 1.0, 7.0));

        let image = render_preview(&terrain, &world);
        assert_eq!(image.dimensions(), (10, 10));
        assert_eq!(*image.get_pixel(0, 0), SEA);
        assert_eq!(*image.get_pixel(3, 4), ROAD);
        assert_eq!(*image.get_pixel(7, 7), TREE);
        assert_eq!(*image.get_pixel(1, 1), Rgb([255, 255, 255]));
    }
}
