use crate::errors::{SettlementError, SettlementResult};
use crate::terrain::coordinates::GridPoint;
use crate::terrain::{HeightField, HeightFieldSettings};
use bevy::log::info;
use bevy::math::Vec2;
use noise::{MultiFractal, NoiseFn, Perlin, RidgedMulti};
use std::path::Path;

/// Relief added on top of the island dome
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainAlgorithm {
    Flat,
    Perlin {
        amplitude: f32,
        frequency: f32,
        octaves: u32,
    },
    Ridged {
        amplitude: f32,
        frequency: f32,
        octaves: u32,
    },
}

/// Generates normalized island height fields: a raised plateau that falls
/// off to the sea floor toward the grid edge, with noise relief on top
#[derive(Debug, Clone)]
pub struct IslandGenerator {
    pub seed: u32,
    pub algorithm: TerrainAlgorithm,
    /// Height of the island interior before relief
    pub plateau: f32,
    /// Fraction of the half-width where the coast starts to fall off
    pub shore_start: f32,
}

impl IslandGenerator {
    pub fn new(seed: u32, algorithm: TerrainAlgorithm) -> Self {
        Self {
            seed,
            algorithm,
            plateau: 0.5,
            shore_start: 0.55,
        }
    }

    pub fn generate(
        &self,
        resolution: u32,
        settings: HeightFieldSettings,
    ) -> SettlementResult<HeightField> {
        let relief = self.relief();
        let centre = Vec2::splat((resolution as f32 - 1.0) * 0.5);
        let half_width = centre.x.max(1.0);

        let field = HeightField::from_fn(resolution, settings, |p: GridPoint| {
            let d = (p.as_vec2() - centre).length() / half_width;
            let mask = 1.0 - smoothstep(self.shore_start, 0.95, d);
            ((self.plateau + relief(p)) * mask).clamp(0.0, 1.0)
        })?;

        info!(
            "Generated {resolution}x{resolution} island ({:?}), land average {:?}",
            self.algorithm,
            field.land_average()
        );
        Ok(field)
    }

    fn relief(&self) -> Box<dyn Fn(GridPoint) -> f32> {
        match self.algorithm {
            TerrainAlgorithm::Flat => Box::new(|_| 0.0),
            TerrainAlgorithm::Perlin {
                amplitude,
                frequency,
                octaves,
            } => {
                let perlin = Perlin::new(self.seed);
                Box::new(move |p| {
                    let mut value = 0.0;
                    let mut current_amplitude = amplitude as f64;
                    let mut current_frequency = frequency as f64;
                    for _ in 0..octaves {
                        value += perlin.get([
                            p.x as f64 * current_frequency,
                            p.z as f64 * current_frequency,
                        ]) * current_amplitude;
                        current_amplitude *= 0.5;
                        current_frequency *= 2.0;
                    }
                    value as f32
                })
            }
            TerrainAlgorithm::Ridged {
                amplitude,
                frequency,
                octaves,
            } => {
                let ridged = RidgedMulti::<Perlin>::new(self.seed)
                    .set_octaves(octaves as usize)
                    .set_frequency(frequency as f64);
                Box::new(move |p| (ridged.get([p.x as f64, p.z as f64]) * amplitude as f64) as f32)
            }
        }
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub const PRESET_NAMES: [&str; 3] = ["flat-island", "island", "highlands"];

/// Get a predefined island preset
pub fn get_terrain_preset(name: &str, seed: Option<u32>) -> Option<IslandGenerator> {
    let seed = seed.unwrap_or_else(rand::random);

    match name {
        "flat-island" => Some(IslandGenerator::new(seed, TerrainAlgorithm::Flat)),
        "island" => Some(IslandGenerator::new(
            seed,
            TerrainAlgorithm::Perlin {
                amplitude: 0.25,
                frequency: 0.02,
                octaves: 4,
            },
        )),
        "highlands" => Some(IslandGenerator {
            plateau: 0.4,
            ..IslandGenerator::new(
                seed,
                TerrainAlgorithm::Ridged {
                    amplitude: 0.3,
                    frequency: 0.015,
                    octaves: 5,
                },
            )
        }),
        _ => None,
    }
}

/// Load a square grayscale heightmap; black is the sea floor, white the
/// terrain ceiling. Colour images are converted to luminance first.
pub fn load_heightmap(path: &Path, settings: HeightFieldSettings) -> SettlementResult<HeightField> {
    let image = image::open(path)?.into_luma16();
    let (width, height) = image.dimensions();
    if width != height {
        return Err(SettlementError::InvalidHeightField {
            reason: format!("heightmap {} is {width}x{height}, expected a square", path.display()),
        });
    }

    let heights = image
        .pixels()
        .map(|pixel| pixel.0[0] as f32 / u16::MAX as f32)
        .collect();
    info!("Loaded {width}x{height} heightmap from {}", path.display());
    HeightField::new(width, heights, settings)
}
