use settler::terrain_generation::{
    IslandGenerator, PRESET_NAMES, TerrainAlgorithm, get_terrain_preset,
};
use settler::{SettlementError, SettlementResult};

/// Picks an island preset and applies relief overrides from the command line
pub struct TerrainBuilder {
    terrain_type: String,
    seed: Option<u32>,
    amplitude: Option<f32>,
    frequency: Option<f32>,
    octaves: Option<u32>,
}

impl TerrainBuilder {
    pub fn new(terrain_type: String) -> Self {
        Self {
            terrain_type,
            seed: None,
            amplitude: None,
            frequency: None,
            octaves: None,
        }
    }

    pub fn seed(mut self, seed: Option<u32>) -> Self {
        self.seed = seed;
        self
    }

    pub fn amplitude(mut self, amplitude: Option<f32>) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn frequency(mut self, frequency: Option<f32>) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn octaves(mut self, octaves: Option<u32>) -> Self {
        self.octaves = octaves;
        self
    }

    fn has_manual_parameters(&self) -> bool {
        self.amplitude.is_some() || self.frequency.is_some() || self.octaves.is_some()
    }

    pub fn build(self) -> SettlementResult<IslandGenerator> {
        let Some(mut generator) = get_terrain_preset(&self.terrain_type, self.seed) else {
            return Err(SettlementError::InvalidConfig {
                reason: format!(
                    "Unknown terrain type: '{}'. Available presets: {}",
                    self.terrain_type,
                    PRESET_NAMES.join(", ")
                ),
            });
        };

        if self.has_manual_parameters() {
            generator.algorithm = self.override_preset_params(generator.algorithm);
        }
        Ok(generator)
    }

    fn override_preset_params(&self, algorithm: TerrainAlgorithm) -> TerrainAlgorithm {
        match algorithm {
            TerrainAlgorithm::Flat => {
                println!(
                    "Warning: Manual relief parameters (amplitude, frequency, octaves) are ignored for '{}'",
                    self.terrain_type
                );
                TerrainAlgorithm::Flat
            }
            TerrainAlgorithm::Perlin {
                amplitude,
                frequency,
                octaves,
            } => TerrainAlgorithm::Perlin {
                amplitude: self.amplitude.unwrap_or(amplitude),
                frequency: self.frequency.unwrap_or(frequency),
                octaves: self.octaves.unwrap_or(octaves),
            },
            TerrainAlgorithm::Ridged {
                amplitude,
                frequency,
                octaves,
            } => TerrainAlgorithm::Ridged {
                amplitude: self.amplitude.unwrap_or(amplitude),
                frequency: self.frequency.unwrap_or(frequency),
                octaves: self.octaves.unwrap_or(octaves),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_builder_default() {
        let generator = TerrainBuilder::new("island".to_string())
            .seed(Some(12345))
            .build()
            .unwrap();
        assert_eq!(generator.seed, 12345);
    }

    #[test]
    fn test_terrain_builder_overrides_only_what_was_given() {
        let generator = TerrainBuilder::new("highlands".to_string())
            .seed(Some(12345))
            .amplitude(Some(0.5))
            .octaves(Some(2))
            .build()
            .unwrap();

        match generator.algorithm {
            TerrainAlgorithm::Ridged {
                amplitude,
                frequency,
                octaves,
            } => {
                assert_eq!(amplitude, 0.5);
                assert_eq!(frequency, 0.015);
                assert_eq!(octaves, 2);
            }
            other => panic!("Expected Ridged algorithm, got {other:?}"),
        }
    }

    #[test]
    fn test_flat_island_ignores_relief_overrides() {
        let generator = TerrainBuilder::new("flat-island".to_string())
            .frequency(Some(0.3))
            .build()
            .unwrap();
        assert_eq!(generator.algorithm, TerrainAlgorithm::Flat);
    }

    #[test]
    fn test_terrain_builder_unknown_type() {
        let err = TerrainBuilder::new("hills".to_string()).build().unwrap_err();
        assert!(err.to_string().contains("flat-island, island, highlands"));
    }
}
