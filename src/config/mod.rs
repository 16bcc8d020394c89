use crate::errors::{SettlementError, SettlementResult, describe_validation};
use crate::terrain::constants::{
    DEFAULT_TREE_HALF_EXTENT, FOREST_SLOPE_LIMIT_DEGREES, ROAD_SLOPE_LIMIT_DEGREES,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Everything one generation pass needs besides the terrain and the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GenerationConfig {
    /// Fixed seed for reproducible passes; a random one is drawn when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[validate(nested)]
    pub city: CityConfig,
    #[validate(nested)]
    pub forest: ForestConfig,
}

/// Road and house agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CityConfig {
    /// Number of independent road agents
    pub agents: u32,
    /// Maximum road segments per agent
    pub tokens: u32,
    /// Segment length in grid cells
    #[validate(range(min = 5, max = 20))]
    pub road_length: u32,
    /// Spacing between houses along a segment, in world units
    pub gap: u32,
    #[serde(default = "default_houses_per_segment")]
    #[validate(range(min = 1))]
    pub houses_per_segment: u32,
    #[serde(default = "default_road_slope")]
    #[validate(range(min = 0.0, max = 90.0))]
    pub slope_threshold_degrees: f32,
}

/// Tree walkers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ForestConfig {
    /// Number of walkers, each with its own anchor
    pub agents: u32,
    /// Walks per walker, each restarting at the anchor
    pub tokens: u32,
    /// Maximum trees per walk
    pub return_value: u32,
    /// Exclusive upper bound of the per-step jump
    #[validate(range(min = 2, max = 8))]
    pub distance: u32,
    #[serde(default = "default_forest_slope")]
    #[validate(range(min = 0.0, max = 90.0))]
    pub slope_threshold_degrees: f32,
    /// Half extents of the volume a tree must keep clear of other objects
    #[serde(default = "default_tree_half_extents")]
    pub tree_half_extents: [f32; 3],
}

fn default_houses_per_segment() -> u32 {
    1
}

fn default_road_slope() -> f32 {
    ROAD_SLOPE_LIMIT_DEGREES
}

fn default_forest_slope() -> f32 {
    FOREST_SLOPE_LIMIT_DEGREES
}

fn default_tree_half_extents() -> [f32; 3] {
    [DEFAULT_TREE_HALF_EXTENT; 3]
}

impl CityConfig {
    pub fn new(agents: u32, tokens: u32, road_length: u32, gap: u32) -> Self {
        Self {
            agents,
            tokens,
            road_length,
            gap,
            houses_per_segment: default_houses_per_segment(),
            slope_threshold_degrees: default_road_slope(),
        }
    }

    pub fn with_houses(mut self, houses_per_segment: u32) -> Self {
        self.houses_per_segment = houses_per_segment;
        self
    }

    /// Most houses that fit along one segment at the configured gap.
    ///
    /// Advisory only; the road builder places `houses_per_segment` regardless.
    pub fn max_houses_per_segment(&self) -> u32 {
        if self.gap == 0 {
            return 0;
        }
        let fitting = self.road_length / self.gap;
        if self.gap == 1 {
            fitting.saturating_sub(2)
        } else {
            fitting.saturating_sub(1)
        }
    }
}

impl ForestConfig {
    pub fn new(agents: u32, tokens: u32, return_value: u32, distance: u32) -> Self {
        Self {
            agents,
            tokens,
            return_value,
            distance,
            slope_threshold_degrees: default_forest_slope(),
            tree_half_extents: default_tree_half_extents(),
        }
    }
}

impl GenerationConfig {
    pub fn new(city: CityConfig, forest: ForestConfig) -> Self {
        Self {
            seed: None,
            city,
            forest,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Range checks for hosts that load configuration from files.
    /// Generation itself accepts any values and degrades instead.
    pub fn check(&self) -> SettlementResult<()> {
        self.validate().map_err(|e| SettlementError::InvalidConfig {
            reason: describe_validation(&e),
        })
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push("settler");
        path.push("generation.toml");
        path
    })
}

pub fn load_config(path: &Path) -> SettlementResult<GenerationConfig> {
    if !path.exists() {
        return Err(SettlementError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path)?;
    let config = toml::from_str::<GenerationConfig>(&contents)?;
    config.check()?;
    Ok(config)
}

pub fn save_config(config: &GenerationConfig, path: &Path) -> SettlementResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
