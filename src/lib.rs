pub mod config;
pub mod errors;
pub mod generation;
pub mod terrain;
pub mod terrain_generation;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

// Selective re-exports for hosts

pub use config::{CityConfig, ForestConfig, GenerationConfig};
pub use errors::{SettlementError, SettlementResult};
pub use generation::{GenerationPass, GenerationReport, PassEvent};
pub use terrain::coordinates::{GridGeometry, GridPoint};
pub use terrain::{HeightField, HeightFieldSettings, TerrainSampler};
pub use world::{ObjectTag, OccupancyGrid, OccupancyOracle, Placement, PlacementSink};
