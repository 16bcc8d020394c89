pub mod forest;
pub mod roads;
pub mod validator;

use crate::config::GenerationConfig;
use crate::terrain::TerrainSampler;
use crate::terrain::analyzer::GridAnalyzer;
use crate::world::PlacementWorld;
use bevy::log::info;
use forest::{ForestBuilder, ForestEvent, WalkStep};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use roads::{AgentTermination, RoadEvent, RoadNetworkBuilder};
use serde::Serialize;

/// One observable step of a [`GenerationPass`]
#[derive(Debug, Clone, PartialEq)]
pub enum PassEvent {
    Road(RoadEvent),
    /// Every road agent has finished; the forest phase starts on the next step
    RoadPhaseComplete,
    Forest(ForestEvent),
    Finished,
}

/// Totals gathered while a pass runs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub road_buildable_points: usize,
    pub forest_buildable_points: usize,
    pub road_segments: u32,
    pub houses: u32,
    pub trees: u32,
    /// Road agents that ran out of valid candidates before their token budget
    pub road_agents_stopped_early: u32,
    /// Tree walks abandoned because no neighbour was acceptable
    pub walks_stopped_early: u32,
}

enum Phase {
    Roads(RoadNetworkBuilder),
    Forest(ForestBuilder),
    Done,
}

/// Roads first, then forest, against one terrain snapshot and one world.
///
/// Both phases draw from a single `Pcg64`, so a fixed seed reproduces the
/// whole pass.
pub struct GenerationPass<'t, T: TerrainSampler + ?Sized> {
    config: GenerationConfig,
    terrain: &'t T,
    rng: Pcg64,
    phase: Phase,
    report: GenerationReport,
}

impl<'t, T: TerrainSampler + ?Sized> GenerationPass<'t, T> {
    pub fn new(config: GenerationConfig, terrain: &'t T) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        info!("Starting generation pass with seed {seed}");

        let buildable = GridAnalyzer::new(config.city.slope_threshold_degrees)
            .compute_buildable_set(terrain);
        let report = GenerationReport {
            seed,
            road_buildable_points: buildable.len(),
            ..Default::default()
        };
        let roads = RoadNetworkBuilder::new(config.city.clone(), buildable);

        Self {
            config,
            terrain,
            rng: Pcg64::seed_from_u64(seed),
            phase: Phase::Roads(roads),
            report,
        }
    }

    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    pub fn step<W: PlacementWorld + ?Sized>(&mut self, world: &mut W) -> PassEvent {
        match &mut self.phase {
            Phase::Roads(builder) => match builder.step(self.terrain, world, &mut self.rng) {
                RoadEvent::Finished => {
                    // the forest analysis must run after every road and house
                    // has reached the world
                    let forest = ForestBuilder::new(self.config.forest.clone(), self.terrain);
                    self.report.forest_buildable_points = forest.buildable().len();
                    info!(
                        "Road phase complete: {} segments, {} houses",
                        self.report.road_segments, self.report.houses
                    );
                    self.phase = Phase::Forest(forest);
                    PassEvent::RoadPhaseComplete
                }
                event => {
                    self.record_road(&event);
                    PassEvent::Road(event)
                }
            },
            Phase::Forest(builder) => match builder.step(self.terrain, world, &mut self.rng) {
                ForestEvent::Finished => {
                    info!("Forest phase complete: {} trees", self.report.trees);
                    self.phase = Phase::Done;
                    PassEvent::Finished
                }
                event => {
                    self.record_forest(&event);
                    PassEvent::Forest(event)
                }
            },
            Phase::Done => PassEvent::Finished,
        }
    }

    /// Drive both phases to completion
    pub fn run<W: PlacementWorld + ?Sized>(mut self, world: &mut W) -> GenerationReport {
        while self.step(world) != PassEvent::Finished {}
        self.report
    }

    fn record_road(&mut self, event: &RoadEvent) {
        match event {
            RoadEvent::Extended { houses, .. } => {
                self.report.road_segments += 1;
                self.report.houses += houses.count;
            }
            RoadEvent::AgentTerminated {
                reason: AgentTermination::NoValidCandidate,
                ..
            } => self.report.road_agents_stopped_early += 1,
            _ => {}
        }
    }

    fn record_forest(&mut self, event: &ForestEvent) {
        if let ForestEvent::TreePlaced { next, .. } = event {
            self.report.trees += 1;
            if *next == WalkStep::Stuck {
                self.report.walks_stopped_early += 1;
            }
        }
    }
}
