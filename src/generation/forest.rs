use crate::config::ForestConfig;
use crate::terrain::TerrainSampler;
use crate::terrain::analyzer::{BuildableSet, GridAnalyzer};
use crate::terrain::coordinates::GridPoint;
use crate::world::{OccupancyOracle, PlacementWorld};
use bevy::log::{debug, info, warn};
use bevy::math::Vec3;
use rand::Rng;

/// 8-connected neighbourhood, tried in this order
const NEIGHBOURS: [GridPoint; 8] = [
    GridPoint::RIGHT,
    GridPoint::LEFT,
    GridPoint::DOWN,
    GridPoint::UP,
    GridPoint::new(1, 1),
    GridPoint::new(-1, -1),
    GridPoint::new(-1, 1),
    GridPoint::new(1, -1),
];

/// What the walker did after placing a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep {
    /// Moved to a new point for the next tree
    Moved(GridPoint),
    /// Placed the last tree this walk allows
    WalkComplete,
    /// No neighbour passed the checks; the rest of this walk is abandoned
    Stuck,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForestEvent {
    TreePlaced {
        walker: u32,
        repetition: u32,
        point: GridPoint,
        position: Vec3,
        next: WalkStep,
    },
    WalkerFinished {
        walker: u32,
        /// `None` when the walker never found a starting point
        anchor: Option<GridPoint>,
        trees: u32,
    },
    Finished,
}

/// Cursor of one walker; resets to the anchor at every repetition
#[derive(Debug, Clone, Copy)]
struct TreeWalk {
    walker: u32,
    anchor: GridPoint,
    repetition: u32,
    cursor: GridPoint,
    steps: u32,
    trees: u32,
}

/// Random-walk tree placement, one tree per [`step`](Self::step)
#[derive(Debug, Clone)]
pub struct ForestBuilder {
    config: ForestConfig,
    buildable: BuildableSet,
    next_walker: u32,
    walk: Option<TreeWalk>,
}

impl ForestBuilder {
    /// Analyzes `terrain` with the forest slope threshold. Call this only
    /// once every road and house is in the world.
    pub fn new<T: TerrainSampler + ?Sized>(config: ForestConfig, terrain: &T) -> Self {
        let buildable =
            GridAnalyzer::new(config.slope_threshold_degrees).compute_buildable_set(terrain);
        Self::with_buildable(config, buildable)
    }

    pub fn with_buildable(config: ForestConfig, buildable: BuildableSet) -> Self {
        if config.distance < 2 {
            warn!(
                "Forest distance {} is below 2, no trees will be placed",
                config.distance
            );
        }
        Self {
            config,
            buildable,
            next_walker: 0,
            walk: None,
        }
    }

    pub fn buildable(&self) -> &BuildableSet {
        &self.buildable
    }

    pub fn step<T, W, R>(&mut self, terrain: &T, world: &mut W, rng: &mut R) -> ForestEvent
    where
        T: TerrainSampler + ?Sized,
        W: PlacementWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let mut walk = match self.walk {
            Some(walk) => walk,
            None => {
                if self.next_walker >= self.config.agents {
                    return ForestEvent::Finished;
                }
                let walker = self.next_walker;
                self.next_walker += 1;

                if self.config.distance < 2 {
                    return ForestEvent::WalkerFinished {
                        walker,
                        anchor: None,
                        trees: 0,
                    };
                }
                let Some(anchor) = self.buildable.choose(rng) else {
                    debug!("Tree walker {walker} has no buildable point to start from");
                    return ForestEvent::WalkerFinished {
                        walker,
                        anchor: None,
                        trees: 0,
                    };
                };
                debug!("Tree walker {walker} anchored at {anchor}");
                TreeWalk {
                    walker,
                    anchor,
                    repetition: 0,
                    cursor: anchor,
                    steps: 0,
                    trees: 0,
                }
            }
        };

        if walk.repetition >= self.config.tokens || self.config.return_value == 0 {
            self.walk = None;
            return ForestEvent::WalkerFinished {
                walker: walk.walker,
                anchor: Some(walk.anchor),
                trees: walk.trees,
            };
        }

        let point = walk.cursor;
        let position = terrain.surface_point(point);
        world.place_tree(position);
        walk.steps += 1;
        walk.trees += 1;

        let next = if walk.steps >= self.config.return_value {
            WalkStep::WalkComplete
        } else {
            match self.next_point(terrain, &*world, point, rng) {
                Some(next) => WalkStep::Moved(next),
                None => {
                    info!(
                        "Tree walker {} can't find a good point to place a tree after {} steps",
                        walk.walker, walk.steps
                    );
                    WalkStep::Stuck
                }
            }
        };

        let repetition = walk.repetition;
        match next {
            WalkStep::Moved(next) => walk.cursor = next,
            WalkStep::WalkComplete | WalkStep::Stuck => {
                walk.repetition += 1;
                walk.cursor = walk.anchor;
                walk.steps = 0;
            }
        }
        self.walk = Some(walk);

        ForestEvent::TreePlaced {
            walker: walk.walker,
            repetition,
            point,
            position,
            next,
        }
    }

    /// Jump distance for one step, shared by all eight neighbours
    fn jump<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        if self.config.distance > 2 {
            rng.gen_range(2..self.config.distance) as i32
        } else {
            2
        }
    }

    fn next_point<T, O, R>(
        &self,
        terrain: &T,
        world: &O,
        from: GridPoint,
        rng: &mut R,
    ) -> Option<GridPoint>
    where
        T: TerrainSampler + ?Sized,
        O: OccupancyOracle + ?Sized,
        R: Rng + ?Sized,
    {
        let jump = self.jump(rng);
        let candidates: Vec<GridPoint> = NEIGHBOURS
            .iter()
            .map(|&offset| from + offset * jump)
            .filter(|&candidate| self.accepts(terrain, world, candidate))
            .collect();

        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.gen_range(0..candidates.len())])
    }

    /// On the grid, gentle enough, and clear of anything already placed
    pub fn accepts<T, O>(&self, terrain: &T, world: &O, candidate: GridPoint) -> bool
    where
        T: TerrainSampler + ?Sized,
        O: OccupancyOracle + ?Sized,
    {
        terrain.geometry().contains(candidate)
            && terrain.slope_degrees(candidate) < self.config.slope_threshold_degrees
            && !world.overlaps(
                terrain.surface_point(candidate),
                Vec3::from_array(self.config.tree_half_extents),
            )
    }
}
