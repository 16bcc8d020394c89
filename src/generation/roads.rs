use super::validator::PlacementValidator;
use crate::config::CityConfig;
use crate::terrain::TerrainSampler;
use crate::terrain::analyzer::BuildableSet;
use crate::terrain::coordinates::GridPoint;
use crate::world::{OccupancyOracle, PlacementWorld};
use bevy::log::{debug, info};
use bevy::math::{Quat, Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One accepted stretch of road between two grid points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub from: GridPoint,
    pub to: GridPoint,
}

impl RoadSegment {
    pub fn new(from: GridPoint, to: GridPoint) -> Self {
        Self { from, to }
    }

    pub fn length(&self) -> f32 {
        self.from.as_vec2().distance(self.to.as_vec2())
    }

    /// Unit travel direction in grid space
    pub fn direction(&self) -> Vec2 {
        (self.to.as_vec2() - self.from.as_vec2()).normalize_or_zero()
    }
}

/// Houses laid out along one road segment.
///
/// The first house stands at the segment midpoint; the rest alternate ahead
/// of and behind it along the travel direction, `gap` apart on each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseCluster {
    pub anchor: Vec3,
    /// Unit travel direction in world space
    pub direction: Vec3,
    pub count: u32,
    pub gap: f32,
}

impl HouseCluster {
    pub fn along<T: TerrainSampler + ?Sized>(
        terrain: &T,
        segment: &RoadSegment,
        count: u32,
        gap: u32,
    ) -> Self {
        let from = terrain.surface_point(segment.from);
        let to = terrain.surface_point(segment.to);
        Self {
            anchor: from.lerp(to, 0.5),
            direction: (to - from).normalize_or_zero(),
            count: count.max(1),
            gap: gap as f32,
        }
    }

    /// Horizontal direction the houses face, perpendicular to the road
    pub fn facing(&self) -> Vec3 {
        self.direction.cross(Vec3::Y).normalize_or_zero()
    }

    /// Yaw that turns local +Z toward [`Self::facing`]
    pub fn orientation(&self) -> Quat {
        let facing = self.facing();
        if facing == Vec3::ZERO {
            return Quat::IDENTITY;
        }
        Quat::from_rotation_y(facing.x.atan2(facing.z))
    }

    pub fn positions(&self) -> Vec<Vec3> {
        let mut positions = Vec::with_capacity(self.count as usize);
        positions.push(self.anchor);

        let step = self.direction * self.gap;
        let (mut ahead, mut behind) = (self.anchor, self.anchor);
        for i in 0..self.count.saturating_sub(1) {
            if i % 2 == 0 {
                ahead += step;
                positions.push(ahead);
            } else {
                behind -= step;
                positions.push(behind);
            }
        }
        positions
    }
}

/// Why a road agent stopped walking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentTermination {
    /// Placed its full budget of segments
    TokensExhausted,
    /// No candidate passed validation
    NoValidCandidate,
    /// The buildable set was empty, so the agent never started
    NoBuildableSeed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoadEvent {
    Extended {
        agent: u32,
        segment: RoadSegment,
        houses: HouseCluster,
    },
    AgentTerminated {
        agent: u32,
        segments: u32,
        reason: AgentTermination,
    },
    Finished,
}

#[derive(Debug, Clone, Copy)]
struct RoadAgent {
    id: u32,
    previous: GridPoint,
    current: GridPoint,
    segments: u32,
}

/// Grows roads one segment per [`step`](Self::step), running its agents
/// strictly one after another
#[derive(Debug, Clone)]
pub struct RoadNetworkBuilder {
    config: CityConfig,
    buildable: BuildableSet,
    validator: PlacementValidator,
    next_agent: u32,
    agent: Option<RoadAgent>,
}

impl RoadNetworkBuilder {
    pub fn new(config: CityConfig, buildable: BuildableSet) -> Self {
        let validator = PlacementValidator::new(config.slope_threshold_degrees);
        Self {
            config,
            buildable,
            validator,
            next_agent: 0,
            agent: None,
        }
    }

    pub fn buildable(&self) -> &BuildableSet {
        &self.buildable
    }

    /// Advance until one segment is placed or an agent stops.
    ///
    /// The world receives the road and its houses before this returns, so the
    /// next call validates against them.
    pub fn step<T, W, R>(&mut self, terrain: &T, world: &mut W, rng: &mut R) -> RoadEvent
    where
        T: TerrainSampler + ?Sized,
        W: PlacementWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let mut agent = match self.agent {
            Some(agent) => agent,
            None => {
                if self.next_agent >= self.config.agents {
                    return RoadEvent::Finished;
                }
                let id = self.next_agent;
                self.next_agent += 1;

                let Some(seed) = self.buildable.choose(rng) else {
                    debug!("Road agent {id} has no buildable point to start from");
                    return RoadEvent::AgentTerminated {
                        agent: id,
                        segments: 0,
                        reason: AgentTermination::NoBuildableSeed,
                    };
                };
                debug!("Road agent {id} seeded at {seed}");
                RoadAgent {
                    id,
                    previous: seed,
                    current: seed,
                    segments: 0,
                }
            }
        };

        if agent.segments >= self.config.tokens {
            self.agent = None;
            return RoadEvent::AgentTerminated {
                agent: agent.id,
                segments: agent.segments,
                reason: AgentTermination::TokensExhausted,
            };
        }

        let candidates = self.valid_candidates(terrain, &*world, &agent);
        if candidates.is_empty() {
            info!(
                "Road agent {} can't find a good point to place a road after {} segments",
                agent.id, agent.segments
            );
            self.agent = None;
            return RoadEvent::AgentTerminated {
                agent: agent.id,
                segments: agent.segments,
                reason: AgentTermination::NoValidCandidate,
            };
        }

        let chosen = candidates[rng.gen_range(0..candidates.len())];
        let segment = RoadSegment::new(agent.current, chosen);
        let houses = HouseCluster::along(
            terrain,
            &segment,
            self.config.houses_per_segment,
            self.config.gap,
        );

        world.place_road(
            terrain.surface_point(segment.from),
            terrain.surface_point(segment.to),
        );
        let orientation = houses.orientation();
        for position in houses.positions() {
            world.place_house(position, orientation);
        }

        agent.previous = agent.current;
        agent.current = chosen;
        agent.segments += 1;
        self.agent = Some(agent);

        RoadEvent::Extended {
            agent: agent.id,
            segment,
            houses,
        }
    }

    /// Candidate endpoints for the agent's next segment, before validation.
    ///
    /// A fresh agent tries the four axis directions; afterwards it tries
    /// straight on and both perpendiculars of its travel direction.
    fn candidates(&self, agent: &RoadAgent) -> Vec<GridPoint> {
        let length = self.config.road_length as i32;
        if agent.segments == 0 {
            return [
                GridPoint::DOWN,
                GridPoint::UP,
                GridPoint::RIGHT,
                GridPoint::LEFT,
            ]
            .into_iter()
            .map(|offset| agent.current + offset * length)
            .collect();
        }

        let heading = RoadSegment::new(agent.previous, agent.current).direction();
        let forward = GridPoint::truncate(heading);
        let side = GridPoint::truncate(heading.perp());
        vec![
            agent.current + forward * length,
            agent.current + side * length,
            agent.current - side * length,
        ]
    }

    fn valid_candidates<T, O>(&self, terrain: &T, world: &O, agent: &RoadAgent) -> Vec<GridPoint>
    where
        T: TerrainSampler + ?Sized,
        O: OccupancyOracle + ?Sized,
    {
        self.candidates(agent)
            .into_iter()
            .filter(|&candidate| {
                self.validator
                    .is_valid_segment(terrain, world, agent.current, candidate)
            })
            .collect()
    }
}
