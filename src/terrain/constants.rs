/// Constants for terrain analysis and placement
/// Samples at or below this normalized height are ocean
pub const OCEAN_FLOOR_HEIGHT: f32 = 0.01;
/// Margin above the island average a buildable sample must clear
pub const BUILDABLE_HEIGHT_MARGIN: f32 = 0.05;

/// Slope limits in degrees
pub const ROAD_SLOPE_LIMIT_DEGREES: f32 = 7.0;
pub const FOREST_SLOPE_LIMIT_DEGREES: f32 = 15.0;
/// Reported for points whose surface normal is unknown
pub const UNKNOWN_SLOPE_DEGREES: f32 = 90.0;

/// Perpendicular sample offsets of the road corridor scan
pub const CORRIDOR_NEAR_OFFSET: f32 = 1.0;
pub const CORRIDOR_FAR_OFFSET: f32 = 2.0;

/// Object footprint defaults
pub const DEFAULT_TREE_HALF_EXTENT: f32 = 0.5;
pub const DEFAULT_HOUSE_HALF_EXTENT: f32 = 0.5;
pub const HOUSE_SETBACK: f32 = 1.0;
