use settler::generation::GenerationReport;
use settler::{
    CityConfig, ForestConfig, GenerationConfig, ObjectTag, OccupancyGrid, Placement,
    SettlementError, SettlementResult,
};

/// Generic parser for delimited strings that return fixed-size arrays
pub fn parse_delimited<T, const N: usize>(
    input: &str,
    delimiter: char,
    type_name: &str,
    parser: impl Fn(&str) -> Result<T, std::num::ParseFloatError>,
) -> SettlementResult<[T; N]>
where
    T: Copy + Default,
{
    let parts: Vec<&str> = input.split(delimiter).collect();
    if parts.len() != N {
        return Err(SettlementError::InvalidConfig {
            reason: format!(
                "Invalid {type_name} format '{input}'. Expected {N} {delimiter}-separated values"
            ),
        });
    }

    let mut result = [T::default(); N];
    for (i, part) in parts.iter().enumerate() {
        result[i] = parser(part.trim()).map_err(|_| SettlementError::InvalidConfig {
            reason: format!("Invalid {type_name} value: '{part}'"),
        })?;
    }

    Ok(result)
}

/// Parse a grid size, either "N" or a square "NxN"
pub fn parse_size(size_str: &str) -> SettlementResult<u32> {
    let size = match size_str.split_once('x') {
        Some((width, height)) if width == height => width,
        Some(_) => {
            return Err(SettlementError::InvalidConfig {
                reason: format!("Terrain must be square, got '{size_str}'"),
            });
        }
        None => size_str,
    };

    let size: u32 = size.trim().parse().map_err(|_| SettlementError::InvalidConfig {
        reason: format!("Invalid size '{size_str}'"),
    })?;

    if !(8..=2048).contains(&size) {
        return Err(SettlementError::InvalidConfig {
            reason: "Size must be between 8 and 2048".to_string(),
        });
    }

    Ok(size)
}

/// Parse tree half extents "X,Y,Z"
pub fn parse_half_extents(extents_str: &str) -> SettlementResult<[f32; 3]> {
    let extents = parse_delimited::<f32, 3>(extents_str, ',', "half extents", |s| s.parse())?;
    if extents.iter().any(|&e| e <= 0.0) {
        return Err(SettlementError::InvalidConfig {
            reason: "Half extents must be positive".to_string(),
        });
    }
    Ok(extents)
}

/// Settings used when no configuration file is given
pub fn default_config() -> GenerationConfig {
    GenerationConfig::new(CityConfig::new(4, 8, 10, 3), ForestConfig::new(6, 4, 8, 5))
}

/// Warning text when more houses are requested than fit along a segment
pub fn house_budget_warning(city: &CityConfig) -> Option<String> {
    let max = city.max_houses_per_segment();
    (city.houses_per_segment > max).then(|| {
        format!(
            "Warning: {} houses per segment exceed the {max} that fit along a {}-cell road at gap {}; houses will overlap the segment ends",
            city.houses_per_segment, city.road_length, city.gap
        )
    })
}

pub fn print_summary(report: &GenerationReport, world: &OccupancyGrid, terrain_label: &str) {
    let resolution = world.geometry().resolution;
    println!("\nSettlement summary:");
    println!("  Terrain: {terrain_label} ({resolution}x{resolution})");
    println!("  Seed: {}", report.seed);
    println!(
        "  Buildable points: {} for roads, {} for forest",
        report.road_buildable_points, report.forest_buildable_points
    );
    println!(
        "  Roads: {} segments ({} agents stopped early)",
        report.road_segments, report.road_agents_stopped_early
    );
    println!("  Houses: {}", report.houses);
    println!(
        "  Trees: {} ({} walks stopped early)",
        report.trees, report.walks_stopped_early
    );
    println!(
        "  Occupied cells: {} road, {} house, {} tree",
        world.count(ObjectTag::Road),
        world.count(ObjectTag::House),
        world.count(ObjectTag::Tree)
    );
}

pub fn format_placement(placement: &Placement) -> String {
    match placement {
        Placement::Road { from, to } => format!("road  {from} -> {to}"),
        Placement::House {
            position,
            orientation,
        } => {
            let (yaw, _, _) = orientation.to_euler(bevy::math::EulerRot::YXZ);
            format!("house {position} yaw {:.1}", yaw.to_degrees())
        }
        Placement::Tree { position } => format!("tree  {position}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::{Quat, Vec3};

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("64").unwrap(), 64);
        assert_eq!(parse_size("128x128").unwrap(), 128);

        assert!(parse_size("64x32").is_err());
        assert!(parse_size("abc").is_err());
        assert!(parse_size("4").is_err());
        assert!(parse_size("3000").is_err());
    }

    #[test]
    fn test_parse_half_extents() {
        assert_eq!(parse_half_extents("0.5,1.0,0.5").unwrap(), [0.5, 1.0, 0.5]);
        assert_eq!(parse_half_extents("1, 2, 3").unwrap(), [1.0, 2.0, 3.0]);

        assert!(parse_half_extents("0.5,1.0").is_err());
        assert!(parse_half_extents("a,b,c").is_err());
        assert!(parse_half_extents("0.5,0,0.5").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(default_config().check().is_ok());
    }

    #[test]
    fn test_house_budget_warning() {
        let city = CityConfig::new(1, 1, 10, 5);
        assert!(house_budget_warning(&city).is_none());
        assert!(house_budget_warning(&city.clone().with_houses(2)).is_some());
        assert!(house_budget_warning(&CityConfig::new(1, 1, 10, 0)).is_some());
    }

    #[test]
    fn test_format_placement() {
        let road = Placement::Road {
            from: Vec3::ZERO,
            to: Vec3::X,
        };
        assert!(format_placement(&road).starts_with("road"));

        let house = Placement::House {
            position: Vec3::ZERO,
            orientation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        };
        assert!(format_placement(&house).ends_with("yaw 90.0"));
    }
}
