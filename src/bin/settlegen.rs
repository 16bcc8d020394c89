use clap::Parser;
use settler::config::{default_config_path, load_config, save_config};
use settler::terrain_generation::load_heightmap;
use settler::world::preview::write_preview;
use settler::{
    GenerationConfig, GenerationPass, HeightField, HeightFieldSettings, OccupancyGrid,
    SettlementResult, TerrainSampler,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod settlegen {
    pub mod cli_utils;
    pub mod terrain_builder;
}

use bevy::math::Vec3;
use settlegen::cli_utils::*;
use settlegen::terrain_builder::TerrainBuilder;

#[derive(Parser, Clone)]
#[command(name = "settlegen")]
#[command(about = "Grow a road network, houses and forest on an island height field")]
struct Args {
    /// Grid resolution (format: N or NxN)
    #[arg(long, default_value = "128")]
    size: String,

    /// Island preset (flat-island, island, highlands)
    #[arg(long, default_value = "island")]
    terrain_type: String,

    /// Square grayscale PNG to use instead of a generated island
    #[arg(long)]
    heightmap: Option<PathBuf>,

    /// Random seed for reproducible terrain and placement
    #[arg(long)]
    seed: Option<u64>,

    /// Generation config file (TOML); the user config is used when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// World units per grid cell
    #[arg(long, default_value = "1.0")]
    cell_size: f32,

    /// World units per normalized height unit
    #[arg(long, default_value = "30.0")]
    height_scale: f32,

    /// Relief amplitude override for the preset
    #[arg(long)]
    amplitude: Option<f32>,

    /// Relief frequency override for the preset
    #[arg(long)]
    frequency: Option<f32>,

    /// Relief octave override for the preset
    #[arg(long)]
    octaves: Option<u32>,

    /// Number of road agents
    #[arg(long)]
    city_agents: Option<u32>,

    /// Road segments per agent
    #[arg(long)]
    city_tokens: Option<u32>,

    /// Segment length in grid cells (5-20)
    #[arg(long)]
    road_length: Option<u32>,

    /// Spacing between houses along a segment
    #[arg(long)]
    gap: Option<u32>,

    /// Houses per road segment
    #[arg(long)]
    houses: Option<u32>,

    /// Number of tree walkers
    #[arg(long)]
    forest_agents: Option<u32>,

    /// Walks per tree walker
    #[arg(long)]
    forest_tokens: Option<u32>,

    /// Trees per walk
    #[arg(long)]
    return_value: Option<u32>,

    /// Exclusive upper bound of a walker's jump (2-8)
    #[arg(long)]
    distance: Option<u32>,

    /// Tree half extents used for overlap checks (format: X,Y,Z)
    #[arg(long)]
    tree_extents: Option<String>,

    /// Save the effective generation config to this path and continue
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Write a top-down PNG of the result
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Print every placement
    #[arg(long)]
    list: bool,
}

fn resolve_config(args: &Args) -> SettlementResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => match default_config_path().filter(|path| path.exists()) {
            Some(path) => {
                println!("Using config from {}", path.display());
                load_config(&path)?
            }
            None => default_config(),
        },
    };

    let city = &mut config.city;
    let overrides = [
        (&mut city.agents, args.city_agents),
        (&mut city.tokens, args.city_tokens),
        (&mut city.road_length, args.road_length),
        (&mut city.gap, args.gap),
        (&mut city.houses_per_segment, args.houses),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            *field = value;
        }
    }

    let forest = &mut config.forest;
    let overrides = [
        (&mut forest.agents, args.forest_agents),
        (&mut forest.tokens, args.forest_tokens),
        (&mut forest.return_value, args.return_value),
        (&mut forest.distance, args.distance),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            *field = value;
        }
    }
    if let Some(extents) = &args.tree_extents {
        forest.tree_half_extents = parse_half_extents(extents)?;
    }

    if args.seed.is_some() {
        config.seed = args.seed;
    }

    config.check()?;
    Ok(config)
}

fn build_terrain(args: &Args, seed: u64) -> SettlementResult<(HeightField, String)> {
    let settings = HeightFieldSettings {
        cell_size: args.cell_size,
        height_scale: args.height_scale,
        ..Default::default()
    };

    if let Some(path) = &args.heightmap {
        let field = load_heightmap(path, settings)?;
        return Ok((field, path.display().to_string()));
    }

    let size = parse_size(&args.size)?;
    let generator = TerrainBuilder::new(args.terrain_type.clone())
        .seed(Some(seed as u32))
        .amplitude(args.amplitude)
        .frequency(args.frequency)
        .octaves(args.octaves)
        .build()?;
    let field = generator.generate(size, settings)?;
    Ok((field, args.terrain_type.clone()))
}

fn main() -> SettlementResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = resolve_config(&args)?;

    if let Some(path) = &args.write_config {
        save_config(&config, path)?;
        println!("Config saved to {}", path.display());
    }

    if let Some(warning) = house_budget_warning(&config.city) {
        println!("{warning}");
    }

    let seed = *config.seed.get_or_insert_with(rand::random);
    let (terrain, terrain_label) = build_terrain(&args, seed)?;

    let mut world = OccupancyGrid::new(terrain.geometry());
    world.tree_half_extents = Vec3::from_array(config.forest.tree_half_extents);

    let report = GenerationPass::new(config, &terrain).run(&mut world);

    if args.list {
        for placement in world.placements() {
            println!("{}", format_placement(placement));
        }
    }

    if let Some(path) = &args.preview {
        write_preview(&terrain, &world, path)?;
        println!("Preview written to {}", path.display());
    }

    print_summary(&report, &world, &terrain_label);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let args = Args::parse_from([
            "settlegen",
            "--config",
            "/definitely/not/here.toml",
        ]);
        assert!(resolve_config(&args).is_err());

        let dir = std::env::temp_dir().join(format!("settlegen-cli-{}", std::process::id()));
        let path = dir.join("generation.toml");
        save_config(&default_config(), &path).unwrap();

        let args = Args::parse_from([
            "settlegen",
            "--config",
            path.to_str().unwrap(),
            "--road-length",
            "12",
            "--distance",
            "7",
            "--seed",
            "99",
            "--tree-extents",
            "1,1,1",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.city.road_length, 12);
        assert_eq!(config.city.agents, default_config().city.agents);
        assert_eq!(config.forest.distance, 7);
        assert_eq!(config.forest.tree_half_extents, [1.0; 3]);
        assert_eq!(config.seed, Some(99));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_out_of_range_override_is_rejected() {
        let dir = std::env::temp_dir().join(format!("settlegen-range-{}", std::process::id()));
        let path = dir.join("generation.toml");
        save_config(&default_config(), &path).unwrap();

        let args = Args::parse_from([
            "settlegen",
            "--config",
            path.to_str().unwrap(),
            "--road-length",
            "40",
        ]);
        assert!(resolve_config(&args).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_main_integration() {
        let args = Args::parse_from([
            "settlegen",
            "--size",
            "64",
            "--terrain-type",
            "flat-island",
        ]);
        let config = default_config().with_seed(12345);

        let (terrain, label) = build_terrain(&args, 12345).unwrap();
        assert_eq!(label, "flat-island");
        assert_eq!(terrain.resolution(), 64);

        let mut world = OccupancyGrid::new(terrain.geometry());
        let report = GenerationPass::new(config, &terrain).run(&mut world);
        assert_eq!(report.seed, 12345);
        assert!(report.road_buildable_points > 0);
        assert_eq!(
            world.placements().len() as u32,
            report.road_segments + report.houses + report.trees
        );
    }
}
