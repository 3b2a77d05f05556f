//! City generator binary: grows a road network and prints or exports it.
//!
//! Usage: cargo run --release --bin generate_city -- [OPTIONS]
//!
//! Options:
//!   --size <PRESET>          small | medium | large (default: small)
//!   --width <W> --height <H> Explicit grid size (overrides --size)
//!   --seed <SEED>            Random seed (default: drawn and printed)
//!   --name <NAME>            City name stored in the descriptor (default: "city")
//!   --branch-chance <P>      Probability a straight road branches (default: 0.4)
//!   --origin-branches <N>    Roads leaving the center tile (default: 4)
//!   --descriptor <PATH>      Write a JSON descriptor that reproduces the city
//!   --load <PATH>            Regenerate from a descriptor instead
//!   --png <PATH>             Write an isometric preview image
//!   --screen <WxH>           Preview size in pixels (default: 1280x720)
//!   --distance <D>           Preview zoom (default: 1.0)
//!   --ascii                  Print the grid as text

use std::process::ExitCode;

use glam::Vec2;

use isocity::core::camera::CameraUpdate;
use isocity::core::logging;
use isocity::core::types::Result;
use isocity::generation::{CityDescriptor, CitySize, GenerationConfig};
use isocity::render::preview::save_png;
use isocity::scene::CityScene;
use isocity::terrain::RoadParams;

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let (config, name) = match parse_str_arg(args, "--load") {
        Some(path) => {
            let descriptor = CityDescriptor::load(&path)?;
            log::info!("Loaded descriptor '{}' from {}", descriptor.name, path);
            (descriptor.config(), descriptor.name)
        }
        None => {
            let name = parse_str_arg(args, "--name").unwrap_or_else(|| "city".to_string());
            (config_from_args(args), name)
        }
    };

    let (grid, report) = config.generate()?;

    println!("=== Isocity Generator ===");
    println!("City:  {}", name);
    println!("Size:  {} x {}", grid.width(), grid.height());
    println!("Seed:  {}", report.seed);
    println!(
        "Roads: {} paved tiles ({:.1}%), {} points expanded",
        report.paved_tiles,
        100.0 * report.paved_tiles as f64 / grid.tile_count() as f64,
        report.processed_points
    );

    if args.iter().any(|a| a == "--ascii") {
        println!();
        print!("{}", grid.to_ascii());
    }

    if let Some(path) = parse_str_arg(args, "--descriptor") {
        CityDescriptor::from_report(name.clone(), &config, &report).save(&path)?;
        println!("Descriptor: {}", path);
    }

    if let Some(path) = parse_str_arg(args, "--png") {
        let screen = parse_screen_arg(args, "--screen").unwrap_or(Vec2::new(1280.0, 720.0));
        let mut scene = CityScene::new(grid, screen);
        if let Some(distance) = parse_f32_arg(args, "--distance") {
            scene.set_camera(CameraUpdate::new().distance(distance));
            scene.center_on(scene.grid().center());
        }
        let image = scene.render_preview(None);
        let stats = scene.cull_stats();
        log::info!("Rendered {} tiles after visiting {}", stats.visible, stats.visited);
        save_png(&image, &path)?;
        println!("Preview: {}", path);
    }

    Ok(())
}

fn config_from_args(args: &[String]) -> GenerationConfig {
    let preset = match parse_str_arg(args, "--size") {
        Some(name) => CitySize::from_name(&name).unwrap_or_else(|| {
            log::warn!("Unknown size preset '{}', using small", name);
            CitySize::Small
        }),
        None => CitySize::Small,
    };
    let (preset_width, preset_height) = preset.dims();
    let defaults = RoadParams::default();

    GenerationConfig {
        size: (
            parse_i32_arg(args, "--width").unwrap_or(preset_width),
            parse_i32_arg(args, "--height").unwrap_or(preset_height),
        ),
        seed: parse_u64_arg(args, "--seed"),
        road_params: RoadParams {
            branch_chance: parse_f64_arg(args, "--branch-chance").unwrap_or(defaults.branch_chance),
            origin_branches: parse_usize_arg(args, "--origin-branches").unwrap_or(defaults.origin_branches),
        },
    }
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_i32_arg(args: &[String], flag: &str) -> Option<i32> {
    parse_str_arg(args, flag).and_then(|s| s.parse().ok())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    parse_str_arg(args, flag).and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    parse_str_arg(args, flag).and_then(|s| s.parse().ok())
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    parse_str_arg(args, flag).and_then(|s| s.parse().ok())
}

fn parse_f64_arg(args: &[String], flag: &str) -> Option<f64> {
    parse_str_arg(args, flag).and_then(|s| s.parse().ok())
}

/// `WxH`, e.g. `1920x1080`
fn parse_screen_arg(args: &[String], flag: &str) -> Option<Vec2> {
    let value = parse_str_arg(args, flag)?;
    let (w, h) = value.split_once('x')?;
    Some(Vec2::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
}
