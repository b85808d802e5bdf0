//! Colonia - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use col_core::map_generation::{generate_land, MapConfig};
use col_core::ocean::make_fixed_oceans;
use col_tools::validate::validate_regions;
use col_tools::{read_ascii_map, region_table, write_text};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "col-tools")]
#[command(about = "Map tools for Colonia")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a land/water map as ASCII
    Generate {
        /// Map width in tiles
        #[arg(long, default_value_t = 40)]
        width: u32,
        /// Map height in tiles
        #[arg(long, default_value_t = 100)]
        height: u32,
        /// Random seed
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Output file, stdout if omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Partition a map's oceans and print the region table
    Oceans {
        /// ASCII map file
        map: PathBuf,
        /// Write the region registry as RON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Partition a map's oceans and check the region invariants
    Validate {
        /// ASCII map file
        map: PathBuf,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> col_core::error::Result<()> {
    match command {
        Commands::Generate {
            width,
            height,
            seed,
            output,
        } => {
            let config = MapConfig {
                width,
                height,
                seed,
                ..MapConfig::default()
            };
            let ascii = generate_land(&config)?.to_ascii();
            match output {
                Some(path) => {
                    write_text(&path, &ascii)?;
                    tracing::info!("Map written to {}", path.display());
                }
                None => print!("{ascii}"),
            }
        }
        Commands::Oceans { map, output } => {
            let mut map = read_ascii_map(&map)?;
            make_fixed_oceans(&mut map)?;
            print!("{}", region_table(&map));
            if let Some(path) = output {
                write_text(&path, &map.regions().to_ron()?)?;
                tracing::info!("Regions written to {}", path.display());
            }
        }
        Commands::Validate { map: path } => {
            tracing::info!("Validating regions of {}", path.display());
            let mut map = read_ascii_map(&path)?;
            make_fixed_oceans(&mut map)?;
            let report = validate_regions(&map);
            for issue in &report.issues {
                tracing::warn!("{issue}");
            }
            if !report.is_ok() {
                return Err(col_core::error::GameError::InvalidState(format!(
                    "{} region issues",
                    report.issues.len()
                )));
            }
            tracing::info!(
                regions = report.regions_checked,
                lakes = report.unassigned_water,
                "Validation passed"
            );
        }
    }
    Ok(())
}
