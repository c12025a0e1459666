//! hatchery - CLI for plotter hatching of overlapping shapes
//!
//! Usage:
//!   hatchery hatch <scene.yaml>    Hatch a scene to SVG or JSON
//!   hatchery outline <scene.yaml>  Write only the visible outline
//!   hatchery demo                  Hatch the built-in five-shape scene
//!   hatchery patterns              List hatch presets
//!   hatchery modes                 List hatch modes

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

use cli::{DemoArgs, HatchArgs, OutlineArgs};

#[derive(Parser)]
#[command(name = "hatchery", version)]
#[command(about = "Occlusion-aware hatch fills for pen plotters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hatch a scene file
    Hatch(HatchArgs),
    /// Write the visible outline of a scene without hatching
    Outline(OutlineArgs),
    /// Hatch the built-in five-shape scene
    Demo(DemoArgs),
    /// List hatch pattern presets
    Patterns,
    /// List hatch modes
    Modes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Hatch(args) => cli::cmd_hatch(&args)?,
        Commands::Outline(args) => cli::cmd_outline(&args)?,
        Commands::Demo(args) => cli::cmd_demo(&args)?,
        Commands::Patterns => cli::cmd_patterns(),
        Commands::Modes => cli::cmd_modes(),
    }

    Ok(())
}
