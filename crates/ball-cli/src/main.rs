//! Ball trajectory visualizer
//!
//! Simulates a ball flight, draws it through a camera as per-frame
//! ellipses, and recovers 3D ball positions from those ellipses.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Ball trajectory visualizer
#[derive(Parser)]
#[command(name = "ballvis")]
#[command(about = "Simulate ball flights, project them through a camera, and recover 3D positions")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the scenario comes from and where the JSON goes.
#[derive(Args)]
struct ScenarioArgs {
    /// Path to a scenario JSON file
    #[arg(short, long, conflicts_with = "preset")]
    scenario: Option<PathBuf>,

    /// Built-in scenario (gravity, bounce, slow, ellipse, bounding-box, noise)
    #[arg(short, long)]
    preset: Option<String>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Integrate a trajectory and print it as JSON
    Simulate {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Stop the ball at the first ground impact
        #[arg(long)]
        no_bounce: bool,

        /// Disable air drag
        #[arg(long)]
        no_drag: bool,

        /// Disable ground friction
        #[arg(long)]
        no_friction: bool,

        /// Disable Magnus lift
        #[arg(long)]
        no_magnus: bool,
    },

    /// Run a scenario and print per-frame ellipses and estimates
    Project {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },

    /// Project a ball at X Y Z and recover its position from the silhouette
    Estimate {
        /// World X of the ball center
        #[arg(allow_hyphen_values = true)]
        x: f64,

        /// World Y of the ball center
        #[arg(allow_hyphen_values = true)]
        y: f64,

        /// World Z of the ball center
        #[arg(allow_hyphen_values = true)]
        z: f64,

        #[command(flatten)]
        scenario: ScenarioArgs,
    },

    /// Print a scenario as JSON, for editing
    Scenario {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Simulate {
            scenario,
            no_bounce,
            no_drag,
            no_friction,
            no_magnus,
        } => {
            let disabled = commands::simulate::DisabledForces {
                bounce: no_bounce,
                drag: no_drag,
                friction: no_friction,
                magnus: no_magnus,
            };
            commands::simulate::run(
                scenario.scenario.as_deref(),
                scenario.preset.as_deref(),
                disabled,
                scenario.output.as_deref(),
            )?;
        }
        Commands::Project { scenario } => {
            commands::project::run(
                scenario.scenario.as_deref(),
                scenario.preset.as_deref(),
                scenario.output.as_deref(),
            )?;
        }
        Commands::Estimate { x, y, z, scenario } => {
            commands::estimate::run(
                [x, y, z],
                scenario.scenario.as_deref(),
                scenario.preset.as_deref(),
                scenario.output.as_deref(),
            )?;
        }
        Commands::Scenario { scenario } => {
            let loaded =
                commands::load_scenario(scenario.scenario.as_deref(), scenario.preset.as_deref())?;
            commands::write_json(&loaded, scenario.output.as_deref())?;
        }
    }

    Ok(())
}
