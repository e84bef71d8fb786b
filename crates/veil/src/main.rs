mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use veil_core::{OcclusionSettings, RegionSpec};

#[derive(Parser)]
#[command(name = "veil")]
#[command(about = "Check whether shell regions are covered by Hyprland windows")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ~/.config/veil/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a region once. Exits 0 when occluded, 1 when clear.
    Check {
        /// Region as <edge>:<thickness> (top:34) or <x>,<y>,<width>,<height>
        region: RegionSpec,
        /// Workspace to check (defaults to the active one)
        #[arg(long)]
        workspace: Option<i32>,
        /// Only consider windows on this monitor
        #[arg(long)]
        monitor: Option<i32>,
        /// Print the detailed verdict as JSON
        #[arg(long)]
        explain: bool,
    },
    /// Print occlusion changes for one or more regions
    Watch {
        /// Regions to watch
        #[arg(required = true)]
        regions: Vec<RegionSpec>,
        /// Only consider windows on this monitor
        #[arg(long)]
        monitor: Option<i32>,
        /// Poll interval in milliseconds (overrides settings)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Dump the compositor state used for occlusion checks
    Snapshot,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("veil=info".parse()?)
                .add_directive("veil_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let path = cli.config.unwrap_or_else(OcclusionSettings::default_path);
    let settings = OcclusionSettings::load(&path);

    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Command::Check {
            region,
            workspace,
            monitor,
            explain,
        } => {
            let occluded = runtime.block_on(commands::check(
                &settings, region, workspace, monitor, explain,
            ))?;
            std::process::exit(if occluded { 0 } else { 1 });
        }
        Command::Watch {
            regions,
            monitor,
            interval_ms,
        } => runtime.block_on(commands::watch(&settings, regions, monitor, interval_ms)),
        Command::Snapshot => runtime.block_on(commands::snapshot(&settings)),
    }
}
