//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Quay - package one body of UDF code for several query engines
#[derive(Parser)]
#[command(name = "quay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the platforms in the catalog
    Platforms(PlatformsArgs),

    /// Show the tasks and artifacts without running anything
    Plan(PlanArgs),

    /// Build every artifact of the selected platforms
    Package(PackageArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct PlatformsArgs {
    /// Also list each platform's dependencies
    #[arg(long)]
    pub dependencies: bool,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Platforms to plan (defaults to `[platforms] active`, then all)
    #[arg(short, long = "platform")]
    pub platforms: Vec<String>,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PackageArgs {
    /// Platforms to package (defaults to `[platforms] active`, then all)
    #[arg(short, long = "platform")]
    pub platforms: Vec<String>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Print the execution report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
