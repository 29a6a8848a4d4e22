//! Quay CLI - multi-platform packaging for user-defined functions

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use quay::util::GlobalContext;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        match commands::diagnostic_for(&e) {
            Some(diagnostic) => quay::util::diagnostic::emit(&diagnostic, color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("quay=debug")
    } else {
        EnvFilter::new("quay=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);

    match cli.command {
        Commands::Platforms(args) => commands::platforms::execute(&ctx, args),
        Commands::Plan(args) => commands::plan::execute(&ctx, args),
        Commands::Package(args) => commands::package::execute(&ctx, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
