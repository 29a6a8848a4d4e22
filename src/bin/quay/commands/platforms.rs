//! `quay platforms` command

use anyhow::Result;

use crate::cli::PlatformsArgs;
use quay::ops::load_catalog;
use quay::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: PlatformsArgs) -> Result<()> {
    let project = ctx.load_project()?;
    let catalog = load_catalog(&project)?;
    let active = &project.config.platforms.active;

    for platform in catalog.platforms() {
        let marker = if active.is_empty() || active.iter().any(|a| a == platform.name()) {
            "*"
        } else {
            " "
        };
        let packaging: Vec<_> = platform.packaging().iter().map(|p| p.to_string()).collect();
        println!(
            "{} {:<8} {:<6} {}",
            marker,
            platform.name(),
            platform.language(),
            packaging.join(", ")
        );

        if args.dependencies {
            for dependency in platform.main_dependencies() {
                println!("      {}", dependency);
            }
            for dependency in platform.test_dependencies() {
                println!("      test {}", dependency);
            }
        }
    }
    Ok(())
}
