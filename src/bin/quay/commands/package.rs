//! `quay package` command

use anyhow::{bail, Result};

use crate::cli::PackageArgs;
use quay::ops::{package, PackageOptions};
use quay::util::diagnostic::{emit, suggestions, Diagnostic};
use quay::util::fs::display_path;
use quay::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: PackageArgs) -> Result<()> {
    let project = ctx.load_project()?;

    let opts = PackageOptions {
        platforms: args.platforms,
        jobs: args.jobs,
    };
    let result = package(&project, &opts)?;
    let report = &result.report;

    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        for artifact in &report.produced {
            eprintln!(
                "    Packaged {} ({})",
                display_path(&project.root, &artifact.path).display(),
                artifact.task
            );
        }
        for skipped in &report.skipped {
            eprintln!("     Skipped {} (`{}` failed)", skipped.task, skipped.cause);
        }
    }

    if report.is_success() {
        return Ok(());
    }

    for failure in &report.failed {
        let diagnostic = failure
            .diagnostic
            .clone()
            .unwrap_or_else(|| Diagnostic::error(failure.message.clone()))
            .with_context(format!("in task `{}`", failure.task));
        emit(&diagnostic, ctx.color());
    }
    emit(
        &Diagnostic::warning(format!(
            "{} task(s) failed, {} skipped",
            report.failed.len(),
            report.skipped.len()
        ))
        .with_suggestion(suggestions::PACKAGE_FAILED),
        ctx.color(),
    );
    bail!("packaging failed");
}
