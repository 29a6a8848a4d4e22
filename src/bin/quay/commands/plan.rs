//! `quay plan` command

use anyhow::Result;

use crate::cli::PlanArgs;
use quay::ops::{format_plan, plan_project, PlanSummary};
use quay::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: PlanArgs) -> Result<()> {
    let project = ctx.load_project()?;
    let plan = plan_project(&project, &args.platforms)?;
    let summary = PlanSummary::new(&plan)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_plan(&summary));
    }
    Ok(())
}
