//! Subcommand implementations.

use anyhow::{Result, bail};
use tracing::info_span;

use gantry_cli::manifest::PipelineManifest;

use crate::cli::{CheckArgs, PlanArgs};
use crate::summary::print_plan;

pub fn run_plan(args: &PlanArgs) -> Result<()> {
    let span = info_span!("plan", manifest = %args.manifest.display());
    let _guard = span.enter();
    let manifest = PipelineManifest::load(&args.manifest)?;
    let mut workflows = manifest.build_workflows()?;
    if let Some(name) = args.workflow.as_deref() {
        workflows.retain(|workflow| workflow.name() == name);
        if workflows.is_empty() {
            bail!("no workflow named {name:?} in the manifest");
        }
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&workflows)?);
    } else {
        print_plan(&workflows);
    }
    Ok(())
}

pub fn run_check(args: &CheckArgs) -> Result<()> {
    let span = info_span!("check", manifest = %args.manifest.display());
    let _guard = span.enter();
    let manifest = PipelineManifest::load(&args.manifest)?;
    let workflows = manifest.build_workflows()?;
    let tasks: usize = workflows
        .iter()
        .map(|workflow| workflow.nodes().len())
        .sum();
    println!("Manifest: {}", args.manifest.display());
    println!(
        "Valid: {} workflows, {} tasks, {} connections",
        workflows.len(),
        tasks,
        manifest.connections.len()
    );
    Ok(())
}
