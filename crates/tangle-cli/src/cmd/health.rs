//! `tangle health <id>`: run one component's own probe.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;
use tangle_core::HealthResult;

use crate::output::{OutputMode, render};

/// Arguments for `tangle health`.
#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Component id.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct HealthOutput {
    component: String,
    #[serde(flatten)]
    result: HealthResult,
}

/// Execute `tangle health`.
pub fn run_health(args: &HealthArgs, output: OutputMode, graph_path: &Path) -> anyhow::Result<()> {
    let engine = super::load_engine(graph_path, output)?;
    let result = super::query(output, engine.health(&args.id))?;
    let payload = HealthOutput {
        component: args.id.clone(),
        result,
    };
    render(output, &payload, render_health_human)
}

fn render_health_human(payload: &HealthOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}: {}", payload.component, payload.result.status)?;
    for issue in &payload.result.issues {
        writeln!(w, "  - {issue}")?;
    }
    Ok(())
}
