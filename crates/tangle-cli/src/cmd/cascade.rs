//! `tangle cascade <id>`: components voided when one fails.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;

use crate::output::{OutputMode, render};

/// Arguments for `tangle cascade`.
#[derive(Args, Debug)]
pub struct CascadeArgs {
    /// Component id.
    pub id: String,

    /// Follow the cascade to its fixed point instead of one hop.
    #[arg(long)]
    pub transitive: bool,
}

#[derive(Debug, Serialize)]
struct CascadeOutput {
    component: String,
    transitive: bool,
    impact: Vec<String>,
}

/// Execute `tangle cascade`.
pub fn run_cascade(args: &CascadeArgs, output: OutputMode, graph_path: &Path) -> anyhow::Result<()> {
    let engine = super::load_engine(graph_path, output)?;
    let impact = if args.transitive {
        super::query(output, engine.transitive_impact(&args.id))?
    } else {
        super::query(output, engine.cascade_impact(&args.id))?
    };

    let payload = CascadeOutput {
        component: args.id.clone(),
        transitive: args.transitive,
        impact,
    };
    render(output, &payload, render_cascade_human)
}

fn render_cascade_human(payload: &CascadeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.impact.is_empty() {
        writeln!(w, "No components affected by a failure of {}.", payload.component)?;
        return Ok(());
    }

    let scope = if payload.transitive { "transitive" } else { "direct" };
    writeln!(
        w,
        "Failure of {} affects {} component(s) ({scope}):",
        payload.component,
        payload.impact.len()
    )?;
    for id in &payload.impact {
        writeln!(w, "  - {id}")?;
    }
    Ok(())
}
