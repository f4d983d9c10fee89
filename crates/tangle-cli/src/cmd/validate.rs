//! `tangle validate <id>`: check a component's direct dependencies.

use std::io::Write;
use std::path::Path;

use clap::Args;
use tangle_core::DependencyValidation;

use crate::output::{OutputMode, join_or_dash, render};

/// Arguments for `tangle validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Component id.
    pub id: String,
}

/// Execute `tangle validate`.
pub fn run_validate(
    args: &ValidateArgs,
    output: OutputMode,
    graph_path: &Path,
) -> anyhow::Result<()> {
    let engine = super::load_engine(graph_path, output)?;
    let validation = super::query(output, engine.validate(&args.id))?;
    render(output, &validation, render_validation_human)
}

fn render_validation_human(v: &DependencyValidation, w: &mut dyn Write) -> std::io::Result<()> {
    if v.can_execute {
        writeln!(w, "{}: can execute", v.component)?;
    } else {
        writeln!(w, "{}: blocked", v.component)?;
    }
    writeln!(w, "  satisfied:   {}", join_or_dash(&v.satisfied))?;
    writeln!(w, "  unsatisfied: {}", join_or_dash(&v.unsatisfied))?;
    if !v.can_execute {
        writeln!(w, "  cascade:     {}", join_or_dash(&v.cascade_impact))?;
    }
    Ok(())
}
