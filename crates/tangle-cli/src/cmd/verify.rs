//! `tangle verify <id>`: check whether a component looks recovered.

use std::io::Write;
use std::path::Path;

use clap::Args;
use tangle_core::RecoveryCheck;

use crate::output::{OutputMode, join_or_dash, render};

/// Arguments for `tangle verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Component id.
    pub id: String,
}

/// Execute `tangle verify`.
pub fn run_verify(args: &VerifyArgs, output: OutputMode, graph_path: &Path) -> anyhow::Result<()> {
    let engine = super::load_engine(graph_path, output)?;
    let check = super::query(output, engine.verify_recovery(&args.id))?;
    render(output, &check, render_verify_human)
}

fn render_verify_human(check: &RecoveryCheck, w: &mut dyn Write) -> std::io::Result<()> {
    if check.recovered {
        writeln!(w, "✓ {} recovered", check.component)?;
        return Ok(());
    }

    writeln!(w, "✗ {} not recovered", check.component)?;
    writeln!(w, "  health:   {}", check.health.status)?;
    for issue in &check.health.issues {
        writeln!(w, "    - {issue}")?;
    }
    if !check.dependencies_ready {
        writeln!(w, "  blocking: {}", join_or_dash(&check.blocking))?;
    }
    Ok(())
}
