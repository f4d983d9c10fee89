//! `tangle recovery [ids...]`: order failed components for restoration.
//!
//! With no ids, the failed set is every component whose own probe currently
//! reports unhealthy.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;

use crate::output::{OutputMode, render};

/// Arguments for `tangle recovery`.
#[derive(Args, Debug, Default)]
pub struct RecoveryArgs {
    /// Failed component ids. Defaults to the currently unhealthy components.
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RecoveryOutput {
    failed: Vec<String>,
    order: Vec<String>,
}

/// Execute `tangle recovery`.
pub fn run_recovery(
    args: &RecoveryArgs,
    output: OutputMode,
    graph_path: &Path,
) -> anyhow::Result<()> {
    let engine = super::load_engine(graph_path, output)?;

    let failed = if args.ids.is_empty() {
        engine.generate_report().unhealthy_components()
    } else {
        args.ids.clone()
    };
    let order = super::query(output, engine.recovery_order(&failed))?;

    render(output, &RecoveryOutput { failed, order }, render_recovery_human)
}

fn render_recovery_human(payload: &RecoveryOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.order.is_empty() {
        writeln!(w, "Nothing to recover.")?;
        return Ok(());
    }

    writeln!(w, "Recovery order:")?;
    for (step, id) in payload.order.iter().enumerate() {
        writeln!(w, "  {}. {id}", step + 1)?;
    }
    Ok(())
}
