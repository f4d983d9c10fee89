//! `tangle cycles`: list dependency cycles.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;

use crate::output::{OutputMode, render};

/// Arguments for `tangle cycles`.
#[derive(Args, Debug, Default)]
pub struct CyclesArgs {}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    cycles: Vec<Vec<String>>,
}

/// Execute `tangle cycles`.
pub fn run_cycles(_args: &CyclesArgs, output: OutputMode, graph_path: &Path) -> anyhow::Result<()> {
    let engine = super::load_engine(graph_path, output)?;
    let payload = CyclesOutput {
        cycles: engine.find_cycles(),
    };
    render(output, &payload, render_cycles_human)
}

fn render_cycles_human(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.cycles.is_empty() {
        writeln!(w, "No dependency cycles found.")?;
        return Ok(());
    }

    writeln!(w, "Dependency cycles ({})", payload.cycles.len())?;

    for (idx, cycle) in payload.cycles.iter().enumerate() {
        writeln!(w, "\nCycle {}:", idx + 1)?;
        writeln!(w, "  {}", cycle.join(" → "))?;
    }

    Ok(())
}
