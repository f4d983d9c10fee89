//! `tangle check`: validate the graph definition without probing anything.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;
use tangle_core::ComponentSummary;

use crate::output::{OutputMode, join_or_dash, pretty_kv, pretty_section, render_mode};

/// Arguments for `tangle check`.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {}

#[derive(Debug, Serialize)]
struct CheckOutput {
    graph: String,
    content_hash: String,
    component_count: usize,
    dependency_count: usize,
    components: Vec<ComponentSummary>,
    cycles: Vec<Vec<String>>,
}

/// Execute `tangle check`.
pub fn run_check(_args: &CheckArgs, output: OutputMode, graph_path: &Path) -> anyhow::Result<()> {
    let engine = super::load_engine(graph_path, output)?;

    let components = engine.components();
    let payload = CheckOutput {
        graph: graph_path.display().to_string(),
        content_hash: engine.content_hash().to_string(),
        component_count: components.len(),
        dependency_count: engine.graph().edge_count(),
        components,
        cycles: engine.find_cycles(),
    };

    render_mode(output, &payload, render_check_text, render_check_pretty)
}

fn render_check_text(payload: &CheckOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "ok {} components={} dependencies={} cycles={} hash={}",
        payload.graph,
        payload.component_count,
        payload.dependency_count,
        payload.cycles.len(),
        payload.content_hash
    )?;
    for c in &payload.components {
        writeln!(w, "{}  depends_on={}", c.id, join_or_dash(&c.depends_on))?;
    }
    Ok(())
}

fn render_check_pretty(payload: &CheckOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Graph {}", payload.graph))?;
    pretty_kv(w, "Components", payload.component_count.to_string())?;
    pretty_kv(w, "Dependencies", payload.dependency_count.to_string())?;
    pretty_kv(w, "Hash", &payload.content_hash)?;

    writeln!(w)?;
    pretty_section(w, "Components")?;
    for c in &payload.components {
        match &c.description {
            Some(description) => writeln!(w, "{}  ({description})", c.id)?,
            None => writeln!(w, "{}", c.id)?,
        }
        writeln!(w, "  depends on: {}", join_or_dash(&c.depends_on))?;
        writeln!(w, "  enables:    {}", join_or_dash(&c.enables))?;
        if c.cascade_override {
            writeln!(w, "  cascade:    override")?;
        }
    }

    if !payload.cycles.is_empty() {
        writeln!(w)?;
        writeln!(w, "⚠ {} dependency cycle(s); run `tangle cycles`", payload.cycles.len())?;
    }
    Ok(())
}
