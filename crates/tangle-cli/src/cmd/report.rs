//! `tangle report`: probe every component and classify overall health.

use std::io::Write;
use std::path::Path;

use clap::{Args, ValueEnum};
use tangle_core::{OverallHealth, SystemHealthReport};
use tracing::info;

use crate::output::{OutputMode, join_or_dash, pretty_kv, pretty_section, render_mode};

/// Classification threshold for a non-zero exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    /// Fail when DEGRADED or CRITICAL.
    Degraded,
    /// Fail only when CRITICAL.
    Critical,
}

impl FailOn {
    const fn level(self) -> OverallHealth {
        match self {
            Self::Degraded => OverallHealth::Degraded,
            Self::Critical => OverallHealth::Critical,
        }
    }

    /// `true` when `classification` is at or below this level.
    fn trips(self, classification: OverallHealth) -> bool {
        classification <= self.level()
    }
}

/// Arguments for `tangle report`.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Exit non-zero when the classification is at or below this level.
    #[arg(long, value_enum)]
    pub fail_on: Option<FailOn>,
}

/// Execute `tangle report`.
pub fn run_report(args: &ReportArgs, output: OutputMode, graph_path: &Path) -> anyhow::Result<()> {
    let engine = super::load_engine(graph_path, output)?;
    let report = engine.generate_report();

    render_mode(output, &report, render_report_text, render_report_pretty)?;

    if let Some(fail_on) = args.fail_on
        && fail_on.trips(report.classification)
    {
        info!(classification = %report.classification, "report failed threshold");
        anyhow::bail!(
            "system health is {} ({}/{} operational)",
            report.classification,
            report.operational_count,
            report.total_count
        );
    }
    Ok(())
}

fn render_report_text(report: &SystemHealthReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{} operational={}/{} ratio={:.2}",
        report.classification, report.operational_count, report.total_count, report.operational_ratio
    )?;
    for c in &report.components {
        let state = if c.operational {
            "ok"
        } else if !c.health.is_healthy() {
            "unhealthy"
        } else {
            "blocked"
        };
        writeln!(
            w,
            "{}  {state}  unsatisfied={}",
            c.id,
            join_or_dash(&c.validation.unsatisfied)
        )?;
    }
    writeln!(w, "blocking={}", join_or_dash(&report.blocking_dependencies))?;
    writeln!(w, "cascades={}", join_or_dash(&report.failure_cascades))?;
    for cycle in &report.cycles {
        writeln!(w, "cycle={}", cycle.join(" -> "))?;
    }
    Ok(())
}

fn render_report_pretty(report: &SystemHealthReport, w: &mut dyn Write) -> std::io::Result<()> {
    let icon = match report.classification {
        OverallHealth::Healthy => "✓",
        OverallHealth::Degraded => "⚠",
        OverallHealth::Critical => "✗",
    };
    pretty_section(w, &format!("{icon} System health: {}", report.classification))?;
    pretty_kv(
        w,
        "Operational",
        format!(
            "{}/{} ({:.0}%)",
            report.operational_count,
            report.total_count,
            report.operational_ratio * 100.0
        ),
    )?;
    pretty_kv(w, "Generated", report.timestamp.to_rfc3339())?;
    pretty_kv(w, "Graph", &report.graph_hash)?;

    writeln!(w)?;
    pretty_section(w, "Components")?;
    for c in &report.components {
        let mark = if c.operational { "✓" } else { "✗" };
        writeln!(w, "{mark} {}  [{}]", c.id, c.health.status)?;
        for issue in &c.health.issues {
            writeln!(w, "    issue: {issue}")?;
        }
        if !c.validation.can_execute {
            writeln!(
                w,
                "    blocked by: {}",
                join_or_dash(&c.validation.unsatisfied)
            )?;
        }
    }

    if !report.blocking_dependencies.is_empty() || !report.failure_cascades.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Impact")?;
        pretty_kv(w, "Blocking", join_or_dash(&report.blocking_dependencies))?;
        pretty_kv(w, "Cascades", join_or_dash(&report.failure_cascades))?;
    }

    if !report.cycles.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Cycles")?;
        for cycle in &report.cycles {
            writeln!(w, "  {}", cycle.join(" → "))?;
        }
    }
    Ok(())
}
