//! Command-line driver: runs one simulation and renders both feeds as text.
//!
//! Configuration comes from a JSON file given as the first argument, or else
//! from `SCHED_SIM_*` environment variables (a `.env` file is honoured).
//! `RUST_LOG` controls log verbosity.

use std::fmt::Write as _;

use anyhow::Context;
use prometheus_sched_sim::builders::build_simulation;
use prometheus_sched_sim::config::SimConfig;
use prometheus_sched_sim::core::{AppResult, ShutdownSignal};
use prometheus_sched_sim::infra::{ColumnLayout, TableSnapshot, TimelineSnapshot};
use prometheus_sched_sim::runtime::{spawn_consumer, PollExit, SnapshotConsumer};
use prometheus_sched_sim::util::init_tracing;

struct TablePrinter {
    layout: ColumnLayout,
}

impl SnapshotConsumer<TableSnapshot> for TablePrinter {
    fn render(&mut self, snapshot: TableSnapshot) {
        let mut out = format!("-- table #{} --\n", snapshot.seq);
        let _ = writeln!(out, "{}", format_line(self.layout.headers()));
        for row in &snapshot.rows {
            let _ = writeln!(out, "{}", format_line(row.cells(&self.layout)));
        }
        print!("{out}");
    }

    fn complete(&mut self) {
        println!("-- table complete --");
    }
}

fn format_line<S: AsRef<str>>(cells: impl IntoIterator<Item = S>) -> String {
    cells
        .into_iter()
        .map(|c| format!("{:>11}", c.as_ref()))
        .collect::<Vec<_>>()
        .join("")
}

struct TimelinePrinter;

impl SnapshotConsumer<TimelineSnapshot> for TimelinePrinter {
    fn render(&mut self, snapshot: TimelineSnapshot) {
        let mut out = format!("-- timeline #{} --\n", snapshot.seq);
        for bar in snapshot.bars() {
            let offset = usize::try_from(bar.start).unwrap_or(usize::MAX).min(200);
            let width = usize::try_from(bar.length).unwrap_or(usize::MAX).min(200);
            let end = bar.end_label.map(|e| e.to_string()).unwrap_or_default();
            let _ = writeln!(
                out,
                "{:<10}|{}{} {end}",
                bar.label,
                " ".repeat(offset),
                "#".repeat(width)
            );
        }
        print!("{out}");
    }

    fn complete(&mut self) {
        println!("-- timeline complete --");
    }
}

fn load_config() -> AppResult<SimConfig> {
    if let Some(path) = std::env::args().nth(1) {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config file {path}"))?;
        return SimConfig::from_json_str(&raw).map_err(|e| anyhow::anyhow!("{path}: {e}"));
    }
    SimConfig::from_env().map_err(|e| anyhow::anyhow!(e))
}

fn main() -> AppResult<()> {
    init_tracing();
    let config = load_config()?;
    let poll_interval = config.clock().duration(config.poll_interval);

    let simulation = build_simulation(&config)?;
    let ui_shutdown = ShutdownSignal::new();
    let table = spawn_consumer(
        "table-view",
        simulation.table_feed(),
        TablePrinter {
            layout: config.columns.clone(),
        },
        poll_interval,
        ui_shutdown.clone(),
    )?;
    let timeline = spawn_consumer(
        "timeline-view",
        simulation.timeline_feed(),
        TimelinePrinter,
        poll_interval,
        ui_shutdown.clone(),
    )?;

    let handle = simulation.start()?;
    let outcome = handle.join();
    if outcome.is_err() {
        ui_shutdown.cancel();
    }

    for (name, consumer) in [("table", table), ("timeline", timeline)] {
        match consumer.join() {
            Ok((PollExit::Complete, rendered)) => {
                tracing::debug!(consumer = name, rendered, "consumer finished");
            }
            Ok((exit, rendered)) => {
                tracing::warn!(consumer = name, ?exit, rendered, "consumer stopped early");
            }
            Err(_) => anyhow::bail!("{name} consumer panicked"),
        }
    }

    let summary = outcome?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
