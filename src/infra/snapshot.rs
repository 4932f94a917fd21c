//! Immutable snapshot payloads handed to consumers.
//!
//! Two shapes of the same logical state: row-oriented for the table view
//! and process-oriented for the timeline view. Both are deep copies built
//! from one registry read, so consumers never see a half-updated process.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::process::{Process, ProcessId, ProcessState};

/// A column of the table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Process id.
    Id,
    /// Arrival time.
    Arrival,
    /// Burst.
    Burst,
    /// Priority.
    Priority,
    /// Start time, empty until dispatched.
    Start,
    /// Finish time, empty until dispatched.
    Finish,
    /// Turnaround time, empty until dispatched.
    Turnaround,
    /// Wait time, empty until dispatched.
    Wait,
    /// Lifecycle state.
    State,
}

impl Column {
    /// Every column, in the default order.
    pub const ALL: [Self; 9] = [
        Self::Id,
        Self::Arrival,
        Self::Burst,
        Self::Priority,
        Self::Start,
        Self::Finish,
        Self::Turnaround,
        Self::Wait,
        Self::State,
    ];

    /// Machine key, as accepted by `FromStr`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Arrival => "arrival",
            Self::Burst => "burst",
            Self::Priority => "priority",
            Self::Start => "start",
            Self::Finish => "finish",
            Self::Turnaround => "turnaround",
            Self::Wait => "wait",
            Self::State => "state",
        }
    }

    /// Human header.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Id => "Process",
            Self::Arrival => "Arrival",
            Self::Burst => "Burst",
            Self::Priority => "Priority",
            Self::Start => "Start",
            Self::Finish => "Finish",
            Self::Turnaround => "Turnaround",
            Self::Wait => "Wait",
            Self::State => "State",
        }
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown column `{s}`"))
    }
}

/// Ordered set of columns rendered by the table view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnLayout {
    columns: Vec<Column>,
}

impl ColumnLayout {
    /// Layout from an explicit column list.
    #[must_use]
    pub const fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Order used by the first iteration of the demo: timings before priority.
    #[must_use]
    pub fn legacy() -> Self {
        Self::new(vec![
            Column::Id,
            Column::Arrival,
            Column::Burst,
            Column::Start,
            Column::Finish,
            Column::Turnaround,
            Column::Wait,
            Column::Priority,
            Column::State,
        ])
    }

    /// Columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Header labels in display order.
    #[must_use]
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header()).collect()
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new(Column::ALL.to_vec())
    }
}

/// One row of the table view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Process id.
    pub id: ProcessId,
    /// Arrival time.
    pub arrival_time: u64,
    /// Burst.
    pub burst: u64,
    /// Priority.
    pub priority: u8,
    /// Start time, if dispatched.
    pub start_time: Option<u64>,
    /// Finish time, if dispatched.
    pub finish_time: Option<u64>,
    /// Turnaround time, if dispatched.
    pub turnaround_time: Option<u64>,
    /// Wait time, if dispatched.
    pub wait_time: Option<u64>,
    /// Lifecycle state.
    pub state: ProcessState,
}

impl From<&Process> for TableRow {
    fn from(p: &Process) -> Self {
        let timings = p.timings();
        Self {
            id: p.id(),
            arrival_time: p.arrival_time(),
            burst: p.burst(),
            priority: p.priority(),
            start_time: timings.map(|t| t.start_time),
            finish_time: timings.map(|t| t.finish_time),
            turnaround_time: timings.map(|t| t.turnaround_time),
            wait_time: timings.map(|t| t.wait_time),
            state: p.state(),
        }
    }
}

impl TableRow {
    /// Render one cell; unset timings render as an empty string.
    #[must_use]
    pub fn cell(&self, column: Column) -> String {
        fn opt(v: Option<u64>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }
        match column {
            Column::Id => self.id.to_string(),
            Column::Arrival => self.arrival_time.to_string(),
            Column::Burst => self.burst.to_string(),
            Column::Priority => self.priority.to_string(),
            Column::Start => opt(self.start_time),
            Column::Finish => opt(self.finish_time),
            Column::Turnaround => opt(self.turnaround_time),
            Column::Wait => opt(self.wait_time),
            Column::State => self.state.to_string(),
        }
    }

    /// Render every cell of `layout`, in order.
    #[must_use]
    pub fn cells(&self, layout: &ColumnLayout) -> Vec<String> {
        layout.columns().iter().map(|&c| self.cell(c)).collect()
    }
}

/// Row-set snapshot for the table consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Publication sequence number, shared with the matching timeline snapshot.
    pub seq: u64,
    /// Rows in scheduling order.
    pub rows: Vec<TableRow>,
}

impl TableSnapshot {
    /// Build from processes already in scheduling order.
    #[must_use]
    pub fn new(seq: u64, processes: &[Process]) -> Self {
        Self {
            seq,
            rows: processes.iter().map(TableRow::from).collect(),
        }
    }
}

/// One horizontal bar of the timeline view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBar {
    /// `"<id> (P<priority>)"`.
    pub label: String,
    /// Bar origin: start time, or 0 if not yet dispatched.
    pub start: u64,
    /// Bar length: the burst.
    pub length: u64,
    /// Label drawn at the bar end: finish time, if dispatched.
    pub end_label: Option<u64>,
}

/// Process-list snapshot for the timeline consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineSnapshot {
    /// Publication sequence number, shared with the matching table snapshot.
    pub seq: u64,
    /// Processes in scheduling order.
    pub processes: Vec<Process>,
}

impl TimelineSnapshot {
    /// Build from processes already in scheduling order.
    #[must_use]
    pub fn new(seq: u64, processes: &[Process]) -> Self {
        Self {
            seq,
            processes: processes.to_vec(),
        }
    }

    /// One bar per process, same order.
    #[must_use]
    pub fn bars(&self) -> Vec<TimelineBar> {
        self.processes
            .iter()
            .map(|p| {
                let timings = p.timings();
                TimelineBar {
                    label: format!("{} (P{})", p.id(), p.priority()),
                    start: timings.map_or(0, |t| t.start_time),
                    length: p.burst(),
                    end_label: timings.map(|t| t.finish_time),
                }
            })
            .collect()
    }
}

impl fmt::Display for TimelineBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}+{}]", self.label, self.start, self.length)?;
        if let Some(end) = self.end_label {
            write!(f, " -> {end}")?;
        }
        Ok(())
    }
}
