//! Progress reporting while filling the canvas.

use std::time::{Duration, Instant};

/// Stores report state.
pub enum ReportState {
    /// Nothing to track.
    None,
    /// Rows finished at the last report.
    Row(u32),
    /// When the last report happened.
    Duration(Instant),
}

/// Specifies when to report progress while filling rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Report {
    /// Never report.
    #[default]
    None,
    /// Report every time N more rows are finished.
    Row(u32),
    /// Report at most once per duration.
    Duration(Duration),
}

impl Report {
    /// Gets the start state of reporting.
    pub fn start(&self) -> ReportState {
        match self {
            Report::None => ReportState::None,
            Report::Row(_) => ReportState::Row(0),
            Report::Duration(_) => ReportState::Duration(Instant::now()),
        }
    }

    /// Takes the number of finished rows and returns `true` if it is time to report.
    pub fn update(&self, state: &mut ReportState, rows: u32) -> bool {
        match (self, state) {
            (Report::Row(n), ReportState::Row(last)) => {
                if rows >= last.saturating_add(*n) {
                    *last = rows;
                    true
                } else {false}
            }
            (Report::Duration(dur), ReportState::Duration(last)) => {
                let now = Instant::now();
                if now >= *last + *dur {
                    *last = now;
                    true
                } else {false}
            }
            _ => false,
        }
    }

    /// Picks a row interval that reports about `steps` times for `rows` rows.
    pub fn steps(rows: u32, steps: u32) -> Report {
        Report::Row((rows / steps.max(1)).max(1))
    }
}
