use std::time::Duration;

use crate::worker::JobReport;

/// Aggregate outcome of one scheduler run.
#[derive(Debug)]
pub struct RunSummary {
    /// Jobs submitted.
    pub total: usize,
    /// One report per job that was claimed, in queue order.
    pub reports: Vec<JobReport>,
    pub worker_panics: usize,
    /// Wall-clock time from first spawn to last join.
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.reports.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.completed()
    }

    /// Jobs never claimed (run cancelled) or lost to a panicking worker.
    pub fn unclaimed(&self) -> usize {
        self.total.saturating_sub(self.reports.len())
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    pub fn all_succeeded(&self) -> bool {
        self.completed() == self.total
    }

    pub fn bytes_in(&self) -> u64 {
        self.reports
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok())
            .map(|s| s.bytes_in)
            .sum()
    }

    pub fn bytes_out(&self) -> u64 {
        self.reports
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok())
            .map(|s| s.bytes_out)
            .sum()
    }
}
