//! Deferred status output.
//!
//! Interrupt handlers can't afford to wait on the UART, so reports are
//! parked here and written out by the foreground loop.

use heapless::Deque;

use crate::rendering::{Indicator, Report, StatusSink};

/// Bounded queue of pending reports plus the latest indicator state.
/// When full, the oldest report is dropped and counted.
pub struct Outbox<const N: usize> {
    reports: Deque<Report, N>,
    indicator: Option<Indicator>,
    lost: u32,
}

impl<const N: usize> Default for Outbox<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Outbox<N> {
    /// Starts with the idle indicator pending so the LEDs show
    /// something as soon as the foreground runs
    pub const fn new() -> Outbox<N> {
        Self {
            reports: Deque::new(),
            indicator: Some(Indicator::Inactive),
            lost: 0,
        }
    }

    pub fn pop(&mut self) -> Option<Report> {
        self.reports.pop_front()
    }

    /// Latest indicator state since the last call, if it changed
    pub fn take_indicator(&mut self) -> Option<Indicator> {
        self.indicator.take()
    }

    /// Reports dropped since the last call
    pub fn take_lost(&mut self) -> u32 {
        core::mem::take(&mut self.lost)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

impl<const N: usize> StatusSink for Outbox<N> {
    fn emit(&mut self, report: Report) {
        if let Err(report) = self.reports.push_back(report) {
            self.reports.pop_front();
            self.lost = self.lost.saturating_add(1);
            // there is room now
            let _ = self.reports.push_back(report);
        }
    }

    fn indicate(&mut self, indicator: Indicator) {
        // only the newest state matters to the LEDs
        self.indicator = Some(indicator);
    }
}
