//! Timing state machine and tick source.
//!
//! [Stopwatch::handle] is the whole transition table: every other entry
//! point in the crate ends up here.
//!
//! The counter is a `u32` of milliseconds and wraps to zero after
//! `u32::MAX` ms (about 49.7 days). Durations longer than that are reported
//! modulo 2^32 ms.

pub const MS_PER_SECOND: u32 = 1_000;
pub const MS_PER_MINUTE: u32 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: u32 = 60 * MS_PER_MINUTE;

/// Absolute deadlines for the tick alarm, in timer microseconds.
///
/// Each deadline is the previous one plus the period, never "now" plus the
/// period, so interrupt latency shows up as jitter and not as drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickDeadline {
    next_us: u64,
    period_us: u64,
}

impl TickDeadline {
    /// First deadline one period after `now_us`
    pub const fn starting_at(now_us: u64, period_us: u32) -> TickDeadline {
        Self {
            next_us: now_us + period_us as u64,
            period_us: period_us as u64,
        }
    }

    pub fn next_us(&self) -> u64 {
        self.next_us
    }

    /// Moves on by exactly one period
    /// returns the new deadline
    pub fn advance(&mut self) -> u64 {
        self.next_us += self.period_us;
        self.next_us
    }

    /// Restarts the schedule from `now_us` after a deadline was missed
    /// returns the new deadline
    pub fn resync(&mut self, now_us: u64) -> u64 {
        self.next_us = now_us + self.period_us;
        self.next_us
    }
}

/// Whether the stopwatch is counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    #[default]
    Idle,
    Running,
}

/// Wall-clock style view of a millisecond count.
/// Hours wrap at 24, the rest at their natural unit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Breakdown {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub milliseconds: u16,
}

impl Breakdown {
    pub const ZERO: Breakdown = Breakdown {
        hours: 0,
        minutes: 0,
        seconds: 0,
        milliseconds: 0,
    };

    /// Splits a millisecond count into its display units
    /// param ms: elapsed milliseconds
    pub const fn from_millis(ms: u32) -> Breakdown {
        Breakdown {
            hours: ((ms / MS_PER_HOUR) % 24) as u8,
            minutes: ((ms / MS_PER_MINUTE) % 60) as u8,
            seconds: ((ms / MS_PER_SECOND) % 60) as u8,
            milliseconds: (ms % MS_PER_SECOND) as u16,
        }
    }
}

/// Inputs to the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    SensorPresent,
    SensorAbsent,
    Button,
    Tick,
}

/// What a single event did to the stopwatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Redundant event, nothing changed
    Ignored,
    Started,
    /// Carries the snapshot taken at the instant of stopping
    Stopped(Breakdown),
    Reset,
    Counted,
}

/// The canonical timer state. One instance lives for the whole program,
/// see [crate::shared::SharedTimer].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopwatch {
    phase: Phase,
    elapsed_ms: u32,
    last_duration: Breakdown,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub const fn new() -> Stopwatch {
        Self {
            phase: Phase::Idle,
            elapsed_ms: 0,
            last_duration: Breakdown::ZERO,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// Live breakdown of the counter
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::from_millis(self.elapsed_ms)
    }

    /// Snapshot taken at the most recent stop, zeroed by reset
    pub fn last_duration(&self) -> Breakdown {
        self.last_duration
    }

    /// Applies one event to the state
    /// param event: what happened
    /// returns the transition that was taken
    pub fn handle(&mut self, event: Event) -> Transition {
        match (self.phase, event) {
            (Phase::Idle, Event::SensorPresent) => {
                self.phase = Phase::Running;
                self.elapsed_ms = 0;
                Transition::Started
            }
            (Phase::Running, Event::SensorAbsent) => {
                self.phase = Phase::Idle;
                self.last_duration = Breakdown::from_millis(self.elapsed_ms);
                Transition::Stopped(self.last_duration)
            }
            (Phase::Idle, Event::SensorAbsent) | (Phase::Running, Event::SensorPresent) => {
                Transition::Ignored
            }
            (_, Event::Button) => {
                self.phase = Phase::Idle;
                self.elapsed_ms = 0;
                self.last_duration = Breakdown::ZERO;
                Transition::Reset
            }
            (Phase::Running, Event::Tick) => {
                self.elapsed_ms = self.elapsed_ms.wrapping_add(1);
                Transition::Counted
            }
            (Phase::Idle, Event::Tick) => Transition::Ignored,
        }
    }

    /// One tick of the 1 ms clock
    /// returns true if the counter moved
    pub fn tick(&mut self) -> bool {
        self.handle(Event::Tick) == Transition::Counted
    }

    #[cfg(test)]
    pub(crate) fn running_at(elapsed_ms: u32) -> Stopwatch {
        Self {
            phase: Phase::Running,
            elapsed_ms,
            last_duration: Breakdown::ZERO,
        }
    }
}
