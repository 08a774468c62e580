//! Event edge detector.
//!
//! Turns raw sensor and button edges into transition-table events and
//! forwards the outcome to a [StatusSink]. Debouncing is the signal
//! source's job: every call here is taken as one logical edge.

use crate::rendering::{indicator, Report, StatusSink};
use crate::timer::{Event, Phase, Stopwatch, Transition};

/// Which pin level means "object in front of the sensor"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorPolarity {
    /// IR modules pull their output low on detection
    #[default]
    ActiveLow,
    ActiveHigh,
}

impl SensorPolarity {
    /// param pin_high: raw level read from the sensor pin
    /// returns true if an object is present
    pub fn object_present(self, pin_high: bool) -> bool {
        match self {
            SensorPolarity::ActiveLow => !pin_high,
            SensorPolarity::ActiveHigh => pin_high,
        }
    }
}

/// How sensor edges map onto start/stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorPolicy {
    /// Present starts, absent stops, anything redundant is a no-op
    #[default]
    Level,
    /// Each present edge flips between start and stop, absent edges are ignored
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeDetector {
    policy: SensorPolicy,
}

impl EdgeDetector {
    pub const fn new(policy: SensorPolicy) -> EdgeDetector {
        Self { policy }
    }

    pub fn policy(&self) -> SensorPolicy {
        self.policy
    }

    /// Sensor changed level
    /// param timer: the stopwatch, held exclusively for the whole call
    /// param present: true if an object is now in front of the sensor
    /// param sink: receives at most one report and one indicator update
    pub fn on_sensor_edge<S>(
        &self,
        timer: &mut Stopwatch,
        present: bool,
        sink: &mut S,
    ) -> Transition
    where
        S: StatusSink + ?Sized,
    {
        let event = match (self.policy, present) {
            (SensorPolicy::Level, true) => Event::SensorPresent,
            (SensorPolicy::Level, false) => Event::SensorAbsent,
            (SensorPolicy::Toggle, true) => match timer.phase() {
                Phase::Idle => Event::SensorPresent,
                Phase::Running => Event::SensorAbsent,
            },
            (SensorPolicy::Toggle, false) => {
                trace!("toggle policy: absent edge ignored");
                return Transition::Ignored;
            }
        };
        apply(timer, event, sink)
    }

    /// Reset button pressed. Always wins, whatever the phase.
    pub fn on_button_edge<S>(&self, timer: &mut Stopwatch, sink: &mut S) -> Transition
    where
        S: StatusSink + ?Sized,
    {
        apply(timer, Event::Button, sink)
    }
}

/// Levels to replay for the edges latched since the last interrupt.
///
/// The current pin level only tells where the sensor ended up. When both
/// directions were latched a whole pulse happened in between, so the
/// opposite level is replayed first.
/// param rose: a rising edge was latched
/// param fell: a falling edge was latched
/// param present_now: object present at the current level
pub fn latched_levels(rose: bool, fell: bool, present_now: bool) -> impl Iterator<Item = bool> {
    [(!present_now, rose && fell), (present_now, rose || fell)]
        .into_iter()
        .filter_map(|(present, latched)| latched.then_some(present))
}

fn apply<S>(timer: &mut Stopwatch, event: Event, sink: &mut S) -> Transition
where
    S: StatusSink + ?Sized,
{
    let transition = timer.handle(event);
    if let Some(report) = Report::from_transition(transition) {
        debug!("{} -> {}", event, transition);
        sink.emit(report);
        sink.indicate(indicator(timer.phase()));
    }
    transition
}
