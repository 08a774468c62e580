use crate::rendering::DurationStyle;
use crate::sensors::{SensorPolarity, SensorPolicy};

/// Period of the tick interrupt. The counter assumes one tick per millisecond.
pub const TICK_PERIOD_US: u32 = 1_000;

/// Reports that can wait in the outbox before the oldest is dropped
pub const REPORT_QUEUE_LEN: usize = 8;

/// Build-time settings for the stopwatch.
/// sensor_polarity: pin level that means an object is present
/// sensor_policy: level-driven or toggle start/stop
/// duration_style: how stop lines print their duration
/// baud_rate: status UART speed, 8N1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    pub sensor_polarity: SensorPolarity,
    pub sensor_policy: SensorPolicy,
    pub duration_style: DurationStyle,
    pub baud_rate: u32,
}

impl TimerConfig {
    pub const DEFAULT: TimerConfig = TimerConfig {
        sensor_polarity: SensorPolarity::ActiveLow,
        sensor_policy: SensorPolicy::Level,
        duration_style: DurationStyle::Full,
        baud_rate: 9_600,
    };
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
