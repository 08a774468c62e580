//! End-to-end behaviour of the stopwatch through its public entry points:
//! edge handlers and ticks on one side, rendered status lines and the
//! indicator on the other.

use core::convert::Infallible;

use heapless::String;
use ir_stopwatch::config::TimerConfig;
use ir_stopwatch::foreground::Foreground;
use ir_stopwatch::rendering::{DurationStyle, Indicator, IndicatorDevice};
use ir_stopwatch::sensors::{EdgeDetector, SensorPolicy};
use ir_stopwatch::shared::SharedTimer;
use ir_stopwatch::timer::{Breakdown, Phase, Transition};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Default)]
struct Leds {
    current: Option<Indicator>,
    updates: usize,
}

impl IndicatorDevice for Leds {
    type Error = Infallible;

    fn show(&mut self, indicator: Indicator) -> Result<(), Infallible> {
        self.current = Some(indicator);
        self.updates += 1;
        Ok(())
    }
}

struct Rig {
    timer: SharedTimer<8>,
    foreground: Foreground,
    out: String<512>,
    leds: Leds,
}

impl Rig {
    fn new(config: TimerConfig) -> Rig {
        let mut rig = Rig {
            timer: SharedTimer::new(EdgeDetector::new(config.sensor_policy)),
            foreground: Foreground::new(config.duration_style),
            out: String::new(),
            leds: Leds::default(),
        };
        // boot pass: idle LED, no output
        rig.poll();
        rig
    }

    fn ticks(&self, n: u32) {
        for _ in 0..n {
            self.timer.tick();
        }
    }

    fn poll(&mut self) {
        self.foreground
            .poll(&self.timer, &mut self.out, &mut self.leds)
            .unwrap();
    }

    fn lines(&self) -> Vec<&str> {
        self.out.split_terminator("\r\n").collect()
    }
}

fn rig() -> Rig {
    Rig::new(TimerConfig::default())
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_ticks_increase_by_one_while_running() {
    let r = rig();
    r.timer.sensor_edge(true);
    let mut last = r.timer.snapshot().1;
    for _ in 0..5_000 {
        r.timer.tick();
        let (phase, now) = r.timer.snapshot();
        assert_eq!(phase, Phase::Running);
        assert_eq!(now, last + 1);
        last = now;
    }
}

#[test]
fn test_duplicate_present_edge_is_noop() {
    let mut r = rig();
    assert_eq!(r.timer.sensor_edge(true), Transition::Started);
    r.ticks(3);
    assert_eq!(r.timer.sensor_edge(true), Transition::Ignored);
    r.poll();

    assert_eq!(r.lines(), vec!["Object Detected - Timing Started"]);
    assert_eq!(r.timer.snapshot(), (Phase::Running, 3));
}

#[test]
fn test_button_resets_from_every_state() {
    // idle, running, stopped
    let setups: [fn(&Rig); 3] = [
        |_| {},
        |r| {
            r.timer.sensor_edge(true);
            r.ticks(17);
        },
        |r| {
            r.timer.sensor_edge(true);
            r.ticks(17);
            r.timer.sensor_edge(false);
        },
    ];

    for setup in setups {
        let mut r = rig();
        setup(&r);
        assert_eq!(r.timer.button_edge(), Transition::Reset);
        r.poll();
        assert_eq!(r.timer.snapshot(), (Phase::Idle, 0));
        assert_eq!(r.lines().last(), Some(&"Timer Reset"));
        assert_eq!(r.leds.current, Some(Indicator::Inactive));
    }
}

#[test]
fn test_round_trip_reports_exact_duration() {
    let mut r = rig();
    r.timer.sensor_edge(true);
    r.ticks(65_432);
    assert_eq!(
        r.timer.sensor_edge(false),
        Transition::Stopped(Breakdown {
            hours: 0,
            minutes: 1,
            seconds: 5,
            milliseconds: 432,
        })
    );
    r.poll();

    assert_eq!(r.timer.snapshot().0, Phase::Idle);
    assert_eq!(r.lines()[1], "Timing Duration: 1 min 5 sec 432 ms");
}

#[test]
fn test_idle_ticks_leave_counter_at_zero() {
    let r = rig();
    r.ticks(10_000);
    assert_eq!(r.timer.snapshot(), (Phase::Idle, 0));
    assert_eq!(r.timer.elapsed_relaxed(), 0);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_short_pass() {
    let mut r = rig();
    r.timer.sensor_edge(true);
    r.ticks(5);
    r.timer.sensor_edge(false);
    r.poll();

    assert_eq!(
        r.lines(),
        vec![
            "Object Detected - Timing Started",
            "Timing Duration: 0 min 0 sec 5 ms",
        ]
    );
    assert_eq!(r.leds.current, Some(Indicator::Inactive));
}

#[test]
fn test_scenario_reset_long_run() {
    let mut r = rig();
    r.timer.sensor_edge(true);
    r.ticks(3_661_000);
    r.poll();
    assert_eq!(
        r.foreground.display(),
        Breakdown {
            hours: 1,
            minutes: 1,
            seconds: 1,
            milliseconds: 0,
        }
    );

    r.timer.button_edge();
    r.poll();

    assert_eq!(r.lines(), vec!["Object Detected - Timing Started", "Timer Reset"]);
    assert_eq!(r.timer.snapshot(), (Phase::Idle, 0));
    assert_eq!(r.foreground.display(), Breakdown::ZERO);
}

#[test]
fn test_scenario_absent_without_present() {
    let mut r = rig();
    let updates = r.leds.updates;
    assert_eq!(r.timer.sensor_edge(false), Transition::Ignored);
    r.poll();

    assert!(r.out.is_empty());
    assert_eq!(r.leds.updates, updates);
    assert_eq!(r.timer.snapshot(), (Phase::Idle, 0));
}

// ============================================================================
// Configuration variants
// ============================================================================

#[test]
fn test_compact_style_and_toggle_policy() {
    let mut r = Rig::new(TimerConfig {
        sensor_policy: SensorPolicy::Toggle,
        duration_style: DurationStyle::Compact,
        ..TimerConfig::default()
    });

    r.timer.sensor_edge(true);
    r.ticks(2_005);
    r.timer.sensor_edge(false);
    r.ticks(2_000);
    r.timer.sensor_edge(true);
    r.poll();

    assert_eq!(
        r.lines(),
        vec!["Object Detected - Timing Started", "Timing Duration: 4 sec 5 ms"]
    );
}

#[test]
fn test_indicator_tracks_phase() {
    let mut r = rig();
    assert_eq!(r.leds.current, Some(Indicator::Inactive));

    r.timer.sensor_edge(true);
    r.poll();
    assert_eq!(r.leds.current, Some(Indicator::Active));

    r.timer.sensor_edge(false);
    r.poll();
    assert_eq!(r.leds.current, Some(Indicator::Inactive));
}
