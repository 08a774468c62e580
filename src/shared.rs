//! The one piece of state shared between interrupt handlers and the
//! foreground loop.
//!
//! Every mutation runs inside `critical_section::with`, so a tick can never
//! land halfway through a start, stop or reset. The foreground display
//! reads a relaxed atomic copy of the counter instead and may be a tick
//! behind. That copy only uses load/store, which thumbv6m supports.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::{CriticalSection, Mutex};

use crate::outbox::Outbox;
use crate::rendering::{Indicator, Report};
use crate::sensors::EdgeDetector;
use crate::timer::{Phase, Stopwatch, Transition};

struct Inner<const N: usize> {
    timer: Stopwatch,
    outbox: Outbox<N>,
}

/// Stopwatch, edge detector and report outbox behind one critical section.
/// Meant to live in a `static`.
pub struct SharedTimer<const N: usize> {
    inner: Mutex<RefCell<Inner<N>>>,
    detector: EdgeDetector,
    elapsed: AtomicU32,
}

impl<const N: usize> SharedTimer<N> {
    pub const fn new(detector: EdgeDetector) -> SharedTimer<N> {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                timer: Stopwatch::new(),
                outbox: Outbox::new(),
            })),
            detector,
            elapsed: AtomicU32::new(0),
        }
    }

    /// Tick handler body. Bounded, never formats or queues anything.
    pub fn tick(&self) {
        critical_section::with(|cs| self.tick_in(cs));
    }

    /// Same as [SharedTimer::tick] for callers already inside a critical section
    pub fn tick_in(&self, cs: CriticalSection) {
        let mut inner = self.inner.borrow_ref_mut(cs);
        if inner.timer.tick() {
            self.elapsed.store(inner.timer.elapsed_ms(), Ordering::Relaxed);
        }
    }

    pub fn sensor_edge(&self, present: bool) -> Transition {
        critical_section::with(|cs| self.sensor_edge_in(cs, present))
    }

    pub fn sensor_edge_in(&self, cs: CriticalSection, present: bool) -> Transition {
        let mut inner = self.inner.borrow_ref_mut(cs);
        let Inner { timer, outbox } = &mut *inner;
        let transition = self.detector.on_sensor_edge(timer, present, outbox);
        self.elapsed.store(timer.elapsed_ms(), Ordering::Relaxed);
        transition
    }

    pub fn button_edge(&self) -> Transition {
        critical_section::with(|cs| self.button_edge_in(cs))
    }

    pub fn button_edge_in(&self, cs: CriticalSection) -> Transition {
        let mut inner = self.inner.borrow_ref_mut(cs);
        let Inner { timer, outbox } = &mut *inner;
        let transition = self.detector.on_button_edge(timer, outbox);
        self.elapsed.store(timer.elapsed_ms(), Ordering::Relaxed);
        transition
    }

    /// Approximate counter for display, may lag by one tick
    pub fn elapsed_relaxed(&self) -> u32 {
        self.elapsed.load(Ordering::Relaxed)
    }

    /// Exact phase and counter, read together
    pub fn snapshot(&self) -> (Phase, u32) {
        critical_section::with(|cs| {
            let inner = self.inner.borrow_ref(cs);
            (inner.timer.phase(), inner.timer.elapsed_ms())
        })
    }

    /// Copy of the whole stopwatch, mostly useful for inspection
    pub fn stopwatch(&self) -> Stopwatch {
        critical_section::with(|cs| self.inner.borrow_ref(cs).timer.clone())
    }

    /// Oldest queued report. Takes the critical section only for the pop
    /// so writing it out doesn't hold off interrupts.
    pub fn next_report(&self) -> Option<Report> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).outbox.pop())
    }

    pub fn take_indicator(&self) -> Option<Indicator> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).outbox.take_indicator())
    }

    pub fn take_lost_reports(&self) -> u32 {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).outbox.take_lost())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorPolicy;
    use crate::timer::Breakdown;

    fn shared() -> SharedTimer<4> {
        SharedTimer::new(EdgeDetector::new(SensorPolicy::Level))
    }

    #[test]
    fn mirror_tracks_counter() {
        let t = shared();
        t.sensor_edge(true);
        for _ in 0..42 {
            t.tick();
        }
        assert_eq!(t.elapsed_relaxed(), 42);
        assert_eq!(t.snapshot(), (Phase::Running, 42));

        t.button_edge();
        assert_eq!(t.elapsed_relaxed(), 0);
        assert_eq!(t.snapshot(), (Phase::Idle, 0));
    }

    #[test]
    fn restart_zeroes_mirror() {
        let t = shared();
        t.sensor_edge(true);
        t.tick();
        t.sensor_edge(false);
        assert_eq!(t.elapsed_relaxed(), 1);
        t.sensor_edge(true);
        assert_eq!(t.elapsed_relaxed(), 0);
    }

    #[test]
    fn reports_queue_in_transition_order() {
        let t = shared();
        assert_eq!(t.take_indicator(), Some(Indicator::Inactive));

        t.sensor_edge(true);
        t.tick();
        t.tick();
        t.sensor_edge(false);
        t.button_edge();

        assert_eq!(t.next_report(), Some(Report::Started));
        assert_eq!(t.next_report(), Some(Report::Stopped(Breakdown::from_millis(2))));
        assert_eq!(t.next_report(), Some(Report::Reset));
        assert_eq!(t.next_report(), None);
        assert_eq!(t.take_indicator(), Some(Indicator::Inactive));
        assert_eq!(t.take_lost_reports(), 0);
    }

    #[test]
    fn ticks_never_queue_reports() {
        let t = shared();
        t.take_indicator();
        t.sensor_edge(true);
        t.next_report();
        t.take_indicator();
        for _ in 0..100 {
            t.tick();
        }
        assert_eq!(t.next_report(), None);
        assert_eq!(t.take_indicator(), None);
    }

    #[test]
    fn outbox_overflow_never_touches_state() {
        let t: SharedTimer<2> = SharedTimer::new(EdgeDetector::default());
        for ms in 1..=3 {
            t.sensor_edge(true);
            for _ in 0..ms {
                t.tick();
            }
            t.sensor_edge(false);
        }
        t.sensor_edge(true);
        t.tick();

        // seven reports into two slots: the five oldest lines are gone, the state is not
        assert_eq!(t.snapshot(), (Phase::Running, 1));
        assert_eq!(t.stopwatch().last_duration(), Breakdown::from_millis(3));
        assert_eq!(t.take_lost_reports(), 5);
        assert_eq!(t.next_report(), Some(Report::Stopped(Breakdown::from_millis(3))));
        assert_eq!(t.next_report(), Some(Report::Started));
        assert_eq!(t.next_report(), None);
        assert_eq!(t.take_indicator(), Some(Indicator::Active));
    }

    #[test]
    fn in_section_variants_compose() {
        let t = shared();
        critical_section::with(|cs| {
            t.sensor_edge_in(cs, true);
            t.tick_in(cs);
            t.tick_in(cs);
            t.button_edge_in(cs);
        });
        assert_eq!(t.stopwatch(), Stopwatch::new());
    }
}
