use embedded_hal::digital::OutputPin;
use ufmt::{uWrite, uwrite};

use crate::timer::{Breakdown, Phase, Transition};

const STARTED: &str = "Object Detected - Timing Started";
const DURATION: &str = "Timing Duration:";
const RESET: &str = "Timer Reset";
const EOL: &str = "\r\n";

/// A status line waiting to be written, in structured form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    Started,
    Stopped(Breakdown),
    Reset,
}

impl Report {
    /// Maps a transition to the report it produces, if any
    pub fn from_transition(transition: Transition) -> Option<Report> {
        match transition {
            Transition::Started => Some(Report::Started),
            Transition::Stopped(duration) => Some(Report::Stopped(duration)),
            Transition::Reset => Some(Report::Reset),
            Transition::Ignored | Transition::Counted => None,
        }
    }
}

/// Status LED state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    Inactive,
    Active,
}

/// The indicator only ever depends on the phase
pub fn indicator(phase: Phase) -> Indicator {
    match phase {
        Phase::Idle => Indicator::Inactive,
        Phase::Running => Indicator::Active,
    }
}

/// How the stop line prints its duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DurationStyle {
    /// Always "M min S sec N ms"
    #[default]
    Full,
    /// Leading zero units are dropped, "N ms" is always kept
    Compact,
}

/// Receiver for whatever the edge detector wants to tell the outside world
pub trait StatusSink {
    fn emit(&mut self, report: Report);
    fn indicate(&mut self, indicator: Indicator);
}

/// Writes one report as a full line, CRLF included
/// param w: transport
/// param report: what to print
/// param style: duration layout for stop lines
pub fn render_report<W>(w: &mut W, report: &Report, style: DurationStyle) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    match report {
        Report::Started => w.write_str(STARTED)?,
        Report::Reset => w.write_str(RESET)?,
        Report::Stopped(duration) => {
            w.write_str(DURATION)?;
            render_duration(w, duration, style)?;
        }
    }
    w.write_str(EOL)
}

fn render_duration<W>(w: &mut W, d: &Breakdown, style: DurationStyle) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    if d.hours > 0 {
        uwrite!(w, " {} h", d.hours)?;
    }
    let leading = d.hours > 0 || style == DurationStyle::Full;
    if leading || d.minutes > 0 {
        uwrite!(w, " {} min", d.minutes)?;
    }
    if leading || d.minutes > 0 || d.seconds > 0 {
        uwrite!(w, " {} sec", d.seconds)?;
    }
    uwrite!(w, " {} ms", d.milliseconds)
}

/// Something that can show an [Indicator]
pub trait IndicatorDevice {
    type Error;

    fn show(&mut self, indicator: Indicator) -> Result<(), Self::Error>;
}

/// Two-LED indicator: one lit while running, the other while idle.
/// Exactly one of them is on after every [IndicatorDevice::show].
pub struct StatusLeds<A, I> {
    active: A,
    inactive: I,
}

impl<A, I> StatusLeds<A, I> {
    pub fn new(active: A, inactive: I) -> Self {
        Self { active, inactive }
    }

    pub fn release(self) -> (A, I) {
        (self.active, self.inactive)
    }
}

impl<A, I> IndicatorDevice for StatusLeds<A, I>
where
    A: OutputPin,
    I: OutputPin<Error = A::Error>,
{
    type Error = A::Error;

    fn show(&mut self, indicator: Indicator) -> Result<(), Self::Error> {
        // turn the old one off first so both are never lit together
        match indicator {
            Indicator::Active => {
                self.inactive.set_low()?;
                self.active.set_high()
            }
            Indicator::Inactive => {
                self.active.set_low()?;
                self.inactive.set_high()
            }
        }
    }
}
