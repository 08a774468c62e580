//! Foreground loop body.
//!
//! Runs whenever no interrupt is active. It never changes timer state:
//! it writes out whatever the edge handlers queued and refreshes the
//! passive display readout.

use ufmt::uWrite;

use crate::error::Error;
use crate::rendering::{render_report, DurationStyle, IndicatorDevice};
use crate::shared::SharedTimer;
use crate::timer::Breakdown;

pub struct Foreground {
    style: DurationStyle,
    display: Breakdown,
}

impl Foreground {
    pub const fn new(style: DurationStyle) -> Foreground {
        Self {
            style,
            display: Breakdown::ZERO,
        }
    }

    /// Last computed display fields
    pub fn display(&self) -> Breakdown {
        self.display
    }

    /// One pass of the loop: indicator first, then queued lines, then display
    /// param shared: the global timer
    /// param transport: where status lines go
    /// param leds: indicator device
    pub fn poll<const N: usize, W, L>(
        &mut self,
        shared: &SharedTimer<N>,
        transport: &mut W,
        leds: &mut L,
    ) -> Result<(), Error<W::Error, L::Error>>
    where
        W: uWrite + ?Sized,
        L: IndicatorDevice + ?Sized,
    {
        if let Some(indicator) = shared.take_indicator() {
            leds.show(indicator).map_err(Error::Indicator)?;
        }

        let lost = shared.take_lost_reports();
        if lost > 0 {
            warn!("{=u32} status reports dropped", lost);
        }

        while let Some(report) = shared.next_report() {
            render_report(transport, &report, self.style).map_err(Error::Transport)?;
        }

        self.refresh(shared.elapsed_relaxed());
        Ok(())
    }

    /// Recomputes the display fields from a counter value
    pub fn refresh(&mut self, elapsed_ms: u32) -> Breakdown {
        let display = Breakdown::from_millis(elapsed_ms);
        if display.seconds != self.display.seconds {
            trace!(
                "{=u8}:{=u8}:{=u8}.{=u16}",
                display.hours,
                display.minutes,
                display.seconds,
                display.milliseconds
            );
        }
        self.display = display;
        display
    }
}
