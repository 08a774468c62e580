//! Errors from the status output collaborators.
//!
//! The timing core itself can't fail; only writing lines out and driving
//! the LEDs can.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<T, P> {
    /// The text transport rejected a write
    Transport(T),
    /// An indicator pin could not be set
    Indicator(P),
}

impl<T, P> fmt::Display for Error<T, P>
where
    T: fmt::Debug,
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "status transport failed: {:?}", e),
            Error::Indicator(e) => write!(f, "indicator pin failed: {:?}", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl<T, P> defmt::Format for Error<T, P> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Transport(_) => defmt::write!(f, "status transport failed"),
            Error::Indicator(_) => defmt::write!(f, "indicator pin failed"),
        }
    }
}
