// Error type for drivers that check arguments before touching the bus.
// Drivers that can only fail on the wire return the transport error as-is.

use core::fmt;

use embedded_hal::digital;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Transport failure, passed through unchanged
    Bus(E),
    /// Argument outside the range the device accepts; nothing was sent
    InvalidArgument(&'static str),
}

impl<E> Error<E> {
    pub fn bus_error(&self) -> Option<&E> {
        match self {
            Error::Bus(e) => Some(e),
            Error::InvalidArgument(_) => None,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus error: {:?}", e),
            Error::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

// lets expander channels implement the embedded-hal pin traits
impl<E: fmt::Debug> digital::Error for Error<E> {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}
