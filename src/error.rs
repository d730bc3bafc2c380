use core::fmt;

/// An error type representing failed or incomplete transfers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Error {
    repr: Repr,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Repr {
    Short(ErrorKind, ShortTransfer),
    Simple(ErrorKind),
}

impl Error {
    pub(crate) fn short_write(transferred: usize, expected: usize) -> Self {
        Error {
            repr: Repr::Short(
                ErrorKind::ShortWrite,
                ShortTransfer {
                    transferred,
                    expected,
                },
            ),
        }
    }

    pub(crate) fn short_read(transferred: usize, expected: usize) -> Self {
        Error {
            repr: Repr::Short(
                ErrorKind::ShortRead,
                ShortTransfer {
                    transferred,
                    expected,
                },
            ),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            Repr::Short(kind, _) | Repr::Simple(kind) => kind,
        }
    }

    /// Byte counts of an incomplete transfer, if that is what this error is.
    pub fn short_transfer(&self) -> Option<ShortTransfer> {
        match self.repr {
            Repr::Short(_, short) => Some(short),
            Repr::Simple(_) => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            repr: Repr::Simple(kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Short(kind, short) => write!(
                fmt,
                "{} ({} of {} bytes)",
                kind.as_str(),
                short.transferred,
                short.expected
            ),
            Repr::Simple(kind) => write!(fmt, "{}", kind.as_str()),
        }
    }
}

/// Progress of a transfer that stopped before the whole value was moved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShortTransfer {
    pub transferred: usize,
    pub expected: usize,
}

/// A list of specific error causes. Each kind is converted into `Error` type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Sink stopped accepting bytes before the value was fully written
    ShortWrite,
    /// Source ran dry before the value was fully read
    ShortRead,
    /// Failed to write
    TxFail,
    /// Failed to read
    RxFail,
    /// Requested more bytes than the receive buffer holds
    SmallBuffer,
    /// Flush requested without a target address
    NoTransmission,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            ShortWrite => "sink accepted fewer bytes than the value holds",
            ShortRead => "source provided fewer bytes than the value holds",
            TxFail => "failed to write",
            RxFail => "failed to read",
            SmallBuffer => "supplied buffer is too small for data required",
            NoTransmission => "no transmission has been started",
        }
    }
}
