use core::fmt;

/// Errors returned by every sensor operation.
///
/// Each error is terminal for the transaction that produced it; the driver never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Response did not start with `0xFF` or did not echo the command that was sent.
    InvalidFrame,
    /// Response header was valid but the checksum byte did not match.
    BadChecksum,
    /// Fewer than 9 bytes arrived within the receive timeout.
    Timeout,
    /// Caller misuse: undersized buffer, unsupported value or detached serial port.
    InvalidArg,
    /// Well-formed response carrying a detection range other than 2000 or 5000 ppm.
    InvalidRange(u16),
    /// The serial port reported an error while reading.
    ReadFailure,
    /// The serial port reported an error while writing or flushing.
    WriteFailure,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidFrame => f.write_str("invalid response frame"),
            Error::BadChecksum => f.write_str("response checksum mismatch"),
            Error::Timeout => f.write_str("response timeout"),
            Error::InvalidArg => f.write_str("invalid argument"),
            Error::InvalidRange(ppm) => write!(f, "invalid detection range: {} ppm", ppm),
            Error::ReadFailure => f.write_str("serial read failure"),
            Error::WriteFailure => f.write_str("serial write failure"),
        }
    }
}
