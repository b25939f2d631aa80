//! Error types for PostScript emission.

use core::fmt;
use std::io;

/// A specialized [`Result`] type for PSL operations.
pub type Result<T> = core::result::Result<T, Error>;

/// An error returned by a PSL operation.
///
/// Geometry and formatting errors leave the session state unchanged, so a
/// caller can report the error and keep plotting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A parameter was outside of its valid domain.
    BadValue,
    /// An invalid text or paragraph justification.
    BadJustify,
    /// An input (for example an EPS file) could not be read or recognized.
    ReadFailure,
    /// A polygon had no distinct points.
    NoPolygon,
    /// A text string was too long or malformed.
    BadText,
    /// A negative pen width.
    BadWidth,
    /// An empty path.
    NoPath,
    /// An unknown symbol code.
    BadSymbol,
    /// A negative or too small size (for example a radius or knot count).
    BadSize,
    /// A value range was empty or out of bounds.
    BadRange,
    /// An invalid mode flag.
    BadFlag,
    /// An operation that requires an active plot was called without one.
    NoSession,
    /// Writing to the output sink failed.
    Io(io::ErrorKind),
}

impl Error {
    /// Return the numeric result code of this error.
    pub fn code(&self) -> i32 {
        match self {
            Self::BadValue => -99,
            Self::BadJustify => -98,
            Self::ReadFailure => -97,
            Self::NoPolygon => -96,
            Self::BadText => -95,
            Self::BadWidth => -94,
            Self::NoPath => -93,
            Self::BadSymbol => -92,
            Self::BadSize => -91,
            Self::BadRange => -90,
            Self::BadFlag => -89,
            Self::NoSession => -88,
            Self::Io(_) => -1,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadValue => f.write_str("bad parameter value"),
            Self::BadJustify => f.write_str("bad justification"),
            Self::ReadFailure => f.write_str("failed to read input"),
            Self::NoPolygon => f.write_str("polygon has no distinct points"),
            Self::BadText => f.write_str("bad text string"),
            Self::BadWidth => f.write_str("negative pen width"),
            Self::NoPath => f.write_str("empty path"),
            Self::BadSymbol => f.write_str("unknown symbol"),
            Self::BadSize => f.write_str("bad size"),
            Self::BadRange => f.write_str("bad range"),
            Self::BadFlag => f.write_str("bad flag"),
            Self::NoSession => f.write_str("no active plot"),
            Self::Io(kind) => write!(f, "output error: {kind}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!(Error::BadValue.code(), -99);
        assert_eq!(Error::BadRange.code(), -90);
        assert_eq!(Error::NoSession.code(), -88);
    }

    #[test]
    fn from_io() {
        let e: Error = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();
        assert_eq!(e, Error::Io(io::ErrorKind::BrokenPipe));
    }
}
