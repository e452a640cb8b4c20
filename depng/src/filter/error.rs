use std::io;
use std::fmt;

macro_rules! impl_error_abbr {
    ($(($func:ident, $ekid:expr)),+ $(,)?) => {
        impl Error {$(
            pub fn $func<E: Into<Box<dyn std::error::Error + Send + Sync>>>(error: E) -> Self {
                Self { kind: $ekid, error: error.into() }
            }
        )+}
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    /// A scanline tag outside `0..=4`.
    InvalidFilter,
    /// `height`, `bpl` or the buffer length don't describe a valid image.
    BadGeometry,
    /// Bytes per pixel outside `{1, 2, 3, 4, 6, 8}`.
    BadBpp,
    TooLarge,
    Config,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    error: Box<dyn std::error::Error + Send + Sync>,
}

impl_error_abbr!{
    (io,             ErrorKind::Io),
    (invalid_filter, ErrorKind::InvalidFilter),
    (bad_geometry,   ErrorKind::BadGeometry),
    (bad_bpp,        ErrorKind::BadBpp),
    (too_large,      ErrorKind::TooLarge),
    (config,         ErrorKind::Config),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Error {
        Self::io(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.error)
    }
}
