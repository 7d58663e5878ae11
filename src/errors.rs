//! Error type returned by fallible operations in this crate.

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong talking to the kernel GPIO uAPI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A syscall (open/ioctl/read/poll) failed; the underlying errno is preserved.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// An offset, enum value or argument was rejected before any syscall was made.
    #[error("{0}")]
    InvalidArgument(#[from] InvalidArgumentError),

    /// The accumulated line configuration does not fit the kernel attribute limits.
    #[error(transparent)]
    TooComplex(#[from] TooComplexError),

    /// `Chip::find_line` did not find a line with the requested name.
    #[error("no line named {0:?} on this chip")]
    NotFound(String),

    /// A record read back from the kernel carried a value this build does not recognize.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    pub(crate) fn os(err: nix::Error) -> Self {
        Self::Io(std::io::Error::from(err))
    }
}

impl From<nix::Error> for Error {
    fn from(err: nix::Error) -> Self {
        Self::os(err)
    }
}

/// An offset or argument that could not be accepted.
#[derive(Debug, thiserror::Error)]
pub enum InvalidArgumentError {
    #[error("offset {0} is not part of this request")]
    OffsetNotInRequest(u32),
    #[error("unrecognized value for {field}: {value}")]
    UnrecognizedValue { field: &'static str, value: i64 },
    #[error("consumer name too long ({len} bytes, max {max})")]
    ConsumerTooLong { len: usize, max: usize },
}

/// Configuration or request exceeded a fixed kernel capacity.
#[derive(Debug, thiserror::Error)]
pub enum TooComplexError {
    #[error("line configuration requires more attribute slots than the kernel supports")]
    AttributeSlotsExhausted,
    #[error("more than 64 output values were set on this configuration")]
    TooManyOutputValues,
    #[error("{0} lines requested, more than the kernel's 64-line limit")]
    TooManyLines(usize),
}

/// A record read from the kernel failed a sanity check.
#[derive(Debug, thiserror::Error)]
#[error("failed to validate {field}: {msg}")]
pub struct ValidationError {
    pub field: &'static str,
    pub msg: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, msg: impl Into<String>) -> Self {
        Self {
            field,
            msg: msg.into(),
        }
    }
}

/// A `read()` off a chip or request fd returned a byte count that was not an
/// exact multiple of the kernel record size. Partial records are never exposed
/// to callers; this always becomes [`Error::Io`] with `ErrorKind::UnexpectedEof`.
#[derive(Debug, thiserror::Error)]
#[error("short read of {obj}: expected a multiple of {record_size} bytes, got {found}")]
pub struct UnderReadError {
    pub obj: &'static str,
    pub record_size: usize,
    pub found: usize,
}

impl From<UnderReadError> for Error {
    fn from(err: UnderReadError) -> Self {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            err.to_string(),
        ))
    }
}
