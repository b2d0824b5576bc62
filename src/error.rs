pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid memory object: {0}")]
    InvalidMemObject(String),

    #[error("image format mismatch: {0}")]
    ImageFormatMismatch(String),

    #[error("invalid context: {0}")]
    InvalidContext(String),

    #[error("copy regions overlap: {0}")]
    CopyOverlap(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("out of host memory: {0}")]
    OutOfHostMemory(String),

    #[error("compilation failed: {0}")]
    CompilationFailed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_handle<S: Into<String>>(msg: S) -> Self {
        Error::InvalidHandle(msg.into())
    }

    pub fn invalid_value<S: Into<String>>(msg: S) -> Self {
        Error::InvalidValue(msg.into())
    }

    pub fn invalid_mem_object<S: Into<String>>(msg: S) -> Self {
        Error::InvalidMemObject(msg.into())
    }

    pub fn format_mismatch<S: Into<String>>(msg: S) -> Self {
        Error::ImageFormatMismatch(msg.into())
    }

    pub fn invalid_context<S: Into<String>>(msg: S) -> Self {
        Error::InvalidContext(msg.into())
    }

    pub fn copy_overlap<S: Into<String>>(msg: S) -> Self {
        Error::CopyOverlap(msg.into())
    }

    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        Error::InvalidOperation(msg.into())
    }

    pub fn compilation<S: Into<String>>(msg: S) -> Self {
        Error::CompilationFailed(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Coarse classification for callers that only care which rule rejected
    /// a request. Also the terminal state carried by a failed event.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidHandle(_) => ErrorKind::InvalidHandle,
            Error::InvalidValue(_) => ErrorKind::InvalidValue,
            Error::InvalidMemObject(_) => ErrorKind::InvalidMemObject,
            Error::ImageFormatMismatch(_) => ErrorKind::ImageFormatMismatch,
            Error::InvalidContext(_) => ErrorKind::InvalidContext,
            Error::CopyOverlap(_) => ErrorKind::CopyOverlap,
            Error::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Error::OutOfHostMemory(_) => ErrorKind::OutOfHostMemory,
            Error::CompilationFailed(_) => ErrorKind::CompilationFailed,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

/// Payload-free mirror of [`Error`]. Events store this so error identity
/// survives cloning across the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidHandle,
    InvalidValue,
    InvalidMemObject,
    ImageFormatMismatch,
    InvalidContext,
    CopyOverlap,
    InvalidOperation,
    OutOfHostMemory,
    CompilationFailed,
    Config,
    Io,
}
