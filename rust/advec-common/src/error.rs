use std::alloc::Layout;

use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn capacity_overflow(requested: usize) -> Error {
        Error(ErrorKind::CapacityOverflow { requested }.into())
    }

    pub fn allocation_failed(layout: Layout) -> Error {
        Error(
            ErrorKind::AllocationFailed {
                size: layout.size(),
                align: layout.align(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// Returns `true` if the error was reported by the global allocator
    /// or by the layout computation that precedes it.
    pub fn is_alloc_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::CapacityOverflow { .. } | ErrorKind::AllocationFailed { .. }
        )
    }

    /// Escalates the error the way infallible collection methods do:
    /// allocator failures go through `handle_alloc_error`, anything else
    /// panics with the error message.
    #[cold]
    #[track_caller]
    pub fn raise(self) -> ! {
        if let ErrorKind::AllocationFailed { size, align } = *self.kind() {
            if let Ok(layout) = Layout::from_size_align(size, align) {
                std::alloc::handle_alloc_error(layout);
            }
        }
        panic!("{self}")
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("capacity overflow: {requested} elements do not fit the address space")]
    CapacityOverflow { requested: usize },

    #[error("memory allocation of {size} bytes (align {align}) failed")]
    AllocationFailed { size: usize, align: usize },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::alloc::LayoutError> for Error {
    fn from(_: std::alloc::LayoutError) -> Self {
        Error::capacity_overflow(usize::MAX)
    }
}
