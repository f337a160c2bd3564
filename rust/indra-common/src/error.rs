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

    pub fn allocation_failure(size: usize, alignment: usize) -> Error {
        Error(ErrorKind::AllocationFailure { size, alignment }.into())
    }

    pub fn capacity_overflow(requested: usize) -> Error {
        Error(ErrorKind::CapacityOverflow { requested }.into())
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Error {
        Error(ErrorKind::IndexOutOfRange { index, len }.into())
    }

    pub fn invalid_alignment(alignment: usize) -> Error {
        Error(ErrorKind::InvalidAlignment { alignment }.into())
    }

    /// Returns `true` if this error reports that the allocator could not satisfy
    /// a request (as opposed to a size computation overflow).
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::AllocationFailure { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("failed to allocate {size} bytes with alignment {alignment}")]
    AllocationFailure { size: usize, alignment: usize },

    #[error("capacity overflow: requested {requested}")]
    CapacityOverflow { requested: usize },

    #[error("index out of range: index {index}, len {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid alignment {alignment}: must be a power of two")]
    InvalidAlignment { alignment: usize },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::allocation_failure(4096, 64);
        assert_eq!(
            e.to_string(),
            "failed to allocate 4096 bytes with alignment 64"
        );
        assert!(e.is_allocation_failure());

        let e = Error::capacity_overflow(usize::MAX);
        assert!(!e.is_allocation_failure());
        assert!(e.to_string().starts_with("capacity overflow"));
    }

    #[test]
    fn test_error_kind_roundtrip() {
        let e: Error = ErrorKind::InvalidAlignment { alignment: 3 }.into();
        match e.into_kind() {
            ErrorKind::InvalidAlignment { alignment } => assert_eq!(alignment, 3),
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<Error>();
    }
}
