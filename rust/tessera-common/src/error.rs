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

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        ErrorKind::InvalidOperation { name: name.into() }.into()
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidFormat {
            element: element.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn unsupported(operation: impl Into<String>) -> Error {
        ErrorKind::Unsupported {
            operation: operation.into(),
        }
        .into()
    }

    pub fn out_of_bounds(offset: u64, len: u64, size: u64) -> Error {
        ErrorKind::OutOfBounds { offset, len, size }.into()
    }

    pub fn closed() -> Error {
        ErrorKind::Closed.into()
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        ErrorKind::Io {
            context: context.into(),
            source,
        }
        .into()
    }

    /// Returns `true` if this error reports a violated caller precondition
    /// (as opposed to malformed data or a failed system call).
    pub fn is_precondition(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidArgument { .. }
                | ErrorKind::InvalidOperation { .. }
                | ErrorKind::Unsupported { .. }
                | ErrorKind::OutOfBounds { .. }
                | ErrorKind::Closed
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("unsupported operation: {operation}")]
    Unsupported { operation: String },

    #[error("range [{offset}, {offset} + {len}) is out of bounds for memory of size {size}")]
    OutOfBounds { offset: u64, len: u64, size: u64 },

    #[error("memory is closed")]
    Closed,

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::out_of_bounds(60, 8, 64);
        assert_eq!(
            e.to_string(),
            "range [60, 60 + 8) is out of bounds for memory of size 64"
        );
        assert_eq!(Error::closed().to_string(), "memory is closed");
        assert_eq!(
            Error::unsupported("borrow_utf8_split_a").to_string(),
            "unsupported operation: borrow_utf8_split_a"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::closed().is_precondition());
        assert!(Error::out_of_bounds(0, 1, 0).is_precondition());
        assert!(Error::invalid_arg("page_size", "must be a power of two").is_precondition());
        assert!(!Error::invalid_format("str_len", "-7").is_precondition());
        let io = std::io::Error::new(std::io::ErrorKind::OutOfMemory, "oom");
        assert!(!Error::from(io).is_precondition());
    }

    #[test]
    fn test_error_into_kind() {
        let e = Error::invalid_operation("extend");
        match e.into_kind() {
            ErrorKind::InvalidOperation { name } => assert_eq!(name, "extend"),
            other => panic!("unexpected kind {other:?}"),
        }
    }
}
