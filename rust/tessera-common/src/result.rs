pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_data(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[inline]
pub fn verify_data(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_format(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::Error::invalid_arg(name, condition))
}

#[cold]
pub fn invalid_format(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::Error::invalid_format(name, condition))
}

/// Aborts the current operation on a violated precondition.
///
/// Read paths of the memory layer do not return `Result`: reading outside the
/// addressable range, reading after close or asking for a capability the
/// implementation lacks is a programming error, and is reported by panicking
/// with the formatted error.
#[cold]
#[track_caller]
pub fn violation(err: crate::error::Error) -> ! {
    panic!("precondition violated: {err}")
}

/// Unwraps `result`, treating an error as a precondition violation.
#[inline]
#[track_caller]
pub fn expect_valid<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => violation(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn checked_page_size(page_size: u64) -> Result<u64> {
        verify_arg!(page_size, page_size.is_power_of_two());
        Ok(page_size)
    }

    fn checked_len(len: i32) -> Result<i32> {
        verify_data!(len, len >= -1);
        Ok(len)
    }

    #[test]
    fn test_verify_arg() {
        assert_eq!(checked_page_size(4096).unwrap(), 4096);
        let err = checked_page_size(1000).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidArgument { name, message } => {
                assert_eq!(name, "page_size");
                assert_eq!(message, "page_size.is_power_of_two()");
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_verify_data() {
        assert_eq!(checked_len(-1).unwrap(), -1);
        let err = checked_len(-2).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidFormat { .. }));
    }

    #[test]
    fn test_expect_valid_ok() {
        assert_eq!(expect_valid(Ok::<_, crate::error::Error>(7)), 7);
    }

    #[test]
    #[should_panic(expected = "precondition violated: memory is closed")]
    fn test_violation_panics() {
        let _: u8 = expect_valid(Err(crate::error::Error::closed()));
    }
}
