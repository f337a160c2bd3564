pub type Result<T, E = crate::error::Error> = std::result::Result<T, E>;

/// Returns `Ok(index)` if `index < len`, otherwise an `IndexOutOfRange` error.
#[inline]
pub fn verify_index(index: usize, len: usize) -> Result<usize> {
    if index < len {
        Ok(index)
    } else {
        Err(crate::error::Error::index_out_of_range(index, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_verify_index() {
        assert_eq!(verify_index(0, 1).unwrap(), 0);
        let err = verify_index(3, 3).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::IndexOutOfRange { index: 3, len: 3 }
        ));
        assert_eq!(err.to_string(), "index out of range: index 3, len 3");
    }
}
