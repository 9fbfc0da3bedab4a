//! Container signature (magic bytes) detection.

use crate::error::FormatError;

/// The 8-byte container magic signature.
pub const EZH5_SIGNATURE: [u8; 8] = [0x89, b'E', b'Z', b'H', b'5', b'\r', b'\n', 0x1A];

/// Check that `data` starts with the container signature.
pub fn check_signature(data: &[u8]) -> Result<(), FormatError> {
    if data.len() >= 8 && data[..8] == EZH5_SIGNATURE {
        Ok(())
    } else {
        Err(FormatError::SignatureNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_at_offset_0() {
        let mut data = vec![0u8; 64];
        data[..8].copy_from_slice(&EZH5_SIGNATURE);
        assert_eq!(check_signature(&data), Ok(()));
    }

    #[test]
    fn signature_elsewhere_not_found() {
        let mut data = vec![0u8; 1024];
        data[512..520].copy_from_slice(&EZH5_SIGNATURE);
        assert_eq!(check_signature(&data), Err(FormatError::SignatureNotFound));
    }

    #[test]
    fn hdf5_signature_is_foreign() {
        let data = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1A, b'\n'];
        assert_eq!(check_signature(&data), Err(FormatError::SignatureNotFound));
    }

    #[test]
    fn signature_not_found_too_short() {
        assert_eq!(
            check_signature(&[0x89, b'E', b'Z']),
            Err(FormatError::SignatureNotFound)
        );
    }
}
