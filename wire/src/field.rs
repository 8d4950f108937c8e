//! Fixed-width, NUL-padded UTF-8 text fields (file names, chat sender names).

use crate::errors::WireError;

/// Pads `text` with NUL bytes up to `width`.
pub fn encode_fixed(text: &str, width: usize) -> Result<Vec<u8>, WireError> {
    let bytes = text.as_bytes();
    if bytes.len() > width {
        return Err(WireError::FieldOverflow {
            length: bytes.len(),
            width,
        });
    }
    if bytes.contains(&0) {
        return Err(WireError::EmbeddedNul);
    }

    let mut field = vec![0u8; width];
    field[..bytes.len()].copy_from_slice(bytes);
    Ok(field)
}

/// Strips the NUL padding written by [`encode_fixed`].
pub fn decode_fixed(field: &[u8]) -> Result<String, WireError> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    if field[end..].iter().any(|&b| b != 0) {
        return Err(WireError::EmbeddedNul);
    }

    Ok(std::str::from_utf8(&field[..end])?.to_string())
}
