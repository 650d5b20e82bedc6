//! Portable text encoding of link payloads.
//!
//! Payload bytes are carried as lowercase hex beneath whatever outer format a
//! codec uses, so binary data embeds safely in JSON and XML alike.

use crate::error::{ChainError, Result};

/// Encode payload bytes as lowercase hex.
pub fn encode(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode a hex payload. Accepts either letter case.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    hex::decode(text.trim()).map_err(|e| ChainError::Malformed(format!("payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let bytes = [0u8, 1, 127, 128, 255];
        assert_eq!(encode(&bytes), "00017f80ff");
        assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn empty_payload() {
        assert_eq!(encode(b""), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn uppercase_accepted() {
        assert_eq!(decode("FF0a").unwrap(), vec![0xff, 0x0a]);
    }

    #[test]
    fn invalid_hex_rejected() {
        assert!(matches!(decode("abc"), Err(ChainError::Malformed(_))));
        assert!(matches!(decode("zz"), Err(ChainError::Malformed(_))));
    }
}
