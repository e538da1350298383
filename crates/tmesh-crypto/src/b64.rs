//! Standard (padded) base64, shared by the point and commitment serde impls.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub(crate) fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub(crate) fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}
