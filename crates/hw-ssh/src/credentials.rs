//! Target credential decoding
//!
//! Targets carry their private key as base64 of the PEM/OpenSSH text.
//! RSA, Ed25519 and ECDSA keys are accepted, whatever `russh_keys` can parse.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use russh_keys::key::KeyPair;

use hw_core::ConnectError;

/// Decode base64 key material into a usable key pair
pub fn decode_credential(encoded: &str) -> Result<KeyPair, ConnectError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ConnectError::InvalidCredential("empty key".to_string()));
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ConnectError::InvalidCredential(format!("not valid base64: {}", e)))?;

    let pem = String::from_utf8(bytes).map_err(|_| {
        ConnectError::InvalidCredential("decoded key is not PEM text".to_string())
    })?;

    russh_keys::decode_secret_key(&pem, None)
        .map_err(|e| ConnectError::InvalidCredential(e.to_string()))
}

/// Encode raw key file contents for transport in a target
pub fn encode_credential(key_file: &[u8]) -> String {
    STANDARD.encode(key_file)
}
