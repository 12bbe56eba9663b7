//! Account address value object.
//!
//! The host treats addresses as opaque 20-byte blobs — it never interprets
//! them. Textual forms (`0x`+hex, base64) exist only at the boundary: the
//! wire protocol always carries raw bytes.

use std::fmt;

/// Size in bytes of an account address.
pub const ACCOUNT_ADDR_SIZE: usize = 20;

/// Size in bytes of a generic storage slot identifier.
pub const GENERIC_ADDR_SIZE: usize = 32;

/// A fixed 20-byte opaque account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address([u8; ACCOUNT_ADDR_SIZE]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; ACCOUNT_ADDR_SIZE]);

    /// Builds an address from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; ACCOUNT_ADDR_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds an address from a slice, failing if the length is wrong.
    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        <[u8; ACCOUNT_ADDR_SIZE]>::try_from(slice)
            .map(Self)
            .map_err(|_| AddressError::WrongLength(slice.len()))
    }

    /// Parses `0x`-prefixed hex or bare hex.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| AddressError::InvalidHex)?;
        Self::from_slice(&bytes)
    }

    /// Parses a base64-encoded address (the form used in `--message` JSON).
    pub fn from_base64(s: &str) -> Result<Self, AddressError> {
        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(|_| AddressError::InvalidBase64)?;
        Self::from_slice(&bytes)
    }

    /// Raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ACCOUNT_ADDR_SIZE] {
        &self.0
    }

    /// `0x` + 40 lowercase hex characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Base64 of the raw bytes, used in the `--message` JSON payload.
    #[must_use]
    pub fn to_base64(&self) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(self.0)
    }
}

/// Errors parsing an `Address` from a textual or byte form.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    /// The input was not 20 bytes once decoded.
    #[error("invalid address length: {0}, expected {ACCOUNT_ADDR_SIZE}")]
    WrongLength(usize),
    /// The input was not valid hex.
    #[error("invalid hex address")]
    InvalidHex,
    /// The input was not valid base64.
    #[error("invalid base64 address")]
    InvalidBase64,
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "addr#{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; ACCOUNT_ADDR_SIZE]> for Address {
    fn from(bytes: [u8; ACCOUNT_ADDR_SIZE]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let addr = Address::new([0x11; 20]);
        let hex = addr.to_hex();
        assert_eq!(hex, format!("0x{}", "11".repeat(20)));
        assert_eq!(Address::from_hex(&hex).unwrap(), addr);
        // bare hex without 0x prefix is also accepted
        assert_eq!(Address::from_hex(&"11".repeat(20)).unwrap(), addr);
    }

    #[test]
    fn base64_round_trip() {
        let addr = Address::new([0x42; 20]);
        let b64 = addr.to_base64();
        assert_eq!(Address::from_base64(&b64).unwrap(), addr);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        let err = Address::from_slice(&[0u8; 19]).unwrap_err();
        assert!(matches!(err, AddressError::WrongLength(19)));
    }

    #[test]
    fn debug_and_display_use_hex() {
        let addr = Address::new([0xab; 20]);
        assert_eq!(format!("{addr}"), addr.to_hex());
        assert!(format!("{addr:?}").starts_with("addr#"));
    }
}
