//! Driven ports (SPI) — interfaces the host depends on but does not own.

use async_trait::async_trait;

use crate::domain::Address;
use crate::errors::StateError;

/// The host's sole interface to world state (§3, §9 "StateProxy capability").
///
/// The host never owns the underlying store; it only calls through this
/// capability. Implementations back onto whatever the blockchain node's
/// state layer actually is — a narrow seam so the host stays testable with
/// a trivial in-memory double.
#[async_trait]
pub trait StateProxy: Send + Sync {
    /// Reads `le` bytes from `account`'s storage at `slot` starting at
    /// `index`, returning the data and the gas remaining after the charge.
    async fn storage_read(
        &self,
        gas_before: u64,
        account: Address,
        slot: [u8; 32],
        index: u32,
        le: u32,
    ) -> Result<(Vec<u8>, u64), StateError>;

    /// Writes `data` into `account`'s storage at `slot` starting at `index`,
    /// returning the gas remaining after the charge.
    async fn storage_write(
        &self,
        gas_before: u64,
        account: Address,
        slot: [u8; 32],
        index: u32,
        data: &[u8],
    ) -> Result<u64, StateError>;

    /// Returns the deployed code for `account`.
    async fn get_code(&self, account: Address) -> Result<Vec<u8>, StateError>;
}

/// Narrow seam onto the external calldata codec (out of scope per §1; the
/// host only needs to build and read back one value for
/// `get_contract_schema`).
pub trait CalldataCodec: Send + Sync {
    /// Encodes a method-call value into calldata bytes.
    fn encode_method_call(&self, method: &str) -> Vec<u8>;

    /// Decodes a calldata return value, failing if it isn't a string.
    fn decode_as_string(&self, data: &[u8]) -> Option<String>;
}
