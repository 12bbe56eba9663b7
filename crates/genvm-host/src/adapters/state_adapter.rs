//! In-memory `StateProxy` implementations.
//!
//! Production deployments back [`StateProxy`] onto the node's real state
//! store; these adapters are for tests and the demo binary.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::Address;
use crate::errors::StateError;
use crate::ports::outbound::StateProxy;

/// A flat in-memory key-value store keyed by `(account, slot)`, plus a code
/// table, sufficient for exercising the full wire protocol in tests.
#[derive(Default)]
pub struct InMemoryState {
    storage: RwLock<HashMap<(Address, [u8; 32]), Vec<u8>>>,
    code: RwLock<HashMap<Address, Vec<u8>>>,
}

impl InMemoryState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_code(&self, account: Address, code: Vec<u8>) {
        self.code.write().unwrap().insert(account, code);
    }
}

#[async_trait]
impl StateProxy for InMemoryState {
    async fn storage_read(
        &self,
        gas_before: u64,
        account: Address,
        slot: [u8; 32],
        index: u32,
        le: u32,
    ) -> Result<(Vec<u8>, u64), StateError> {
        let storage = self.storage.read().unwrap();
        let cell = storage.get(&(account, slot)).cloned().unwrap_or_default();
        let start = index as usize;
        let end = start + le as usize;
        let mut out = vec![0u8; le as usize];
        if start < cell.len() {
            let copy_end = end.min(cell.len());
            out[..copy_end - start].copy_from_slice(&cell[start..copy_end]);
        }
        Ok((out, gas_before.saturating_sub(le as u64)))
    }

    async fn storage_write(
        &self,
        gas_before: u64,
        account: Address,
        slot: [u8; 32],
        index: u32,
        data: &[u8],
    ) -> Result<u64, StateError> {
        let mut storage = self.storage.write().unwrap();
        let cell = storage.entry((account, slot)).or_default();
        let start = index as usize;
        let end = start + data.len();
        if cell.len() < end {
            cell.resize(end, 0);
        }
        cell[start..end].copy_from_slice(data);
        Ok(gas_before.saturating_sub(data.len() as u64))
    }

    async fn get_code(&self, account: Address) -> Result<Vec<u8>, StateError> {
        Ok(self.code.read().unwrap().get(&account).cloned().unwrap_or_default())
    }
}

/// A `StateProxy` that serves exactly one account's code and traps on any
/// other call — used by `get_contract_schema`, which never touches storage
/// (§6.3, mirroring `base.py::_StateProxyNone`).
pub struct CodeOnlyState {
    my_address: Address,
    code: Vec<u8>,
}

impl CodeOnlyState {
    #[must_use]
    pub fn new(my_address: Address, code: Vec<u8>) -> Self {
        Self { my_address, code }
    }
}

#[async_trait]
impl StateProxy for CodeOnlyState {
    async fn storage_read(
        &self,
        _gas_before: u64,
        _account: Address,
        _slot: [u8; 32],
        _index: u32,
        _le: u32,
    ) -> Result<(Vec<u8>, u64), StateError> {
        Err(StateError(
            "storage_read is unreachable for a schema-only session".to_string(),
        ))
    }

    async fn storage_write(
        &self,
        _gas_before: u64,
        _account: Address,
        _slot: [u8; 32],
        _index: u32,
        _data: &[u8],
    ) -> Result<u64, StateError> {
        Err(StateError(
            "storage_write is unreachable for a schema-only session".to_string(),
        ))
    }

    async fn get_code(&self, account: Address) -> Result<Vec<u8>, StateError> {
        if account != self.my_address {
            return Err(StateError(format!(
                "get_code requested for unexpected address {account}"
            )));
        }
        Ok(self.code.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn storage_round_trip() {
        let state = InMemoryState::new();
        let account = Address::new([1u8; 20]);
        let slot = [2u8; 32];
        state
            .storage_write(1000, account, slot, 0, b"hello")
            .await
            .unwrap();
        let (data, _gas) = state.storage_read(1000, account, slot, 0, 5).await.unwrap();
        assert_eq!(data, b"hello".to_vec());
    }

    #[tokio::test]
    async fn unwritten_storage_reads_as_zeros() {
        let state = InMemoryState::new();
        let account = Address::new([9u8; 20]);
        let (data, _) = state
            .storage_read(1000, account, [0u8; 32], 0, 4)
            .await
            .unwrap();
        assert_eq!(data, vec![0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn code_only_state_traps_on_storage_access() {
        let state = CodeOnlyState::new(Address::ZERO, b"code".to_vec());
        assert!(state
            .storage_read(0, Address::ZERO, [0; 32], 0, 1)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn code_only_state_rejects_foreign_address() {
        let state = CodeOnlyState::new(Address::new([1u8; 20]), b"code".to_vec());
        assert!(state.get_code(Address::new([2u8; 20])).await.is_err());
    }
}
