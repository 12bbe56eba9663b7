//! Driving ports (API) — the host's public surface (§6.3).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Address, ExecutionResult};
use crate::errors::SchemaError;
use crate::ports::outbound::StateProxy;

/// Parameters for one `run_contract` invocation.
pub struct RunContractRequest<'a> {
    pub state: Arc<dyn StateProxy>,
    pub from_address: Address,
    pub contract_address: Address,
    pub calldata: &'a [u8],
    pub is_init: bool,
    /// `None` means "this is the leader; no prior results exist."
    pub leader_results: Option<HashMap<u32, Vec<u8>>>,
    /// Raw configuration blob, opaque to the host, written to
    /// `T/conf.json` if present.
    pub config: Option<String>,
}

/// The host's public API (§6.3).
#[async_trait]
pub trait GenVm: Send + Sync {
    /// Runs one contract invocation end to end: spawns the engine, serves
    /// its requests, and assembles the final result.
    async fn run_contract(&self, req: RunContractRequest<'_>) -> ExecutionResult;

    /// Synthesizes a session that asks the engine for a contract's schema
    /// by invoking the well-known `__get_schema__` method with no state
    /// access beyond `get_code`.
    async fn get_contract_schema(&self, contract_code: &[u8]) -> Result<String, SchemaError>;
}
