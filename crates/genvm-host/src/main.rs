//! # GenVM Host Demo
//!
//! A small entry point for driving one `run_contract` invocation end to end
//! against an in-memory state proxy, for manual exercising and
//! smoke-testing outside the test suite. It is not a production node
//! component — real callers embed [`genvm_host::service::GenVmHost`]
//! directly and supply their own [`genvm_host::ports::StateProxy`].
//!
//! The engine executable is located the same way the library does (`GENVM_BIN`,
//! `GENVMPATH`, or `PATH`); point one of those at a `genvm`-compatible
//! binary before running this.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use genvm_host::adapters::{InMemoryState, JsonCalldataCodec};
use genvm_host::domain::Address;
use genvm_host::ports::{CalldataCodec, GenVm, RunContractRequest};
use genvm_host::service::GenVmHost;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("===========================================");
    info!("  GenVM Host Demo");
    info!("===========================================");

    let contract_address = Address::new([0x11; 20]);
    let from_address = Address::new([0x22; 20]);

    let state = InMemoryState::new();
    state.set_code(contract_address, b"demo contract bytecode".to_vec());

    let codec = JsonCalldataCodec;
    let calldata = codec.encode_method_call("increment");

    let host = GenVmHost::default();
    let result = host
        .run_contract(RunContractRequest {
            state: Arc::new(state),
            from_address,
            contract_address,
            calldata: &calldata,
            is_init: false,
            leader_results: None,
            config: None,
        })
        .await;

    info!(?result.outcome, "run_contract finished");
    if !result.stdout.is_empty() {
        info!(stdout = %result.stdout, "engine stdout");
    }
    if !result.stderr.is_empty() {
        info!(stderr = %result.stderr, "engine stderr");
    }

    Ok(())
}
