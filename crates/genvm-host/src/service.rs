//! The host's public API (§6.3).
//!
//! [`GenVmHost`] wires together the locator, the `--message` argument, and
//! the supervisor into the two operations consumers actually call. It owns
//! nothing but the engine's name and the shutdown grace period — all other
//! state is per-invocation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Address, ExecutionOutcome, Session};
use crate::errors::SchemaError;
use crate::locator;
use crate::ports::inbound::{GenVm, RunContractRequest};
use crate::ports::outbound::{CalldataCodec, StateProxy};
use crate::supervisor::{self, EngineLaunch};

/// Name of the engine executable looked up via [`locator::locate_cached`].
const ENGINE_NAME: &str = "genvm";

/// Fixed gas value sent in every `--message` payload (§3): metering is out
/// of scope, so the host disables it by always requesting the maximum.
const UNMETERED_GAS: u64 = u64::MAX;

/// The well-known method name used to fetch a contract's schema (§6.3).
const GET_SCHEMA_METHOD: &str = "__get_schema__";

/// The concrete [`GenVm`] implementation backing production and demo use.
pub struct GenVmHost {
    exit_timeout: Duration,
}

impl Default for GenVmHost {
    fn default() -> Self {
        Self::new(supervisor::DEFAULT_EXIT_TIMEOUT)
    }
}

impl GenVmHost {
    #[must_use]
    pub fn new(exit_timeout: Duration) -> Self {
        Self { exit_timeout }
    }

    fn build_message(
        sender_account: Address,
        contract_account: Address,
        is_init: bool,
    ) -> String {
        serde_json::json!({
            "is_init": is_init,
            "contract_account": contract_account.to_base64(),
            "sender_account": sender_account.to_base64(),
            "value": serde_json::Value::Null,
            "gas": UNMETERED_GAS,
        })
        .to_string()
    }
}

#[async_trait]
impl GenVm for GenVmHost {
    async fn run_contract(&self, req: RunContractRequest<'_>) -> crate::domain::ExecutionResult {
        let engine_path = match locator::locate_cached(ENGINE_NAME) {
            Ok(path) => path.to_path_buf(),
            Err(e) => {
                tracing::error!(error = %e, "engine not found");
                let session = Session::new(req.calldata.to_vec(), req.leader_results);
                return session.into_result(
                    ExecutionOutcome::Fail(crate::domain::CombinedError(vec![e.into()])),
                    String::new(),
                    String::new(),
                );
            }
        };

        let message = Self::build_message(req.from_address, req.contract_address, req.is_init);
        let session = Session::new(req.calldata.to_vec(), req.leader_results);
        let launch = EngineLaunch {
            engine_path,
            config: req.config,
            tail_args: vec!["--message".to_string(), message],
        };

        tracing::debug!(
            from = %req.from_address,
            contract = %req.contract_address,
            is_init = req.is_init,
            "running contract"
        );
        supervisor::run_supervised(session, req.state.as_ref(), launch, self.exit_timeout).await
    }

    async fn get_contract_schema(&self, contract_code: &[u8]) -> Result<String, SchemaError> {
        self.get_contract_schema_with_codec(contract_code, &crate::adapters::JsonCalldataCodec)
            .await
    }
}

impl GenVmHost {
    /// Same as [`GenVm::get_contract_schema`] but with the calldata codec
    /// supplied explicitly, since the trait method fixes it to
    /// [`crate::adapters::JsonCalldataCodec`] for callers who don't need
    /// anything else.
    pub async fn get_contract_schema_with_codec(
        &self,
        contract_code: &[u8],
        codec: &dyn CalldataCodec,
    ) -> Result<String, SchemaError> {
        let engine_path = locator::locate_cached(ENGINE_NAME)
            .map_err(|e| SchemaError::ExecutionFailed(e.to_string()))?
            .to_path_buf();

        let state: Arc<dyn StateProxy> = Arc::new(crate::adapters::CodeOnlyState::new(
            Address::ZERO,
            contract_code.to_vec(),
        ));
        let calldata = codec.encode_method_call(GET_SCHEMA_METHOD);
        let message = Self::build_message(Address::ZERO, Address::ZERO, false);
        let session = Session::new(calldata, None);
        let launch = EngineLaunch {
            engine_path,
            config: None,
            tail_args: vec!["--message".to_string(), message],
        };

        let result =
            supervisor::run_supervised(session, state.as_ref(), launch, self.exit_timeout).await;

        match result.outcome {
            ExecutionOutcome::Return(bytes) => codec
                .decode_as_string(&bytes)
                .ok_or(SchemaError::NotAString),
            ExecutionOutcome::Rollback(msg) => Err(SchemaError::ExecutionFailed(msg)),
            ExecutionOutcome::Fail(err) => Err(SchemaError::ExecutionFailed(err.to_string())),
        }
    }
}
