//! Per-invocation session state (§3, §4.4).
//!
//! Mutated exclusively by the dispatch loop, in the handler of the
//! corresponding method, and read once by the assembler after both the loop
//! and the subprocess have terminated.

use std::collections::HashMap;
use std::fmt;

use crate::errors::HostError;

/// An outbound cross-contract message the executed contract wishes to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    /// `0x` + 40 lowercase hex characters.
    pub address: String,
    /// Opaque calldata, stored verbatim.
    pub calldata: Vec<u8>,
}

/// The engine's terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalResult {
    Return(Vec<u8>),
    Rollback(String),
}

/// Multiple causes accumulated while running a session, joined for display
/// rather than collapsed early (§9 "Composite failures").
#[derive(Debug)]
pub struct CombinedError(pub Vec<HostError>);

impl fmt::Display for CombinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<unknown error>");
        }
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for CombinedError {}

/// The sum of possible outcomes of `run_contract` (§7).
#[derive(Debug)]
pub enum ExecutionOutcome {
    Return(Vec<u8>),
    Rollback(String),
    Fail(CombinedError),
}

/// The full result of a `run_contract` invocation: outcome plus the
/// accumulators and captured child output that are always attached,
/// regardless of which outcome variant fired.
#[derive(Debug)]
pub struct ExecutionResult {
    pub outcome: ExecutionOutcome,
    pub eq_outputs: HashMap<u32, Vec<u8>>,
    pub pending_transactions: Vec<PendingTransaction>,
    pub stdout: String,
    pub stderr: String,
}

/// Per-invocation mutable state, owned by the supervisor and borrowed
/// exclusively by the dispatch loop handler (§3, invariant 1–4).
pub struct Session {
    pub calldata: Vec<u8>,
    /// Absent means "this is the leader; no prior results exist."
    pub leader_results: Option<HashMap<u32, Vec<u8>>>,
    pub eq_outputs: HashMap<u32, Vec<u8>>,
    pub pending_transactions: Vec<PendingTransaction>,
    pub final_result: Option<FinalResult>,
}

impl Session {
    #[must_use]
    pub fn new(calldata: Vec<u8>, leader_results: Option<HashMap<u32, Vec<u8>>>) -> Self {
        Self {
            calldata,
            leader_results,
            eq_outputs: HashMap::new(),
            pending_transactions: Vec::new(),
            final_result: None,
        }
    }

    /// Packages the session's accumulators plus captured output and a
    /// decided outcome into the final [`ExecutionResult`] (§4.6).
    #[must_use]
    pub fn into_result(
        self,
        outcome: ExecutionOutcome,
        stdout: String,
        stderr: String,
    ) -> ExecutionResult {
        ExecutionResult {
            outcome,
            eq_outputs: self.eq_outputs,
            pending_transactions: self.pending_transactions,
            stdout,
            stderr,
        }
    }
}
