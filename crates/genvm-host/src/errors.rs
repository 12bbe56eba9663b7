//! Error taxonomy.
//!
//! Nothing is retried at this layer (§7). Every error eventually lands in an
//! [`ExecutionOutcome::Fail`](crate::domain::session::ExecutionOutcome::Fail)
//! composite that preserves whatever output and accumulators had built up
//! before failure.

use thiserror::Error;

/// Framing violations and unknown tags. Fatal to the dispatch loop.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown method code: {0}")]
    UnknownMethod(u8),

    #[error("unknown result code: {0}")]
    UnknownResultCode(u8),

    #[error("connection reset while reading {context}")]
    ConnectionReset { context: &'static str },

    #[error("storage_read returned {got} bytes, expected exactly {expected}")]
    StorageReadLengthMismatch { expected: u32, got: usize },

    #[error("no leader nondet result recorded for call {0}")]
    MissingLeaderNondetResult(u32),

    #[error("invalid utf-8 rollback payload")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures raised by the [`StateProxy`](crate::ports::outbound::StateProxy).
/// Fatal to the loop — there is no protocol-level error channel for state ops.
#[derive(Debug, Error)]
#[error("state proxy error: {0}")]
pub struct StateError(pub String);

/// Errors that prevent the engine from ever running: not found, failed to
/// start, failed to bind/listen. Surfaced as a setup-level failure.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("could not locate engine executable {name:?}, searched: {searched:?}")]
    EngineNotFound {
        name: String,
        searched: Vec<String>,
    },

    #[error("failed to bind listening socket at {path}: {source}")]
    Bind {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn engine process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to write config file: {0}")]
    ConfigWrite(#[source] std::io::Error),
}

/// A single cause accumulated while running a session: a loop-level protocol
/// or state error, or a trusted non-zero exit code.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error("engine exited with non-zero status: {0}")]
    ChildExit(i32),

    #[error("engine exited before emitting a final result")]
    ChildPrematureExit,
}

/// Error surfaced by [`get_contract_schema`](crate::ports::inbound::GenVm::get_contract_schema).
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("execution failed while fetching schema: {0}")]
    ExecutionFailed(String),

    #[error("__get_schema__ returned a non-string value")]
    NotAString,
}
