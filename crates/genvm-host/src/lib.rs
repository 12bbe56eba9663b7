//! # GenVM Host
//!
//! Supervises the GenVM contract-execution engine: spawns it per invocation,
//! serves its state and nondeterminism requests over a length-framed binary
//! protocol on a UNIX-domain socket, and assembles the result once the
//! engine's work is done.
//!
//! ## Layout
//!
//! - [`domain`] — addresses, wire-protocol enum tags, per-invocation session.
//! - [`wire`] — the length-framed binary codec primitives.
//! - [`locator`] — finds the `genvm` executable via env vars and `PATH`.
//! - [`dispatch`] — the host-side loop that services one connected engine.
//! - [`supervisor`] — process spawn, race, staged shutdown, output capture.
//! - [`ports`] — the driving ([`ports::inbound`]) and driven
//!   ([`ports::outbound`]) trait seams.
//! - [`adapters`] — test-double implementations of the driven ports.
//! - [`service`] — [`service::GenVmHost`], the concrete [`ports::GenVm`].
//! - [`errors`] — the `thiserror` taxonomy shared by every layer above.

pub mod adapters;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod locator;
pub mod ports;
pub mod service;
pub mod supervisor;
pub mod wire;

/// Re-exports of the types most consumers need, mirroring the shape of a
/// typical workspace crate's `prelude` module.
pub mod prelude {
    pub use crate::domain::{
        Address, CombinedError, ExecutionOutcome, ExecutionResult, FinalResult, MethodCode,
        PendingTransaction, ResultCode, Session,
    };
    pub use crate::errors::{HostError, ProtocolError, SchemaError, SpawnError, StateError};
    pub use crate::ports::{CalldataCodec, GenVm, RunContractRequest, StateProxy};
    pub use crate::service::GenVmHost;
}
