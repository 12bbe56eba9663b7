//! Domain primitives: addresses, wire-protocol enum tags, and per-invocation
//! session state.

pub mod address;
pub mod codes;
pub mod session;

pub use address::{Address, AddressError, ACCOUNT_ADDR_SIZE, GENERIC_ADDR_SIZE};
pub use codes::{MethodCode, ResultCode};
pub use session::{
    CombinedError, ExecutionOutcome, ExecutionResult, FinalResult, PendingTransaction, Session,
};
