//! Adapters: concrete implementations of the [`crate::ports`] traits used by
//! tests and the demo binary.

pub mod calldata_codec;
pub mod state_adapter;

pub use calldata_codec::JsonCalldataCodec;
pub use state_adapter::{CodeOnlyState, InMemoryState};
