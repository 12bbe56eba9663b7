//! Ports: the seams between the host core and its collaborators.

pub mod inbound;
pub mod outbound;

pub use inbound::{GenVm, RunContractRequest};
pub use outbound::{CalldataCodec, StateProxy};
