//! Wire-protocol enum tags.

use crate::errors::ProtocolError;

/// A single-byte method tag read at the start of every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodCode {
    AppendCalldata,
    GetCode,
    StorageRead,
    StorageWrite,
    ConsumeResult,
    GetLeaderNondetResult,
    PostNondetResult,
    PostMessage,
}

impl MethodCode {
    /// Decodes a raw tag byte, failing on unknown codes (fatal per §4.3).
    pub fn from_byte(b: u8) -> Result<Self, ProtocolError> {
        Ok(match b {
            0 => Self::AppendCalldata,
            1 => Self::GetCode,
            2 => Self::StorageRead,
            3 => Self::StorageWrite,
            4 => Self::ConsumeResult,
            5 => Self::GetLeaderNondetResult,
            6 => Self::PostNondetResult,
            7 => Self::PostMessage,
            other => return Err(ProtocolError::UnknownMethod(other)),
        })
    }

    /// Encodes back to the raw tag byte (used by the test stub engine).
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            Self::AppendCalldata => 0,
            Self::GetCode => 1,
            Self::StorageRead => 2,
            Self::StorageWrite => 3,
            Self::ConsumeResult => 4,
            Self::GetLeaderNondetResult => 5,
            Self::PostNondetResult => 6,
            Self::PostMessage => 7,
        }
    }
}

/// Result tag shared by the engine's final result and per-call nondeterministic results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    None,
    Return,
    Rollback,
}

impl ResultCode {
    /// Decodes a raw tag byte, failing on unknown codes (fatal per §4.3).
    pub fn from_byte(b: u8) -> Result<Self, ProtocolError> {
        Ok(match b {
            0 => Self::None,
            1 => Self::Return,
            2 => Self::Rollback,
            other => return Err(ProtocolError::UnknownResultCode(other)),
        })
    }

    /// Encodes back to the raw tag byte.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Return => 1,
            Self::Rollback => 2,
        }
    }
}
