//! Host dispatch loop (§4.3, §6.2).
//!
//! | Method | Request after tag | Response |
//! |---|---|---|
//! | `APPEND_CALLDATA` | (none) | u32 length, then bytes |
//! | `GET_CODE` | 20-byte address | u32 length, then bytes |
//! | `STORAGE_READ` | u64 gas, 20-byte account, 32-byte slot, u32 index, u32 length `L` | u64 gas-after, then exactly `L` bytes |
//! | `STORAGE_WRITE` | u64 gas, 20-byte account, 32-byte slot, u32 index, u32 length `L`, `L` bytes | u64 gas-after |
//! | `CONSUME_RESULT` | 1-byte `ResultCode`, u32 length, payload bytes | (none — terminates loop) |
//! | `GET_LEADER_NONDET_RESULT` | u32 call number | 1 byte `ResultCode`; if `NONE`, stop; else u32 length, payload |
//! | `POST_NONDET_RESULT` | u32 call number, 1 byte `ResultCode`, u32 length, payload | (none) |
//! | `POST_MESSAGE` | 20-byte account, u64 gas, u32 calldata length, calldata, u32 code length, code | (none) |
//!
//! Reads one method tag at a time and services it, delegating state ops to
//! the [`StateProxy`] and recording engine-originated results into the
//! [`Session`]. Returns normally on `CONSUME_RESULT`; any other error is
//! fatal and propagated to the caller.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::domain::{Address, FinalResult, MethodCode, PendingTransaction, ResultCode, Session};
use crate::domain::address::{ACCOUNT_ADDR_SIZE, GENERIC_ADDR_SIZE};
use crate::errors::HostError;
use crate::ports::outbound::StateProxy;
use crate::wire;

/// Runs the dispatch loop against `stream` until `CONSUME_RESULT` is
/// received or a fatal error occurs.
pub async fn run<S>(
    session: &mut Session,
    state: &dyn StateProxy,
    stream: &mut S,
) -> Result<(), HostError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let tag = wire::recv_int(stream, 1, "method tag").await? as u8;
        let method = MethodCode::from_byte(tag)?;
        tracing::trace!(?method, "dispatching");

        match method {
            MethodCode::AppendCalldata => {
                wire::send_bytes(stream, &session.calldata).await?;
            }
            MethodCode::GetCode => {
                let addr = read_address(stream).await?;
                let code = state
                    .get_code(addr)
                    .await
                    .map_err(HostError::from)?;
                wire::send_bytes(stream, &code).await?;
            }
            MethodCode::StorageRead => {
                let gas_before = wire::recv_u64(stream, "gas_before").await?;
                let account = read_address(stream).await?;
                let slot = read_slot(stream).await?;
                let index = wire::recv_u32(stream, "index").await?;
                let le = wire::recv_u32(stream, "length").await?;
                let (data, gas_after) = state
                    .storage_read(gas_before, account, slot, index, le)
                    .await
                    .map_err(HostError::from)?;
                if data.len() != le as usize {
                    return Err(crate::errors::ProtocolError::StorageReadLengthMismatch {
                        expected: le,
                        got: data.len(),
                    }
                    .into());
                }
                wire::send_int(stream, gas_after, 8).await?;
                wire::send_all(stream, &data).await?;
            }
            MethodCode::StorageWrite => {
                let gas_before = wire::recv_u64(stream, "gas_before").await?;
                let account = read_address(stream).await?;
                let slot = read_slot(stream).await?;
                let index = wire::recv_u32(stream, "index").await?;
                let le = wire::recv_u32(stream, "length").await?;
                let data = wire::read_exact_vec(stream, le as usize, "storage_write data").await?;
                let gas_after = state
                    .storage_write(gas_before, account, slot, index, &data)
                    .await
                    .map_err(HostError::from)?;
                wire::send_int(stream, gas_after, 8).await?;
            }
            MethodCode::ConsumeResult => {
                let (code, data) = wire::read_result(stream).await?;
                // A NONE tag leaves `final_result` unset; the assembler then
                // falls through to its composite-failure branch (§4.6).
                session.final_result = match code {
                    ResultCode::Return => Some(FinalResult::Return(data)),
                    ResultCode::Rollback => Some(FinalResult::Rollback(
                        String::from_utf8(data).map_err(crate::errors::ProtocolError::from)?,
                    )),
                    ResultCode::None => None,
                };
                return Ok(());
            }
            MethodCode::GetLeaderNondetResult => {
                let call_no = wire::recv_u32(stream, "call_no").await?;
                respond_leader_nondet_result(session, stream, call_no).await?;
            }
            MethodCode::PostNondetResult => {
                let call_no = wire::recv_u32(stream, "call_no").await?;
                let (code, payload) = wire::read_result(stream).await?;
                let mut encoded = Vec::with_capacity(1 + payload.len());
                encoded.push(code.to_byte());
                encoded.extend_from_slice(&payload);
                session.eq_outputs.insert(call_no, encoded);
            }
            MethodCode::PostMessage => {
                let account = read_address(stream).await?;
                let gas = wire::recv_u64(stream, "gas").await?;
                let calldata = wire::recv_bytes(stream, "post_message calldata").await?;
                let code = wire::recv_bytes(stream, "post_message code").await?;
                tracing::trace!(
                    gas,
                    code_len = code.len(),
                    "received POST_MESSAGE gas/code fields (accepted but not yet persisted)"
                );
                session.pending_transactions.push(PendingTransaction {
                    address: account.to_hex(),
                    calldata,
                });
            }
        }
    }
}

async fn respond_leader_nondet_result<S>(
    session: &Session,
    stream: &mut S,
    call_no: u32,
) -> Result<(), HostError>
where
    S: AsyncWrite + Unpin,
{
    let Some(leader_results) = &session.leader_results else {
        wire::send_all(stream, &[ResultCode::None.to_byte()]).await?;
        return Ok(());
    };
    // A validator asking for a call number the leader never recorded is a
    // leader/validator divergence, not a normal "nothing here yet" case —
    // fatal to the loop.
    let entry = leader_results
        .get(&call_no)
        .ok_or(crate::errors::ProtocolError::MissingLeaderNondetResult(call_no))?;
    let code = crate::domain::ResultCode::from_byte(entry[0])?;
    let payload = &entry[1..];
    match code {
        ResultCode::Rollback => {
            // Re-encoded as a UTF-8 length-prefixed string (§6.2).
            let as_str = String::from_utf8(payload.to_vec())
                .map_err(crate::errors::ProtocolError::from)?;
            wire::send_all(stream, &[ResultCode::Rollback.to_byte()]).await?;
            wire::send_bytes(stream, as_str.as_bytes()).await?;
        }
        ResultCode::Return => {
            wire::send_all(stream, &[ResultCode::Return.to_byte()]).await?;
            wire::send_bytes(stream, payload).await?;
        }
        ResultCode::None => {
            return Err(crate::errors::ProtocolError::UnknownResultCode(entry[0]).into())
        }
    }
    Ok(())
}

async fn read_address<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Address, HostError> {
    let bytes = wire::read_exact_vec(stream, ACCOUNT_ADDR_SIZE, "account address").await?;
    Ok(Address::from_slice(&bytes).expect("length checked by read_exact_vec"))
}

async fn read_slot<S: AsyncRead + Unpin>(stream: &mut S) -> Result<[u8; 32], HostError> {
    let bytes = wire::read_exact_vec(stream, GENERIC_ADDR_SIZE, "storage slot").await?;
    Ok(<[u8; 32]>::try_from(bytes.as_slice()).expect("length checked by read_exact_vec"))
}
