//! Binary wire codec.
//!
//! All integers are little-endian and unsigned. The default width is 32
//! bits; fields that are 64 or 8 bits wide say so explicitly. Strings and
//! byte strings share framing: a u32 length followed by that many bytes.
//! Fixed-width blobs (addresses, slots) are raw bytes of the stated width.
//!
//! `read_exact` loops on short reads and treats a zero-byte read as
//! connection reset (§4.1); `send_all` loops on short writes. No message
//! boundary is implicit — callers consume exactly what the current method
//! prescribes.

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::domain::codes::ResultCode;
use crate::errors::ProtocolError;

/// Reads exactly `buf.len()` bytes, treating EOF before completion as a
/// connection reset.
pub async fn read_exact<R: AsyncReadExt + Unpin>(
    r: &mut R,
    buf: &mut [u8],
    context: &'static str,
) -> Result<(), ProtocolError> {
    let mut idx = 0;
    while idx < buf.len() {
        let n = r.read(&mut buf[idx..]).await?;
        if n == 0 {
            return Err(ProtocolError::ConnectionReset { context });
        }
        idx += n;
    }
    Ok(())
}

/// Reads `n` bytes and returns them as an owned `Vec`.
pub async fn read_exact_vec<R: AsyncReadExt + Unpin>(
    r: &mut R,
    n: usize,
    context: &'static str,
) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = vec![0u8; n];
    read_exact(r, &mut buf, context).await?;
    Ok(buf)
}

/// Reads a little-endian unsigned integer of `width` bytes (1, 4, or 8).
pub async fn recv_int<R: AsyncReadExt + Unpin>(
    r: &mut R,
    width: usize,
    context: &'static str,
) -> Result<u64, ProtocolError> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf[..width], context).await?;
    let mut value = 0u64;
    for (i, b) in buf[..width].iter().enumerate() {
        value |= (*b as u64) << (8 * i);
    }
    Ok(value)
}

/// Reads a u32 (the default wire width).
pub async fn recv_u32<R: AsyncReadExt + Unpin>(
    r: &mut R,
    context: &'static str,
) -> Result<u32, ProtocolError> {
    Ok(recv_int(r, 4, context).await? as u32)
}

/// Reads a u64.
pub async fn recv_u64<R: AsyncReadExt + Unpin>(
    r: &mut R,
    context: &'static str,
) -> Result<u64, ProtocolError> {
    recv_int(r, 8, context).await
}

/// Reads a u32 length followed by that many bytes.
pub async fn recv_bytes<R: AsyncReadExt + Unpin>(
    r: &mut R,
    context: &'static str,
) -> Result<Vec<u8>, ProtocolError> {
    let len = recv_u32(r, context).await? as usize;
    read_exact_vec(r, len, context).await
}

/// Reads a u32 length followed by that many bytes, validated as UTF-8.
pub async fn recv_string<R: AsyncReadExt + Unpin>(
    r: &mut R,
    context: &'static str,
) -> Result<String, ProtocolError> {
    let bytes = recv_bytes(r, context).await?;
    Ok(String::from_utf8(bytes)?)
}

/// Reads a `(ResultCode, payload)` pair: 1-byte tag, u32 length, payload.
/// Shared by `CONSUME_RESULT` and `POST_NONDET_RESULT`.
pub async fn read_result<R: AsyncReadExt + Unpin>(
    r: &mut R,
) -> Result<(ResultCode, Vec<u8>), ProtocolError> {
    let tag = recv_int(r, 1, "result code").await? as u8;
    let code = ResultCode::from_byte(tag)?;
    let data = recv_bytes(r, "result payload").await?;
    Ok((code, data))
}

/// Sends all of `data`, looping on short writes.
pub async fn send_all<W: AsyncWriteExt + Unpin>(
    w: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    w.write_all(data).await?;
    Ok(())
}

/// Sends a little-endian unsigned integer of `width` bytes (1, 4, or 8).
pub async fn send_int<W: AsyncWriteExt + Unpin>(
    w: &mut W,
    value: u64,
    width: usize,
) -> Result<(), ProtocolError> {
    let bytes = value.to_le_bytes();
    send_all(w, &bytes[..width]).await
}

/// Sends a u32 length followed by the bytes.
pub async fn send_bytes<W: AsyncWriteExt + Unpin>(
    w: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    send_int(w, data.len() as u64, 4).await?;
    send_all(w, data).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn recv_u32_is_little_endian() {
        let mut cur = Cursor::new(vec![0x01, 0x00, 0x00, 0x00]);
        assert_eq!(recv_u32(&mut cur, "t").await.unwrap(), 1);

        let mut cur = Cursor::new(vec![0x00, 0x01, 0x00, 0x00]);
        assert_eq!(recv_u32(&mut cur, "t").await.unwrap(), 256);
    }

    #[tokio::test]
    async fn recv_u64_reads_eight_bytes() {
        let mut cur = Cursor::new(0xFFFF_FFFF_FFFF_FFFFu64.to_le_bytes().to_vec());
        assert_eq!(recv_u64(&mut cur, "t").await.unwrap(), u64::MAX);
    }

    #[tokio::test]
    async fn recv_bytes_reads_length_prefixed_payload() {
        let mut payload = 3u32.to_le_bytes().to_vec();
        payload.extend_from_slice(b"abc");
        let mut cur = Cursor::new(payload);
        assert_eq!(recv_bytes(&mut cur, "t").await.unwrap(), b"abc".to_vec());
    }

    #[tokio::test]
    async fn short_read_is_connection_reset() {
        let mut cur = Cursor::new(vec![0x05, 0x00, 0x00, 0x00, b'a', b'b']); // claims 5, has 2
        let err = recv_bytes(&mut cur, "payload").await.unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionReset { .. }));
    }

    #[tokio::test]
    async fn send_bytes_round_trips_through_recv_bytes() {
        let mut buf = Vec::new();
        send_bytes(&mut buf, b"hello world").await.unwrap();
        let mut cur = Cursor::new(buf);
        assert_eq!(
            recv_bytes(&mut cur, "t").await.unwrap(),
            b"hello world".to_vec()
        );
    }

    #[tokio::test]
    async fn read_result_decodes_tag_and_payload() {
        let mut buf = vec![ResultCode::Rollback.to_byte()];
        buf.extend_from_slice(&3u32.to_le_bytes());
        buf.extend_from_slice(b"no!");
        let mut cur = Cursor::new(buf);
        let (code, data) = read_result(&mut cur).await.unwrap();
        assert_eq!(code, ResultCode::Rollback);
        assert_eq!(data, b"no!".to_vec());
    }
}
