//! Length-delimited framing (u32 little-endian length prefix).

use crate::core::error::{BridgeError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest payload either side may send. Game states and action lists are
/// a few hundred bytes; anything near this is a corrupt length prefix.
pub const MAX_FRAME_LEN: u32 = 1024 * 1024;

pub async fn write_frame<W: AsyncWrite + Unpin>(w: &mut W, payload: &[u8]) -> Result<()> {
    let len: u32 = payload
        .len()
        .try_into()
        .map_err(|_| BridgeError::FrameTooLarge {
            len: u32::MAX,
            max: MAX_FRAME_LEN,
        })?;
    if len > MAX_FRAME_LEN {
        return Err(BridgeError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }
    w.write_all(&len.to_le_bytes()).await?;
    w.write_all(payload).await?;
    w.flush().await?;
    Ok(())
}

pub async fn read_frame<R: AsyncRead + Unpin>(r: &mut R) -> Result<Vec<u8>> {
    let mut len_bytes = [0u8; 4];
    read_exact_or_eof(r, &mut len_bytes).await?;
    let len = u32::from_le_bytes(len_bytes);
    if len > MAX_FRAME_LEN {
        return Err(BridgeError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }
    let mut payload = vec![0u8; len as usize];
    read_exact_or_eof(r, &mut payload).await?;
    Ok(payload)
}

async fn read_exact_or_eof<R: AsyncRead + Unpin>(r: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut off = 0usize;
    while off < buf.len() {
        match r.read(&mut buf[off..]).await? {
            0 => return Err(BridgeError::UnexpectedEof),
            n => off += n,
        }
    }
    Ok(())
}
