//! Length-prefixed framing over byte streams.
//!
//! Each frame is a 4-byte big-endian payload length followed by the payload.
//! Oversized frames are rejected with [`io::ErrorKind::InvalidData`] in both
//! directions.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use widget_sync_core::{MessageToHost, WireFormat};

use crate::error::BridgeError;
use crate::transport::InboundFrame;

/// Reads one frame. Returns `Ok(None)` on a clean end of stream before a
/// length prefix.
///
/// # Errors
///
/// Fails with `InvalidData` if the announced length exceeds `max_payload`
/// and with `UnexpectedEof` if the stream ends inside a frame.
pub async fn read_frame<R>(reader: &mut R, max_payload: usize) -> io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0_u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_payload {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {len} > {max_payload}"),
        ));
    }

    let mut payload = vec![0_u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

/// Writes one frame and flushes.
///
/// # Errors
///
/// Fails with `InvalidData` if the payload exceeds `max_payload`.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8], max_payload: usize) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > max_payload {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {} > {}", payload.len(), max_payload),
        ));
    }
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "payload exceeds u32"))?;

    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await
}

/// Reads frames from `reader` and forwards them as host frames until end of
/// stream or until the receiving side goes away.
///
/// # Errors
///
/// Returns [`BridgeError::Io`] on framing and I/O errors from the reader.
pub async fn reader_loop<R>(
    mut reader: R,
    frames: mpsc::Sender<InboundFrame>,
    max_payload: usize,
) -> Result<(), BridgeError>
where
    R: AsyncRead + Unpin,
{
    while let Some(payload) = read_frame(&mut reader, max_payload).await? {
        if frames.send(InboundFrame::from_parent(payload)).await.is_err() {
            debug!("inbound consumer gone; stopping reader");
            break;
        }
    }
    Ok(())
}

/// Encodes queued messages and writes them to `writer` until every sender is
/// dropped. Messages that cannot be encoded or exceed the frame cap are
/// skipped with a warning.
///
/// # Errors
///
/// Returns [`BridgeError::Io`] on I/O errors from the writer.
pub async fn writer_loop<W>(
    mut messages: mpsc::Receiver<MessageToHost>,
    mut writer: W,
    format: WireFormat,
    max_payload: usize,
) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = messages.recv().await {
        let payload = match format.encode(&message) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(kind = message.kind(), error = %err, "failed to encode outbound message");
                continue;
            }
        };
        match write_frame(&mut writer, &payload, max_payload).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                warn!(kind = message.kind(), error = %err, "dropping oversized outbound message");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
