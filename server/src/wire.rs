//! Text framing for the command stream.
//!
//! A frame is one or more non-empty UTF-8 lines followed by one empty
//! line. Single-token exchanges are one-line frames; the notification
//! batch and the serialized grid ride as multi-line frames, keeping
//! their newline-joined grammars intact on the wire.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Reads one frame, returning its lines newline-joined without the
/// terminator. EOF before the terminator is a transport error.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut payload = String::new();
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed mid-frame",
            ));
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            // Stray terminators before any content are skipped rather
            // than surfaced as empty commands.
            if payload.is_empty() {
                continue;
            }
            return Ok(payload);
        }
        if !payload.is_empty() {
            payload.push('\n');
        }
        payload.push_str(trimmed);
    }
}

/// Writes `payload` (newline-joined lines, no trailing newline) as one
/// frame and flushes.
pub async fn write_frame<W>(writer: &mut W, payload: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(payload.as_bytes()).await?;
    writer.write_all(b"\n\n").await?;
    writer.flush().await
}
