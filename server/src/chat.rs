//! Ephemeral UDP side channel moving chat payloads outside the main
//! command stream. Best-effort: no retries, no per-message acks.

use log::debug;
use shared::SEND_COMPLETE;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

const DATAGRAM_MAX: usize = 2048;

/// Pushes one batch of queued chat lines to `dest`, one datagram per
/// line, closed by the `SEND COMPLETE` sentinel.
pub async fn push_batch(dest: SocketAddr, lines: &[String]) -> io::Result<()> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    for line in lines {
        socket.send_to(line.as_bytes(), dest).await?;
    }
    socket.send_to(SEND_COMPLETE.as_bytes(), dest).await?;
    debug!("Pushed {} chat lines to {}", lines.len(), dest);
    Ok(())
}

/// An ephemeral receive point for one incoming chat message.
pub struct ChatReceiver {
    socket: UdpSocket,
}

impl ChatReceiver {
    /// Binds a fresh wildcard socket and reports the port the client
    /// should push to.
    pub async fn bind() -> io::Result<(Self, u16)> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let port = socket.local_addr()?.port();
        Ok((Self { socket }, port))
    }

    /// Receives a single message payload, trimmed of trailing
    /// whitespace.
    pub async fn recv_message(self) -> io::Result<String> {
        let mut buf = [0u8; DATAGRAM_MAX];
        let (len, from) = self.socket.recv_from(&mut buf).await?;
        debug!("Received chat payload from {}", from);
        Ok(String::from_utf8_lossy(&buf[..len]).trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_batch_delivers_lines_then_sentinel() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let dest = receiver.local_addr().unwrap();

        let lines = vec![
            "[steve (ALL)] hello".to_string(),
            "[ada (ALL)] hi back".to_string(),
        ];
        push_batch(dest, &lines).await.unwrap();

        let mut buf = [0u8; DATAGRAM_MAX];
        let mut received = Vec::new();
        loop {
            let (len, _) = receiver.recv_from(&mut buf).await.unwrap();
            let text = String::from_utf8_lossy(&buf[..len]).to_string();
            if text == SEND_COMPLETE {
                break;
            }
            received.push(text);
        }
        assert_eq!(received, lines);
    }

    #[tokio::test]
    async fn test_empty_batch_still_sends_sentinel() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let dest = receiver.local_addr().unwrap();

        push_batch(dest, &[]).await.unwrap();

        let mut buf = [0u8; DATAGRAM_MAX];
        let (len, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&buf[..len]), SEND_COMPLETE);
    }

    #[tokio::test]
    async fn test_receiver_takes_one_trimmed_message() {
        let (chat_rx, port) = ChatReceiver::bind().await.unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender
            .send_to(b"surrender now\n", ("127.0.0.1", port))
            .await
            .unwrap();

        let text = chat_rx.recv_message().await.unwrap();
        assert_eq!(text, "surrender now");
    }
}
