// IDSCP2リスナー
//
// TLSハンドシェイク後、フレーム単位でメッセージを読み取り、
// MessageHandlerに処理を委譲して応答を書き戻します。

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, instrument, warn};

use crate::common::error::{Error, Result};
use crate::common::types::IDSCP2_HEADER;
use crate::protocol::{CodecError, IdscpMessage, MessageCodec, MessageHandler, MessageType};

/// Replies to every message with body `PONG` and `idscp2-header: pong`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PongHandler;

#[async_trait::async_trait]
impl MessageHandler for PongHandler {
    async fn handle_message(&self, message: IdscpMessage) -> Result<Option<IdscpMessage>> {
        info!(
            "Server received: {} (Header: {})",
            message.body,
            message.idscp2_header().unwrap_or("null")
        );

        let reply = IdscpMessage::data("PONG").with_header(IDSCP2_HEADER, "pong");
        info!(
            "Server response: {} (Header: {})",
            reply.body,
            reply.idscp2_header().unwrap_or("null")
        );

        Ok(Some(reply))
    }
}

/// TLS-secured IDSCP2 listener.
pub struct IdscpServer {
    acceptor: TlsAcceptor,
    handler: Arc<dyn MessageHandler>,
    codec: MessageCodec,
}

impl IdscpServer {
    pub fn new(acceptor: TlsAcceptor, handler: Arc<dyn MessageHandler>, codec: MessageCodec) -> Self {
        Self {
            acceptor,
            handler,
            codec,
        }
    }

    /// Accept connections until `shutdown` flips or its sender is dropped.
    /// Each connection is served on its own task.
    #[instrument(skip_all)]
    pub async fn serve(self, listener: TcpListener, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!("IDSCP2 listener accepting on {}", local_addr);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!("Accepted connection from {}", peer);
                        let acceptor = self.acceptor.clone();
                        let handler = Arc::clone(&self.handler);
                        let codec = self.codec;
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(acceptor, stream, peer, handler, codec, shutdown).await {
                                warn!("Connection from {} ended with error: {}", peer, e);
                            }
                        });
                    }
                    Err(e) => warn!("Failed to accept connection: {}", e),
                },
                _ = shutdown.changed() => {
                    info!("IDSCP2 listener on {} shutting down", local_addr);
                    break;
                }
            }
        }

        Ok(())
    }
}

#[instrument(skip(acceptor, stream, handler, codec, shutdown))]
async fn serve_connection(
    acceptor: TlsAcceptor,
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<dyn MessageHandler>,
    codec: MessageCodec,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let mut tls = acceptor
        .accept(stream)
        .await
        .map_err(|e| Error::tls(format!("Handshake with {} failed: {}", peer, e)))?;

    loop {
        let received = tokio::select! {
            received = codec.read_message(&mut tls) => received,
            _ = shutdown.changed() => break,
        };

        let message = match received {
            Ok(message) => message,
            Err(CodecError::ConnectionClosed) => {
                debug!("Connection closed by {}", peer);
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if message.message_type == MessageType::Close {
            debug!("Peer {} requested close", peer);
            break;
        }

        match handler.handle_message(message).await {
            Ok(Some(reply)) => codec.write_message(&mut tls, &reply).await?,
            Ok(None) => {}
            Err(e) => {
                warn!("Handler failed for message from {}: {}", peer, e);
                codec
                    .write_message(&mut tls, &IdscpMessage::error(e.to_string()))
                    .await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pong_handler() {
        let ping = IdscpMessage::data("PING").with_header(IDSCP2_HEADER, "ping");
        let reply = PongHandler.handle_message(ping).await.unwrap().unwrap();

        assert_eq!(reply.body, "PONG");
        assert_eq!(reply.idscp2_header(), Some("pong"));
        assert_eq!(reply.message_type, MessageType::Data);
    }

    #[tokio::test]
    async fn test_pong_handler_without_header() {
        let reply = PongHandler
            .handle_message(IdscpMessage::data("hello"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply.body, "PONG");
    }
}
