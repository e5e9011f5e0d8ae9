// IDSCP2クライアント
//
// pingコマンドと結合テストで使用する、単一接続のリクエスト／レスポンス型クライアント

use std::time::Duration;

use rustls::ServerName;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::client::TlsStream;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use crate::common::error::{Error, Result};
use crate::protocol::{IdscpMessage, MessageCodec, MessageType};
use crate::security::{TlsClientConfig, TlsConfig};

/// 接続タイムアウト
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// 応答待ちタイムアウト
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct IdscpClient {
    stream: TlsStream<TcpStream>,
    codec: MessageCodec,
}

impl IdscpClient {
    /// Connect to `addr` and complete the TLS handshake, verifying the server
    /// certificate against `server_name`.
    #[instrument(skip(tls_config))]
    pub async fn connect(addr: &str, server_name: &str, tls_config: &TlsConfig) -> Result<Self> {
        let name = ServerName::try_from(server_name)
            .map_err(|_| Error::tls(format!("Invalid server name '{}'", server_name)))?;
        let connector = TlsClientConfig::new(tls_config)?.connector();

        let tcp_stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::network(format!("Connection to {} timed out", addr)))?
            .map_err(|e| Error::network(format!("TCP connection to {} failed: {}", addr, e)))?;

        let stream = connector
            .connect(name, tcp_stream)
            .await
            .map_err(|e| Error::tls(format!("TLS handshake with {} failed: {}", addr, e)))?;

        info!("Connected to IDSCP2 endpoint {}", addr);
        Ok(Self {
            stream,
            codec: MessageCodec::default(),
        })
    }

    pub fn with_codec(mut self, codec: MessageCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Send one message and wait for the reply.
    pub async fn exchange(&mut self, message: &IdscpMessage) -> Result<IdscpMessage> {
        self.codec.write_message(&mut self.stream, message).await?;
        debug!("Sent message {}", message.id);

        let reply = timeout(RESPONSE_TIMEOUT, self.codec.read_message(&mut self.stream))
            .await
            .map_err(|_| Error::network("Timed out waiting for a reply"))??;
        debug!("Received reply {}", reply.id);

        if reply.message_type == MessageType::Error {
            return Err(Error::protocol(format!("Peer reported an error: {}", reply.body)));
        }
        Ok(reply)
    }

    /// Announce the close and shut the TLS stream down.
    pub async fn close(mut self) -> Result<()> {
        let close = IdscpMessage::new(MessageType::Close, "");
        self.codec.write_message(&mut self.stream, &close).await?;
        self.stream.shutdown().await?;
        Ok(())
    }
}
