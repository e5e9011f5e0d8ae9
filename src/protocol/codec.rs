// メッセージコーデック
//
// フレーム形式: 4バイト長プレフィックス（ビッグエンディアン） + UTF-8 JSON

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::messages::{IdscpMessage, ProtocolError};

const LENGTH_PREFIX: usize = 4;

/// コーデックエラー
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Message too large: {size} > {max_size}")]
    MessageTooLarge { size: u32, max_size: u32 },

    #[error("Invalid frame length: {length}")]
    InvalidLength { length: u32 },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Decoding error: {message}")]
    Decoding { message: String },
}

/// メッセージコーデック
#[derive(Debug, Clone, Copy)]
pub struct MessageCodec {
    max_message_size: u32,
}

impl MessageCodec {
    pub fn new(max_message_size: u32) -> Self {
        Self { max_message_size }
    }

    /// メッセージを1フレームにエンコード
    pub fn encode(&self, message: &IdscpMessage) -> Result<Vec<u8>, CodecError> {
        let json = message.to_json()?;
        let length = self.check_length(json.len() as u32)?;

        let mut frame = Vec::with_capacity(LENGTH_PREFIX + json.len());
        frame.extend_from_slice(&length.to_be_bytes());
        frame.extend_from_slice(json.as_bytes());
        Ok(frame)
    }

    /// ストリームから1メッセージを読み取り
    pub async fn read_message<R>(&self, reader: &mut R) -> Result<IdscpMessage, CodecError>
    where
        R: AsyncRead + Unpin,
    {
        let mut prefix = [0u8; LENGTH_PREFIX];
        read_exact_or_closed(reader, &mut prefix).await?;

        let length = self.check_length(u32::from_be_bytes(prefix))?;
        let mut payload = vec![0u8; length as usize];
        read_exact_or_closed(reader, &mut payload).await?;

        self.parse_payload(&payload)
    }

    /// ストリームに1メッセージを書き込み
    pub async fn write_message<W>(
        &self,
        writer: &mut W,
        message: &IdscpMessage,
    ) -> Result<(), CodecError>
    where
        W: AsyncWrite + Unpin,
    {
        let frame = self.encode(message)?;
        writer.write_all(&frame).await?;
        writer.flush().await?;
        Ok(())
    }

    fn check_length(&self, length: u32) -> Result<u32, CodecError> {
        if length == 0 {
            return Err(CodecError::InvalidLength { length });
        }
        if length > self.max_message_size {
            return Err(CodecError::MessageTooLarge {
                size: length,
                max_size: self.max_message_size,
            });
        }
        Ok(length)
    }

    fn parse_payload(&self, payload: &[u8]) -> Result<IdscpMessage, CodecError> {
        let json = std::str::from_utf8(payload).map_err(|e| CodecError::Decoding {
            message: format!("Invalid UTF-8: {}", e),
        })?;

        IdscpMessage::from_json(json).map_err(|e| CodecError::Decoding {
            message: e.to_string(),
        })
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(1024 * 1024)
    }
}

// EOFは切断として扱う
async fn read_exact_or_closed<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), CodecError>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(CodecError::ConnectionClosed),
        Err(e) => Err(CodecError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::IDSCP2_HEADER;

    fn ping() -> IdscpMessage {
        IdscpMessage::data("PING").with_header(IDSCP2_HEADER, "ping")
    }

    #[tokio::test]
    async fn test_encoded_frame_read_back() {
        let codec = MessageCodec::default();
        let message = ping();

        let frame = codec.encode(&message).unwrap();
        let length = u32::from_be_bytes(frame[..4].try_into().unwrap()) as usize;
        assert_eq!(frame.len(), 4 + length);

        let mut reader: &[u8] = &frame;
        let decoded = codec.read_message(&mut reader).await.unwrap();
        assert_eq!(decoded.id, message.id);
        assert_eq!(decoded.idscp2_header(), Some("ping"));
        assert_eq!(decoded.body, "PING");
    }

    #[test]
    fn test_message_too_large() {
        let codec = MessageCodec::new(64);
        let result = codec.encode(&ping());
        assert!(matches!(result, Err(CodecError::MessageTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_invalid_frames() {
        let codec = MessageCodec::default();

        let mut empty: &[u8] = &[0, 0, 0, 0];
        assert!(matches!(
            codec.read_message(&mut empty).await,
            Err(CodecError::InvalidLength { length: 0 })
        ));

        let mut frame = 12u32.to_be_bytes().to_vec();
        frame.extend_from_slice(b"invalid json");
        let mut reader: &[u8] = &frame;
        assert!(matches!(
            codec.read_message(&mut reader).await,
            Err(CodecError::Decoding { .. })
        ));

        // 宣言長に満たないフレームは切断扱い
        let mut truncated = 100u32.to_be_bytes().to_vec();
        truncated.extend_from_slice(b"{}");
        let mut reader: &[u8] = &truncated;
        assert!(matches!(
            codec.read_message(&mut reader).await,
            Err(CodecError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_stream_read_write() {
        let codec = MessageCodec::default();
        let (mut client, mut server) = tokio::io::duplex(4096);

        let message = ping();
        codec.write_message(&mut client, &message).await.unwrap();
        let received = codec.read_message(&mut server).await.unwrap();

        assert_eq!(received.id, message.id);
        assert_eq!(received.body, "PING");
    }

    #[tokio::test]
    async fn test_connection_closed() {
        let codec = MessageCodec::default();
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);

        let result = codec.read_message(&mut server).await;
        assert!(matches!(result, Err(CodecError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_oversized_prefix_rejected_before_read() {
        let codec = MessageCodec::new(16);
        let mut reader: &[u8] = &[0, 0, 1, 0];
        let result = codec.read_message(&mut reader).await;
        assert!(matches!(result, Err(CodecError::MessageTooLarge { .. })));
    }
}
