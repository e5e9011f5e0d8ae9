//! IDSCP2ワイヤープロトコル
//!
//! リスナーとクライアントが共有するメッセージ形式とフレーミング：
//! - 4バイト長プレフィックス + JSON
//! - ヘッダー付きメッセージ
//! - メッセージハンドラー特性

pub mod codec;
pub mod messages;

pub use codec::{CodecError, MessageCodec};
pub use messages::{IdscpMessage, MessageType, MessageVersion, ProtocolError};

use crate::common::error::Error;

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        Error::Protocol(err.to_string())
    }
}

/// 受信メッセージの処理（ルートのプロセッサに相当）
///
/// `Ok(None)` は応答を返さないことを意味します。
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, message: IdscpMessage) -> crate::Result<Option<IdscpMessage>>;
}
