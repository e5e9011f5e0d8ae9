// IDSCP2メッセージ定義
//
// リスナーとクライアント間でやり取りされるメッセージ：
// - ヘッダー（文字列マップ）と本文
// - バージョニング対応

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::types::IDSCP2_HEADER;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageVersion {
    pub major: u32,
    pub minor: u32,
}

impl Default for MessageVersion {
    fn default() -> Self {
        Self { major: 2, minor: 0 }
    }
}

impl std::fmt::Display for MessageVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// メッセージタイプ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// アプリケーションデータ
    Data,
    /// 処理エラーの通知
    Error,
    /// 接続終了の通知
    Close,
}

/// IDSCP2メッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdscpMessage {
    pub id: Uuid,

    pub version: MessageVersion,

    pub timestamp: DateTime<Utc>,

    pub message_type: MessageType,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub body: String,
}

/// プロトコルエラー
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IdscpMessage {
    /// 新しいメッセージを作成
    pub fn new(message_type: MessageType, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            version: MessageVersion::default(),
            timestamp: Utc::now(),
            message_type,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// データメッセージを作成
    pub fn data(body: impl Into<String>) -> Self {
        Self::new(MessageType::Data, body)
    }

    /// エラーメッセージを作成
    pub fn error(reason: impl Into<String>) -> Self {
        Self::new(MessageType::Error, reason)
    }

    /// ヘッダーを設定
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// ヘッダーを取得
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// `idscp2-header`の値
    pub fn idscp2_header(&self) -> Option<&str> {
        self.header(IDSCP2_HEADER)
    }

    /// JSONにシリアライズ
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::from)
    }

    /// JSONからデシリアライズ
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(ProtocolError::from)
    }
}
