//! セキュリティモジュール
//!
//! IDSCP2リスナーのTLS 1.3資格情報を提供します。
//! 証明書・鍵・トラストストアは設定から読み込み、ソースに埋め込みません。

pub mod tls;

pub use tls::{TlsClientConfig, TlsConfig, TlsError, TlsResult, TlsServerConfig};
