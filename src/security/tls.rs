// TLS 1.3設定と管理
//
// IDSCP2リスナーとクライアントのためのrustls設定を構築します。
// サーバー証明書（アイデンティティ）とトラストストアは設定から読み込みます。

use std::io::Cursor;
use std::sync::Arc;

use rustls::{
    Certificate, ClientConfig, PrivateKey, RootCertStore, ServerConfig, SupportedCipherSuite,
    ALL_CIPHER_SUITES,
};
use rustls_pemfile::{certs, pkcs8_private_keys, rsa_private_keys};
use tokio_rustls::{TlsAcceptor, TlsConnector};
use tracing::info;

use crate::common::error::Error;

/// TLS関連のエラー
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("TLS configuration error: {message}")]
    Configuration { message: String },

    #[error("Certificate error: {message}")]
    Certificate { message: String },

    #[error("Private key error: {message}")]
    PrivateKey { message: String },

    #[error("File I/O error: {message}")]
    FileOperation { message: String },
}

impl From<TlsError> for Error {
    fn from(err: TlsError) -> Self {
        Error::Tls(err.to_string())
    }
}

/// TLSの結果型
pub type TlsResult<T> = Result<T, TlsError>;

/// TLS設定
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// 証明書チェーン（PEM）
    pub cert_file: Option<String>,

    /// 秘密鍵（PEM, PKCS#8またはRSA）
    pub key_file: Option<String>,

    /// トラストストア（PEM形式のCAバンドル）
    pub ca_cert_file: Option<String>,

    /// 証明書エイリアス（ログ出力用）
    pub cert_alias: String,

    /// クライアント証明書を要求するか
    pub require_client_cert: bool,

    /// 許可する暗号スイート
    pub cipher_suites: Vec<String>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_file: None,
            key_file: None,
            ca_cert_file: None,
            cert_alias: "1.0.1".to_string(),
            require_client_cert: true,
            cipher_suites: vec![
                "TLS13_AES_256_GCM_SHA384".to_string(),
                "TLS13_AES_128_GCM_SHA256".to_string(),
                "TLS13_CHACHA20_POLY1305_SHA256".to_string(),
            ],
        }
    }
}

/// TLSサーバー設定（IDSCP2リスナー用）
pub struct TlsServerConfig {
    config: Arc<ServerConfig>,
}

impl TlsServerConfig {
    /// 新しいTLSサーバー設定を作成
    pub fn new(tls_config: &TlsConfig) -> TlsResult<Self> {
        let cert_file = tls_config.cert_file.as_deref().ok_or_else(|| TlsError::Configuration {
            message: "Server certificate file is required".to_string(),
        })?;
        let key_file = tls_config.key_file.as_deref().ok_or_else(|| TlsError::Configuration {
            message: "Server private key file is required".to_string(),
        })?;

        let certs = load_certificates(cert_file)?;
        let key = load_private_key(key_file)?;

        let builder = ServerConfig::builder()
            .with_cipher_suites(&get_cipher_suites(&tls_config.cipher_suites)?)
            .with_safe_default_kx_groups()
            .with_protocol_versions(&[&rustls::version::TLS13])
            .map_err(|e| TlsError::Configuration {
                message: format!("Failed to create TLS server config: {}", e),
            })?;

        let builder = if tls_config.require_client_cert {
            let ca_cert_file =
                tls_config.ca_cert_file.as_deref().ok_or_else(|| TlsError::Configuration {
                    message: "Trust store is required when client certificate verification is enabled"
                        .to_string(),
                })?;
            let roots = load_root_store(ca_cert_file)?;
            builder.with_client_cert_verifier(Arc::new(
                rustls::server::AllowAnyAuthenticatedClient::new(roots),
            ))
        } else {
            builder.with_no_client_auth()
        };

        let config = builder
            .with_single_cert(certs, key)
            .map_err(|e| TlsError::Configuration {
                message: format!("Failed to configure server certificate: {}", e),
            })?;

        info!(
            "Loaded server identity '{}' from {} (client auth: {})",
            tls_config.cert_alias, cert_file, tls_config.require_client_cert
        );

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// TLSアクセプターを取得
    pub fn acceptor(&self) -> TlsAcceptor {
        TlsAcceptor::from(self.config.clone())
    }
}

/// TLSクライアント設定（pingコマンド・テスト用）
pub struct TlsClientConfig {
    config: Arc<ClientConfig>,
}

impl TlsClientConfig {
    /// 新しいTLSクライアント設定を作成
    ///
    /// `ca_cert_file`が無い場合はwebpkiのルート証明書を使用します。
    /// `cert_file`と`key_file`があればクライアント証明書として提示します。
    pub fn new(tls_config: &TlsConfig) -> TlsResult<Self> {
        let roots = match tls_config.ca_cert_file.as_deref() {
            Some(ca_cert_file) => load_root_store(ca_cert_file)?,
            None => {
                let mut roots = RootCertStore::empty();
                roots.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
                    rustls::OwnedTrustAnchor::from_subject_spki_name_constraints(
                        ta.subject,
                        ta.spki,
                        ta.name_constraints,
                    )
                }));
                roots
            }
        };

        let builder = ClientConfig::builder()
            .with_cipher_suites(&get_cipher_suites(&tls_config.cipher_suites)?)
            .with_safe_default_kx_groups()
            .with_protocol_versions(&[&rustls::version::TLS13])
            .map_err(|e| TlsError::Configuration {
                message: format!("Failed to create TLS client config: {}", e),
            })?
            .with_root_certificates(roots);

        let config = match (tls_config.cert_file.as_deref(), tls_config.key_file.as_deref()) {
            (Some(cert_file), Some(key_file)) => builder
                .with_client_auth_cert(load_certificates(cert_file)?, load_private_key(key_file)?)
                .map_err(|e| TlsError::Configuration {
                    message: format!("Failed to configure client certificate: {}", e),
                })?,
            _ => builder.with_no_client_auth(),
        };

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// TLSコネクターを取得
    pub fn connector(&self) -> TlsConnector {
        TlsConnector::from(self.config.clone())
    }
}

/// PEMファイルからトラストストアを構築
fn load_root_store(ca_cert_file: &str) -> TlsResult<RootCertStore> {
    let mut roots = RootCertStore::empty();
    for cert in load_certificates(ca_cert_file)? {
        roots.add(&cert).map_err(|e| TlsError::Certificate {
            message: format!("Failed to add trusted certificate: {}", e),
        })?;
    }
    Ok(roots)
}

/// 証明書ファイルを読み込み
fn load_certificates(cert_file: &str) -> TlsResult<Vec<Certificate>> {
    let cert_data = std::fs::read(cert_file).map_err(|e| TlsError::FileOperation {
        message: format!("Failed to read certificate file '{}': {}", cert_file, e),
    })?;

    let certs = certs(&mut Cursor::new(cert_data)).map_err(|e| TlsError::Certificate {
        message: format!("Failed to parse certificates in '{}': {}", cert_file, e),
    })?;

    if certs.is_empty() {
        return Err(TlsError::Certificate {
            message: format!("No certificates found in '{}'", cert_file),
        });
    }

    Ok(certs.into_iter().map(Certificate).collect())
}

/// 秘密鍵ファイルを読み込み（PKCS8 → RSAの順に試行）
fn load_private_key(key_file: &str) -> TlsResult<PrivateKey> {
    let key_data = std::fs::read(key_file).map_err(|e| TlsError::FileOperation {
        message: format!("Failed to read private key file '{}': {}", key_file, e),
    })?;

    let parsers: [fn(&mut dyn std::io::BufRead) -> std::io::Result<Vec<Vec<u8>>>; 2] =
        [pkcs8_private_keys, rsa_private_keys];

    for parse in parsers {
        if let Ok(mut keys) = parse(&mut Cursor::new(key_data.as_slice())) {
            if !keys.is_empty() {
                return Ok(PrivateKey(keys.remove(0)));
            }
        }
    }

    Err(TlsError::PrivateKey {
        message: format!("No valid private key found in '{}'", key_file),
    })
}

/// 暗号スイートを取得
fn get_cipher_suites(suite_names: &[String]) -> TlsResult<Vec<SupportedCipherSuite>> {
    let mut suites = Vec::with_capacity(suite_names.len());

    for name in suite_names {
        let suite = match name.as_str() {
            "TLS13_AES_256_GCM_SHA384" => rustls::cipher_suite::TLS13_AES_256_GCM_SHA384,
            "TLS13_AES_128_GCM_SHA256" => rustls::cipher_suite::TLS13_AES_128_GCM_SHA256,
            "TLS13_CHACHA20_POLY1305_SHA256" => {
                rustls::cipher_suite::TLS13_CHACHA20_POLY1305_SHA256
            }
            _ => {
                return Err(TlsError::Configuration {
                    message: format!("Unsupported cipher suite: {}", name),
                })
            }
        };
        suites.push(suite);
    }

    if suites.is_empty() {
        // TLS 1.3のスイートをすべて許可
        suites = ALL_CIPHER_SUITES
            .iter()
            .filter(|suite| matches!(suite, SupportedCipherSuite::Tls13(_)))
            .copied()
            .collect();
    }

    Ok(suites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn self_signed() -> (NamedTempFile, NamedTempFile) {
        let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        (
            write_temp(&cert.serialize_pem().unwrap()),
            write_temp(&cert.serialize_private_key_pem()),
        )
    }

    #[test]
    fn test_tls_config_default() {
        let config = TlsConfig::default();
        assert_eq!(config.cert_alias, "1.0.1");
        assert!(config.require_client_cert);
        assert_eq!(config.cipher_suites.len(), 3);
    }

    #[test]
    fn test_cipher_suite_parsing() {
        let suite_names = vec![
            "TLS13_AES_256_GCM_SHA384".to_string(),
            "TLS13_AES_128_GCM_SHA256".to_string(),
        ];
        assert_eq!(get_cipher_suites(&suite_names).unwrap().len(), 2);
        assert!(get_cipher_suites(&["INVALID".to_string()]).is_err());
        assert!(!get_cipher_suites(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_server_config_from_pem() {
        let (cert, key) = self_signed();
        let config = TlsConfig {
            cert_file: Some(cert.path().to_string_lossy().into_owned()),
            key_file: Some(key.path().to_string_lossy().into_owned()),
            ca_cert_file: Some(cert.path().to_string_lossy().into_owned()),
            require_client_cert: true,
            ..TlsConfig::default()
        };
        assert!(TlsServerConfig::new(&config).is_ok());
        assert!(TlsClientConfig::new(&config).is_ok());
    }

    #[test]
    fn test_missing_files_are_reported() {
        let config = TlsConfig {
            cert_file: Some("/nonexistent/server.crt".to_string()),
            key_file: Some("/nonexistent/server.key".to_string()),
            ..TlsConfig::default()
        };
        let result = TlsServerConfig::new(&config);
        assert!(matches!(result, Err(TlsError::FileOperation { .. })));
    }

    #[test]
    fn test_client_auth_without_trust_store() {
        let (cert, key) = self_signed();
        let config = TlsConfig {
            cert_file: Some(cert.path().to_string_lossy().into_owned()),
            key_file: Some(key.path().to_string_lossy().into_owned()),
            require_client_cert: true,
            ..TlsConfig::default()
        };
        let result = TlsServerConfig::new(&config);
        assert!(matches!(result, Err(TlsError::Configuration { .. })));
    }

    #[test]
    fn test_key_file_without_key() {
        let (cert, _key) = self_signed();
        let result = load_private_key(&cert.path().to_string_lossy());
        assert!(matches!(result, Err(TlsError::PrivateKey { .. })));
    }
}
