// idscp-bridgeの設定管理
//
// 複数のソースから設定を読み込み管理：
// CLI引数 > 環境変数 > 設定ファイル > デフォルト値

use crate::common::error::{Error, Result};
use crate::security::TlsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "idscp-bridge.toml";

// メイン設定構造体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub idscp: IdscpConfig,
    #[serde(default)]
    pub rest: RestConfig,
    #[serde(default = "default_tls")]
    pub tls: TlsConfig,
}

// ルーティングコンテキスト設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    pub name: String,
}

// IDSCP2リスナー設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdscpConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_message_size")]
    pub max_message_size: u32,
}

// RESTイングレス設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            name: "camel-1".to_string(),
        }
    }
}

impl Default for IdscpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 29292,
            max_message_size: default_max_message_size(),
        }
    }
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            base_path: default_base_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            context: ContextConfig::default(),
            idscp: IdscpConfig::default(),
            rest: RestConfig::default(),
            tls: default_tls(),
        }
    }
}

impl Config {
    // ファイルから設定を読み込み
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    // 設定ファイル（存在すれば）＋環境変数から読み込み
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::resolve(path)?;
        config.validate()?;
        Ok(config)
    }

    // 検証前の設定を合成（CLI引数で上書きしてから検証する場合に使用）
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::read_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env();
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    // 設定をファイルに保存
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| Error::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    // サンプル設定を生成
    pub fn sample() -> Self {
        let mut config = Self::default();
        config.context.name = "connector-context".to_string();
        config.rest.port = 8081;
        config
    }

    // 環境変数で上書き
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("IDSCP_BRIDGE_IDSCP_HOST") {
            self.idscp.host = host;
        }
        if let Some(port) = env_port("IDSCP_BRIDGE_IDSCP_PORT") {
            self.idscp.port = port;
        }
        if let Ok(host) = std::env::var("IDSCP_BRIDGE_REST_HOST") {
            self.rest.host = host;
        }
        if let Some(port) = env_port("IDSCP_BRIDGE_REST_PORT") {
            self.rest.port = port;
        }
        if let Ok(path) = std::env::var("IDSCP_BRIDGE_TLS_CERT_FILE") {
            self.tls.cert_file = Some(path);
        }
        if let Ok(path) = std::env::var("IDSCP_BRIDGE_TLS_KEY_FILE") {
            self.tls.key_file = Some(path);
        }
        if let Ok(path) = std::env::var("IDSCP_BRIDGE_TLS_CA_CERT_FILE") {
            self.tls.ca_cert_file = Some(path);
        }
    }

    // 設定の妥当性を検証
    pub fn validate(&self) -> Result<()> {
        if self.context.name.trim().is_empty() {
            return Err(Error::config("Context name cannot be empty"));
        }

        if self.idscp.host.is_empty() {
            return Err(Error::config("IDSCP2 host cannot be empty"));
        }

        if self.idscp.port == 0 {
            return Err(Error::config("IDSCP2 port cannot be 0"));
        }

        if self.idscp.max_message_size == 0 {
            return Err(Error::config("IDSCP2 max message size cannot be 0"));
        }

        if self.rest.host.is_empty() {
            return Err(Error::config("REST host cannot be empty"));
        }

        if self.rest.port == 0 {
            return Err(Error::config("REST port cannot be 0"));
        }

        if !self.rest.base_path.starts_with('/') {
            return Err(Error::config(format!(
                "REST base path must start with '/': {}",
                self.rest.base_path
            )));
        }

        if self.idscp.host == self.rest.host && self.idscp.port == self.rest.port {
            return Err(Error::config(format!(
                "IDSCP2 and REST cannot share the endpoint {}:{}",
                self.rest.host, self.rest.port
            )));
        }

        if self.tls.cert_file.is_none() || self.tls.key_file.is_none() {
            return Err(Error::config("TLS certificate and key files must be configured"));
        }

        if self.tls.require_client_cert && self.tls.ca_cert_file.is_none() {
            return Err(Error::config(
                "A trust store (ca_cert_file) is required when client certificates are required",
            ));
        }

        Ok(())
    }

    // IDSCP2リスナーのバインドアドレス
    pub fn idscp_addr(&self) -> String {
        format!("{}:{}", self.idscp.host, self.idscp.port)
    }

    // RESTイングレスのバインドアドレス
    pub fn rest_addr(&self) -> String {
        format!("{}:{}", self.rest.host, self.rest.port)
    }
}

fn env_port(name: &str) -> Option<u16> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn default_max_message_size() -> u32 {
    1024 * 1024
}

fn default_base_path() -> String {
    "/camel-example-api".to_string()
}

// サーバー証明書・トラストストアのデフォルト配置
fn default_tls() -> TlsConfig {
    TlsConfig {
        cert_file: Some("./etc/server.crt".to_string()),
        key_file: Some("./etc/server.key".to_string()),
        ca_cert_file: Some("./etc/truststore.pem".to_string()),
        ..TlsConfig::default()
    }
}
