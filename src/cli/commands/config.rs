// configコマンドの実装

use crate::cli::commands::CommandResult;
use crate::cli::{ConfigAction, ConfigArgs};
use crate::common::config::{Config, DEFAULT_CONFIG_FILE};
use crate::common::error::Error;
use std::path::PathBuf;
use tracing::info;

pub async fn execute(args: ConfigArgs) -> CommandResult {
    match args.action {
        ConfigAction::Show { config } => show_config(config).await,
        ConfigAction::Validate { file } => validate_config(file).await,
        ConfigAction::Generate { output } => generate_config(output).await,
    }
}

// ファイル・環境変数・デフォルト値を合成した実効設定を表示
async fn show_config(file: Option<PathBuf>) -> CommandResult {
    let config = Config::load(file.as_deref())?;
    let toml_str = toml::to_string_pretty(&config)
        .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;

    println!("Effective configuration:");
    println!("{}", toml_str);

    Ok(())
}

async fn validate_config(file: Option<PathBuf>) -> CommandResult {
    let config_path = file.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if !config_path.exists() {
        return Err(Error::config(format!(
            "Configuration file '{}' not found",
            config_path.display()
        )));
    }

    info!("Validating configuration file: {}", config_path.display());

    match Config::from_file(&config_path) {
        Ok(config) => {
            println!("✅ Configuration is valid");
            println!("🧭 Context: {}", config.context.name);
            println!("🔐 IDSCP2: {}", config.idscp_addr());
            println!("🌐 REST: {}{}/bean", config.rest_addr(), config.rest.base_path.trim_end_matches('/'));
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {}", e);
            return Err(e);
        }
    }

    Ok(())
}

async fn generate_config(output: Option<PathBuf>) -> CommandResult {
    let output_path = output.unwrap_or_else(|| PathBuf::from("idscp-bridge-sample.toml"));

    if output_path.exists() {
        return Err(Error::config(format!(
            "Output file '{}' already exists",
            output_path.display()
        )));
    }

    Config::sample().to_file(&output_path)?;

    println!("✅ Sample configuration generated: {}", output_path.display());
    println!("📝 Point the [tls] section at your certificate, key and trust store");

    Ok(())
}
