// serveコマンドの実装

use crate::cli::commands::CommandResult;
use crate::cli::{parse_host_port, ServeArgs};
use crate::common::config::Config;
use crate::server::Connector;
use tracing::{info, warn};

pub async fn execute(args: ServeArgs) -> CommandResult {
    let config = resolve_config(&args)?;

    info!(
        "Starting connector '{}' (IDSCP2 {}, REST {})",
        config.context.name,
        config.idscp_addr(),
        config.rest_addr()
    );

    Connector::new(config)?
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
            }
        })
        .await
}

// CLI引数 > 環境変数 > 設定ファイル > デフォルト値
fn resolve_config(args: &ServeArgs) -> crate::Result<Config> {
    let mut config = Config::resolve(args.config.as_deref())?;

    if let Some(idscp) = args.idscp.as_deref() {
        let (host, port) = parse_host_port(idscp)?;
        config.idscp.host = host;
        config.idscp.port = port;
    }
    if let Some(rest) = args.rest.as_deref() {
        let (host, port) = parse_host_port(rest)?;
        config.rest.host = host;
        config.rest.port = port;
    }

    config.validate()?;
    Ok(config)
}
