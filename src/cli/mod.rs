// idscp-bridgeのCLIモジュール
//
// コマンドライン引数の解析とコマンド実行機能を提供

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(
    name = "idscp-bridge",
    about = "IDSCP2 connector with a REST ingress",
    version = env!("CARGO_PKG_VERSION"),
    long_about = "idscp-bridge hosts a TLS-secured IDSCP2 listener and a REST ingress on one routing context, and reports the active routes and components at startup."
)]
pub struct CliArgs {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the connector until Ctrl-C
    Serve(ServeArgs),

    /// List routes and components
    List(ListArgs),

    /// Send one message to an IDSCP2 endpoint
    Ping(PingArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Show version information
    Version,
}

#[derive(Parser)]
pub struct ServeArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// IDSCP2 listener address
    #[arg(long, value_name = "HOST:PORT")]
    pub idscp: Option<String>,

    /// REST listener address
    #[arg(long, value_name = "HOST:PORT")]
    pub rest: Option<String>,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show only routes
    #[arg(short, long, conflicts_with = "components")]
    pub routes: bool,

    /// Show only components
    #[arg(long)]
    pub components: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser)]
pub struct PingArgs {
    /// IDSCP2 endpoint to contact
    #[arg(short, long, value_name = "HOST:PORT")]
    pub server: String,

    /// DNS name expected in the server certificate (default: host part of --server)
    #[arg(short, long, value_name = "DNS")]
    pub name: Option<String>,

    /// Configuration file providing the client TLS material
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Message body
    #[arg(short, long, default_value = "PING")]
    pub body: String,
}

#[derive(Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Configuration file path
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Validate configuration file
    Validate {
        /// Configuration file path
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output file path
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Split `HOST:PORT`, accepting bracketed IPv6 hosts.
pub fn parse_host_port(value: &str) -> crate::Result<(String, u16)> {
    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| crate::Error::config(format!("Expected HOST:PORT, got '{}'", value)))?;
    let port = port
        .parse::<u16>()
        .map_err(|e| crate::Error::config(format!("Invalid port in '{}': {}", value, e)))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if host.is_empty() {
        return Err(crate::Error::config(format!("Missing host in '{}'", value)));
    }
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_host_port() {
        assert_eq!(parse_host_port("127.0.0.1:29292").unwrap(), ("127.0.0.1".to_string(), 29292));
        assert_eq!(parse_host_port("[::1]:8080").unwrap(), ("::1".to_string(), 8080));
        assert!(parse_host_port("localhost").is_err());
        assert!(parse_host_port(":80").is_err());
        assert!(parse_host_port("host:http").is_err());
    }

    #[test]
    fn test_list_flags_conflict() {
        assert!(CliArgs::try_parse_from(["idscp-bridge", "list", "--routes", "--components"]).is_err());
        let args = CliArgs::try_parse_from(["idscp-bridge", "list", "-f", "json"]).unwrap();
        match args.command {
            Commands::List(list) => assert_eq!(list.format, OutputFormat::Json),
            _ => panic!("expected list"),
        }
    }
}
