// pingコマンドの実装

use crate::cli::commands::CommandResult;
use crate::cli::{parse_host_port, PingArgs};
use crate::client::IdscpClient;
use crate::common::config::Config;
use crate::common::types::IDSCP2_HEADER;
use crate::protocol::{IdscpMessage, MessageCodec};
use tracing::info;

pub async fn execute(args: PingArgs) -> CommandResult {
    let config = Config::load(args.config.as_deref())?;
    let (host, _) = parse_host_port(&args.server)?;
    let server_name = args.name.unwrap_or(host);

    let mut client = IdscpClient::connect(&args.server, &server_name, &config.tls)
        .await?
        .with_codec(MessageCodec::new(config.idscp.max_message_size));

    let request = IdscpMessage::data(args.body).with_header(IDSCP2_HEADER, "ping");
    info!("Client sending: {} (Header: ping)", request.body);

    let reply = client.exchange(&request).await?;
    println!(
        "Reply: {} (Header: {})",
        reply.body,
        reply.idscp2_header().unwrap_or("null")
    );

    client.close().await
}
