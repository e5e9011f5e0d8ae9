// listコマンドの実装
//
// 設定からアプリケーションコンテキストを構築し（リスナーはバインドしない）、
// ルートとコンポーネントの一覧を表示

use crate::cli::commands::CommandResult;
use crate::cli::{ListArgs, OutputFormat};
use crate::common::config::Config;
use crate::introspection::{ComponentInfo, RouteInfo};
use crate::server::Connector;
use comfy_table::{Attribute, Cell, Color, Table};
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Listing {
    #[serde(skip_serializing_if = "Option::is_none")]
    routes: Option<Vec<RouteInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<Vec<ComponentInfo>>,
}

pub async fn execute(args: ListArgs) -> CommandResult {
    let config = Config::load(args.config.as_deref())?;
    let query = Connector::new(config)?.query_service();

    let show_routes = !args.components;
    let show_components = !args.routes;
    debug!(
        "Listing routes: {}, components: {}, format: {:?}",
        show_routes, show_components, args.format
    );

    let listing = Listing {
        routes: show_routes.then(|| query.get_routes()),
        components: show_components.then(|| query.list_components()),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Table => {
            if let Some(routes) = &listing.routes {
                println!("{}", routes_table(routes));
            }
            if let Some(components) = &listing.components {
                println!("{}", components_table(components));
            }
        }
    }

    Ok(())
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold).fg(Color::Blue))
        .collect()
}

fn routes_table(routes: &[RouteInfo]) -> Table {
    let mut table = Table::new();
    table.set_header(header(&["Context", "Route", "Type", "Status", "Uptime (ms)", "Description"]));

    for route in routes {
        let status_color = if route.status == "Started" {
            Color::Green
        } else {
            Color::Yellow
        };

        table.add_row(vec![
            Cell::new(&route.context_name),
            Cell::new(&route.id),
            Cell::new(&route.short_name),
            Cell::new(&route.status).fg(status_color),
            Cell::new(route.uptime_millis),
            Cell::new(route.description.as_deref().unwrap_or("-")),
        ]);
    }

    table
}

fn components_table(components: &[ComponentInfo]) -> Table {
    let mut table = Table::new();
    table.set_header(header(&["Component"]));

    for component in components {
        table.add_row(vec![Cell::new(&component.bundle_name)]);
    }

    table
}
