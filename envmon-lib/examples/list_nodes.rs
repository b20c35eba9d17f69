//! Node listing example.
//!
//! Run with: cargo run --example list_nodes [search term]
//!
//! Reads from the environment (or a .env file):
//! - ENVMON_MODE (`development` or `production`, default `production`)
//! - ENVMON_API_URL (required in production)
//! - ENVMON_TOKEN (optional bearer token)
//!
//! Logs go to `list_nodes.log`.

use std::env;
use std::fs::File;

use envmon_lib::EnvmonClient;
use envmon_lib::auth::StaticTokenProvider;
use envmon_lib::columns;
use envmon_lib::config::ApiConfig;
use envmon_lib::model::markers;
use envmon_lib::table::Cell;
use envmon_lib::table::DataTable;
use envmon_lib::table::TableBody;
use envmon_lib::table::TableOptions;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    WriteLogger::init(LevelFilter::Debug, Config::default(), File::create("list_nodes.log")?)?;

    let config = ApiConfig::from_env()?;
    let mut builder = EnvmonClient::from_config(&config);
    if let Ok(token) = env::var("ENVMON_TOKEN") {
        builder = builder.token_provider(StaticTokenProvider::new(token));
    }
    let client = builder.build()?;

    println!("API: {} ({})\n", client.base_url(), config.mode().as_str());

    let mut table = DataTable::new(
        envmon_lib::api::resources::NODES,
        columns::nodes_columns(),
        client.query(),
        TableOptions::default(),
    );
    let mut rows = table.subscribe();

    table.set_search(env::args().nth(1).as_deref());
    table.load().await;

    let view = table.view();
    let headers: Vec<&str> = view.headers.iter().map(|h| h.label.as_str()).collect();
    println!("{}", headers.join(" | "));

    match &view.body {
        TableBody::Rows(rendered) => {
            for row in rendered {
                let cells: Vec<String> = row.iter().map(cell_text).collect();
                println!("{}", cells.join(" | "));
            }
        }
        TableBody::Empty { title, subtitle } => {
            println!("{}", title);
            if let Some(subtitle) = subtitle {
                println!("{}", subtitle);
            }
        }
        TableBody::Error { error, .. } => println!("Failed: {}", error),
        TableBody::Idle | TableBody::Loading { .. } => {}
    }

    if let Some(pager) = view.pager {
        println!("\nPage {}/{} ({} nodes)", pager.page, pager.page_count, pager.total);
    }

    if let Ok(loaded) = rows.try_recv() {
        println!("{} nodes on the map", markers(loaded.as_slice()).len());
    }

    Ok(())
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(text) => text.clone(),
        Cell::Badge { label, .. } => format!("[{}]", label),
        Cell::Link { label, href } => format!("{} <{}>", label, href),
        Cell::Actions(buttons) => buttons
            .iter()
            .map(|b| b.label.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    }
}
