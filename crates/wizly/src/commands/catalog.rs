//! Read-only listings: libraries, servers and API keys.

use tabled::Tabled;
use wizly_core::{Controller, Endpoint, Record};

use crate::cli::{GlobalOpts, ListOnlyArgs, ListOnlyCommand};
use crate::error::CliError;
use crate::output::{self, cell, first_cell};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct LibraryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Server")]
    server: String,
}

impl From<&Record> for LibraryRow {
    fn from(r: &Record) -> Self {
        let v = r.as_value();
        Self {
            id: cell(v.get("id")),
            name: first_cell(v, &["name", "title"]),
            server: cell(v.get("server_name")),
        }
    }
}

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    server_type: String,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&Record> for ServerRow {
    fn from(r: &Record) -> Self {
        let v = r.as_value();
        Self {
            id: cell(v.get("id")),
            name: cell(v.get("name")),
            server_type: cell(v.get("server_type")),
            url: first_cell(v, &["url", "external_url"]),
        }
    }
}

#[derive(Tabled)]
struct ApiKeyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Deleted")]
    deleted: String,
}

impl From<&Record> for ApiKeyRow {
    fn from(r: &Record) -> Self {
        let v = r.as_value();
        Self {
            id: cell(v.get("id")),
            name: cell(v.get("name")),
            created: cell(v.get("created_at")),
            deleted: cell(v.get("deleted_at")),
        }
    }
}

fn record_id(r: &Record) -> String {
    r.id().map(|id| id.to_string()).unwrap_or_default()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    endpoint: Endpoint,
    args: ListOnlyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ListOnlyCommand::List => {
            let records = controller.fetch_records(endpoint).await?;
            let out = match endpoint {
                Endpoint::Libraries => {
                    output::render_list(global.output, &records, |r| LibraryRow::from(r), record_id)?
                }
                Endpoint::Servers => {
                    output::render_list(global.output, &records, |r| ServerRow::from(r), record_id)?
                }
                _ => output::render_list(global.output, &records, |r| ApiKeyRow::from(r), record_id)?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
