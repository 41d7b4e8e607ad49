//! User command handlers.

use serde_json::{Value, json};
use tabled::Tabled;
use wizly_core::{Controller, CoreError, Endpoint, Record};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output::{self, cell};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl From<&Record> for UserRow {
    fn from(r: &Record) -> Self {
        let v = r.as_value();
        Self {
            id: cell(v.get("id")),
            username: cell(v.get("username")),
            email: cell(v.get("email")),
            server: cell(v.get("server_type")),
            expires: cell(v.get("expires")),
        }
    }
}

/// Body for `users extend`: `--days N` or a raw `--data` object.
fn extension_body(days: Option<u32>, data: Option<&str>) -> Result<Value, CliError> {
    match (days, data) {
        (_, Some(raw)) => util::parse_json_arg("data", raw),
        (Some(days), None) => Ok(json!({ "days": days })),
        (None, None) => Err(CliError::Validation {
            field: "days".into(),
            reason: "pass --days or --data".into(),
        }),
    }
}

fn not_found(err: CoreError) -> CliError {
    match err {
        CoreError::NotFound { message } => CliError::NotFound {
            resource_type: "User".into(),
            message,
            list_command: "users list".into(),
        },
        other => other.into(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: UsersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List => {
            let users = controller.fetch_records(Endpoint::Users).await?;
            let out = output::render_list(
                global.output,
                &users,
                |u| UserRow::from(u),
                |u| u.id().map(|id| id.to_string()).unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Delete { id } => {
            if !util::confirm(&format!("Delete user {id}? This is destructive."), global.yes)? {
                return Ok(());
            }
            controller.delete_user(&id).await.map_err(not_found)?;
            util::note(global.quiet, &format!("User {id} deleted"));
            Ok(())
        }

        UsersCommand::Extend { id, days, data } => {
            let body = extension_body(days, data.as_deref())?;
            let response = controller
                .extend_user(&id, &body)
                .await
                .map_err(not_found)?;
            let out = output::render_single(
                global.output,
                &response,
                |_| format!("User {id} extended"),
                |_| id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
