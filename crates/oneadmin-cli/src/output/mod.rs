//! Rendering of list pages for the terminal.

mod table;

use comfy_table::Cell;
use oneadmin_api::channel::Channel;
use oneadmin_api::mj::MjTask;
use oneadmin_api::redemption::Redemption;
use oneadmin_api::token::Token;
use oneadmin_api::user::User;
use oneadmin_core::render::{render_response_time, timestamp_to_string, ResponseTimeClass};
use oneadmin_core::types::{channel_type_label, ChannelStatus, RedemptionStatus, TokenStatus, UserStatus};
use oneadmin_views::mj_logs::{action_label, code_label, status_label};
use oneadmin_views::Console;
use serde::Serialize;

pub use table::{colored_cell, Table, TableBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Prints `rows` as a table, or as pretty JSON for scripting.
pub fn print_rows<T, F>(format: OutputFormat, rows: &[T], render: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&[T]) -> Table,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Table => println!("{}", render(rows)),
    }
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn channel_status_cell(status: ChannelStatus) -> Cell {
    let color = match status {
        ChannelStatus::Enabled => "green",
        ChannelStatus::ManuallyDisabled => "red",
        ChannelStatus::AutoDisabled => "yellow",
        ChannelStatus::Unknown(_) => "grey",
    };
    colored_cell(status.to_string(), color)
}

pub fn channels_table(ctx: &Console, rows: &[Channel]) -> Table {
    let mut builder = Table::builder().headers(&[
        "ID", "Name", "Group", "Type", "Status", "Response", "Used", "Balance", "Priority", "Weight",
    ]);
    for c in rows {
        let class = ResponseTimeClass::of(c.response_time);
        builder = builder.add_cells(vec![
            Cell::new(c.id),
            Cell::new(&c.name),
            Cell::new(c.group_list().join(", ")),
            Cell::new(channel_type_label(c.channel_type)),
            channel_status_cell(c.status),
            colored_cell(render_response_time(c.response_time), class.color()),
            Cell::new(ctx.render_quota(c.used_quota)),
            Cell::new(format!("{:.2}", c.balance)),
            Cell::new(c.priority.unwrap_or(0)),
            Cell::new(c.weight.unwrap_or(0)),
        ]);
    }
    builder.build()
}

pub fn users_table(ctx: &Console, rows: &[User]) -> Table {
    let mut builder = Table::builder().headers(&[
        "ID", "Username", "Group", "Quota", "Used", "Requests", "Role", "Status",
    ]);
    for u in rows {
        let color = match u.status {
            UserStatus::Enabled => "green",
            UserStatus::Disabled => "red",
            _ => "grey",
        };
        builder = builder.add_cells(vec![
            Cell::new(u.id),
            Cell::new(&u.username),
            Cell::new(&u.group),
            Cell::new(ctx.render_quota(u.quota)),
            Cell::new(ctx.render_quota(u.used_quota)),
            Cell::new(u.request_count),
            Cell::new(u.role.to_string()),
            colored_cell(u.status.to_string(), color),
        ]);
    }
    builder.build()
}

pub fn tokens_table(ctx: &Console, rows: &[Token]) -> Table {
    let mut builder = Table::builder().headers(&[
        "ID", "Name", "Status", "Used", "Remaining", "Created", "Expires",
    ]);
    for t in rows {
        let color = match t.status {
            TokenStatus::Enabled => "green",
            TokenStatus::Disabled => "red",
            TokenStatus::Expired => "yellow",
            TokenStatus::Exhausted => "grey",
            TokenStatus::Unknown(_) => "black",
        };
        let remaining = if t.unlimited_quota {
            "Unlimited".to_string()
        } else {
            ctx.render_quota(t.remain_quota)
        };
        let expires = if t.expired_time == -1 {
            "Never".to_string()
        } else {
            timestamp_to_string(t.expired_time)
        };
        builder = builder.add_cells(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            colored_cell(t.status.to_string(), color),
            Cell::new(ctx.render_quota(t.used_quota)),
            Cell::new(remaining),
            Cell::new(timestamp_to_string(t.created_time)),
            Cell::new(expires),
        ]);
    }
    builder.build()
}

pub fn redemptions_table(ctx: &Console, rows: &[Redemption]) -> Table {
    let mut builder = Table::builder().headers(&[
        "ID", "Name", "Status", "Quota", "Created", "Redeemed",
    ]);
    for r in rows {
        let color = match r.status {
            RedemptionStatus::Unused => "green",
            RedemptionStatus::Disabled => "red",
            _ => "grey",
        };
        builder = builder.add_cells(vec![
            Cell::new(r.id),
            Cell::new(&r.name),
            colored_cell(r.status.to_string(), color),
            Cell::new(ctx.render_quota(r.quota)),
            Cell::new(timestamp_to_string(r.created_time)),
            Cell::new(timestamp_to_string(r.redeemed_time)),
        ]);
    }
    builder.build()
}

pub fn mj_table(rows: &[MjTask], admin: bool) -> Table {
    let mut headers = vec!["Submitted", "Task", "Type", "Result", "Status", "Progress", "Prompt"];
    if admin {
        headers.insert(1, "Channel");
    }
    let mut builder = Table::builder().headers(&headers);
    for task in rows {
        let mut cells = vec![
            timestamp_to_string(task.submit_time / 1000),
            task.mj_id.clone(),
            action_label(&task.action).to_string(),
            code_label(task.code).to_string(),
            status_label(&task.status).to_string(),
            task.progress.clone(),
            task.prompt.clone(),
        ];
        if admin {
            cells.insert(1, task.channel_id.to_string());
        }
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        builder = builder.add_row(&cells);
    }
    builder.build()
}

/// Key/value listing used for options and profile details.
pub fn pairs_table<'a, I>(pairs: I) -> Table
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut builder = Table::builder().headers(&["Key", "Value"]);
    for (key, value) in pairs {
        builder = builder.add_row(&[key, &value]);
    }
    builder.build()
}
