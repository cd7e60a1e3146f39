use oneadmin_views::edit_token::TokenEditor;
use oneadmin_views::tokens::TokensTable;
use oneadmin_views::Console;

use super::require;
use crate::cli::{TokenCommands, TokenFields};
use crate::output::{print_rows, tokens_table, OutputFormat};

pub async fn run(cmd: TokenCommands, ctx: &Console, format: OutputFormat) -> anyhow::Result<()> {
    require(ctx, false)?;
    let mut list = TokensTable::new(ctx.clone());
    match cmd {
        TokenCommands::List { page } => {
            list.open().await?;
            for p in 2..=page.max(1) {
                list.set_page(p).await?;
            }
            print_rows(format, list.table().page_rows(), |rows| tokens_table(ctx, rows))
        }
        TokenCommands::Search { keyword } => {
            list.search(&keyword).await?;
            print_rows(format, list.table().rows(), |rows| tokens_table(ctx, rows))
        }
        TokenCommands::Add { fields, count } => {
            let mut editor = TokenEditor::create(ctx.clone());
            editor.set_count(count);
            apply_fields(&mut editor, fields)?;
            editor.submit(&mut list).await?;
            print_rows(format, list.table().page_rows(), |rows| tokens_table(ctx, rows))
        }
        TokenCommands::Edit { id, fields } => {
            let mut editor = TokenEditor::edit(ctx.clone(), id).await?;
            apply_fields(&mut editor, fields)?;
            editor.submit(&mut list).await?;
            Ok(())
        }
        TokenCommands::Enable { id } => {
            list.set_enabled(id, true).await?;
            Ok(())
        }
        TokenCommands::Disable { id } => {
            list.set_enabled(id, false).await?;
            Ok(())
        }
        TokenCommands::Delete { id } => {
            list.delete(id).await?;
            Ok(())
        }
    }
}

fn apply_fields(editor: &mut TokenEditor, fields: TokenFields) -> anyhow::Result<()> {
    if fields.never_expires {
        editor.set_never_expires();
    }
    if let Some(parts) = fields.expires_in {
        let [months, days, hours, minutes] = parts[..] else {
            anyhow::bail!("--expires-in takes months,days,hours,minutes");
        };
        editor.set_relative_expiry(months, days, hours, minutes);
    }
    if let Some(unlimited) = fields.unlimited {
        if editor.draft().unlimited_quota != unlimited {
            editor.toggle_unlimited();
        }
    }
    let draft = editor.draft_mut();
    if let Some(name) = fields.name {
        draft.name = name;
    }
    if let Some(quota) = fields.quota {
        draft.remain_quota = quota;
    }
    if let Some(at) = fields.expires_at {
        draft.expires_at = Some(at);
    }
    if let Some(models) = fields.models {
        draft.model_limits = models
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        draft.model_limits_enabled = !draft.model_limits.is_empty();
    }
    Ok(())
}
