use oneadmin_views::edit_user::{UserCreator, UserEditor};
use oneadmin_views::users::UsersTable;
use oneadmin_views::Console;

use super::require;
use crate::cli::{UserCommands, UserFields};
use crate::output::{print_rows, users_table, OutputFormat};

pub async fn run(cmd: UserCommands, ctx: &Console, format: OutputFormat) -> anyhow::Result<()> {
    require(ctx, true)?;
    let mut list = UsersTable::new(ctx.clone());
    match cmd {
        UserCommands::List { page, order } => {
            list.open().await?;
            if !order.is_empty() {
                list.set_order(&order).await?;
            }
            for p in 2..=page.max(1) {
                list.set_page(p).await?;
            }
            print_rows(format, list.table().page_rows(), |rows| users_table(ctx, rows))
        }
        UserCommands::Search { keyword } => {
            list.search(&keyword).await?;
            print_rows(format, list.table().rows(), |rows| users_table(ctx, rows))
        }
        UserCommands::Manage { id, action } => {
            // the gateway manages users by name, so the row has to be loaded
            list.search(&id.to_string()).await?;
            list.manage(id, action).await?;
            Ok(())
        }
        UserCommands::Add {
            username,
            password,
            display_name,
        } => {
            let mut creator = UserCreator::new(ctx.clone());
            let draft = creator.draft_mut();
            draft.username = username;
            draft.password = password;
            draft.display_name = display_name;
            creator.submit(&mut list).await?;
            Ok(())
        }
        UserCommands::Edit { id, fields } => {
            let mut editor = UserEditor::open(ctx.clone(), Some(id)).await?;
            if fields.group.is_some() {
                editor.load_groups().await?;
            }
            apply_fields(&mut editor, fields)?;
            editor.submit(&mut list).await?;
            Ok(())
        }
    }
}

/// Copies the given fields into the draft; shared with the profile editor.
pub(crate) fn apply_fields(editor: &mut UserEditor, fields: UserFields) -> anyhow::Result<()> {
    if let Some(quota) = fields.quota {
        editor.set_quota(&quota)?;
    }
    if let Some(group) = &fields.group {
        if !editor.groups().is_empty() && !editor.groups().contains(group) {
            anyhow::bail!("unknown group `{}`", group);
        }
    }
    let draft = editor.draft_mut();
    if let Some(username) = fields.username {
        draft.username = username;
    }
    if let Some(display_name) = fields.display_name {
        draft.display_name = display_name;
    }
    if let Some(password) = fields.password {
        draft.password = password;
    }
    if let Some(group) = fields.group {
        draft.group = group;
    }
    Ok(())
}
