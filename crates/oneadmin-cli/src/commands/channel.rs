use oneadmin_api::channel::{ChannelSearch, TestScope};
use oneadmin_views::channels::{ChannelAction, ChannelsTable};
use oneadmin_views::edit_channel::ChannelEditor;
use oneadmin_views::Console;
use tracing::debug;

use super::require;
use crate::cli::{ChannelCommands, ChannelFields};
use crate::output::{channels_table, print_rows, OutputFormat};

pub async fn run(cmd: ChannelCommands, ctx: &Console, format: OutputFormat) -> anyhow::Result<()> {
    require(ctx, true)?;
    let mut list = ChannelsTable::new(ctx.clone());
    match cmd {
        ChannelCommands::List {
            page,
            id_sort,
            page_size,
        } => {
            list.open().await?;
            if let Some(size) = page_size {
                list.set_page_size(size).await?;
            }
            if let Some(sort) = id_sort {
                list.set_id_sort(sort).await?;
            }
            walk_to(&mut list, page).await?;
            print_page(ctx, &list, format)
        }
        ChannelCommands::Search {
            keyword,
            group,
            model,
        } => {
            list.search(ChannelSearch {
                keyword,
                group,
                model,
            })
            .await?;
            print_rows(format, list.table().rows(), |rows| channels_table(ctx, rows))
        }
        ChannelCommands::Add(fields) => {
            let mut editor = ChannelEditor::create(ctx.clone());
            editor.load_options().await?;
            apply_fields(&mut editor, fields)?;
            editor.submit(&mut list).await?;
            print_page(ctx, &list, format)
        }
        ChannelCommands::Edit { id, fields } => {
            let mut editor = ChannelEditor::edit(ctx.clone(), id).await?;
            editor.load_options().await?;
            apply_fields(&mut editor, fields)?;
            editor.submit(&mut list).await?;
            print_page(ctx, &list, format)
        }
        ChannelCommands::Enable { id } => manage(&mut list, id, ChannelAction::Enable).await,
        ChannelCommands::Disable { id } => manage(&mut list, id, ChannelAction::Disable).await,
        ChannelCommands::Delete { id } => manage(&mut list, id, ChannelAction::Delete).await,
        ChannelCommands::Priority { id, value } => {
            manage(&mut list, id, ChannelAction::Priority(value)).await
        }
        ChannelCommands::Weight { id, value } => {
            manage(&mut list, id, ChannelAction::Weight(value)).await
        }
        ChannelCommands::Test { id, model } => {
            list.test(id, model.as_deref()).await?;
            Ok(())
        }
        ChannelCommands::TestAll { disabled } => {
            let scope = if disabled {
                TestScope::Disabled
            } else {
                TestScope::All
            };
            list.test_all(scope).await?;
            Ok(())
        }
        ChannelCommands::Balance { id: Some(id) } => {
            let balance = list.update_balance(id).await?;
            println!("{:.2}", balance);
            Ok(())
        }
        ChannelCommands::Balance { id: None } => {
            list.update_all_balances().await?;
            Ok(())
        }
        ChannelCommands::DeleteDisabled => {
            list.delete_disabled().await?;
            Ok(())
        }
        ChannelCommands::BatchDelete { ids } => {
            for id in ids {
                list.select(id);
            }
            list.batch_delete().await?;
            Ok(())
        }
        ChannelCommands::Fix => {
            list.fix_abilities().await?;
            Ok(())
        }
    }
}

/// Pages are fetched in order, the way the list grows while paging.
async fn walk_to(list: &mut ChannelsTable, page: usize) -> anyhow::Result<()> {
    for p in 2..=page.max(1) {
        list.set_page(p).await?;
        if list.table().page_rows().is_empty() {
            debug!(page = p, "past the last page");
            break;
        }
    }
    Ok(())
}

fn print_page(ctx: &Console, list: &ChannelsTable, format: OutputFormat) -> anyhow::Result<()> {
    print_rows(format, list.table().page_rows(), |rows| channels_table(ctx, rows))
}

async fn manage(list: &mut ChannelsTable, id: i64, action: ChannelAction) -> anyhow::Result<()> {
    list.manage(id, action).await?;
    Ok(())
}

fn apply_fields(editor: &mut ChannelEditor, fields: ChannelFields) -> anyhow::Result<()> {
    if let Some(kind) = fields.kind {
        editor.set_type(kind);
    }
    editor.set_batch(fields.batch);
    {
        let draft = editor.draft_mut();
        if let Some(name) = fields.name {
            draft.name = name;
        }
        if let Some(key) = fields.key {
            draft.key = key.replace("\\n", "\n");
        }
        if let Some(base_url) = fields.base_url {
            draft.base_url = base_url;
        }
        if let Some(other) = fields.other {
            draft.other = other;
        }
        if let Some(org) = fields.organization {
            draft.openai_organization = org;
        }
        if let Some(models) = fields.models {
            draft.models = trimmed(models);
        }
        if let Some(groups) = fields.groups {
            draft.groups = trimmed(groups);
        }
        if let Some(mapping) = fields.model_mapping {
            draft.model_mapping = mapping;
        }
        if let Some(prompt) = fields.system_prompt {
            draft.system_prompt = prompt;
        }
        if let Some(auto_ban) = fields.auto_ban {
            draft.auto_ban = auto_ban;
        }
    }
    if fields.basic_models {
        editor.fill_basic_models();
    }
    if fields.all_models {
        editor.fill_all_models();
    }
    for model in fields.custom_models {
        editor.add_custom_model(&model)?;
    }
    Ok(())
}

fn trimmed(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
