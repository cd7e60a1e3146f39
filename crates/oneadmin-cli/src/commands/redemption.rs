use colored::Colorize;
use oneadmin_views::edit_redemption::RedemptionEditor;
use oneadmin_views::redemptions::RedemptionsTable;
use oneadmin_views::Console;

use super::require;
use crate::cli::RedemptionCommands;
use crate::output::{print_json, print_rows, redemptions_table, OutputFormat};

pub async fn run(cmd: RedemptionCommands, ctx: &Console, format: OutputFormat) -> anyhow::Result<()> {
    require(ctx, true)?;
    let mut list = RedemptionsTable::new(ctx.clone());
    match cmd {
        RedemptionCommands::List { page } => {
            list.open().await?;
            for p in 2..=page.max(1) {
                list.set_page(p).await?;
            }
            print_rows(format, list.table().page_rows(), |rows| {
                redemptions_table(ctx, rows)
            })
        }
        RedemptionCommands::Search { keyword } => {
            list.search(&keyword).await?;
            print_rows(format, list.table().rows(), |rows| redemptions_table(ctx, rows))
        }
        RedemptionCommands::Add {
            name,
            quota,
            count,
            export,
        } => {
            let mut editor = RedemptionEditor::create(ctx.clone());
            let form = editor.form_mut();
            form.name = name;
            form.count = count.max(1);
            if let Some(quota) = quota {
                form.quota = quota;
            }
            editor.submit(&mut list).await?;
            if format == OutputFormat::Json {
                print_json(&editor.codes())?;
            } else {
                for code in editor.codes() {
                    println!("{}", code);
                }
            }
            if let Some(dir) = export {
                let path = editor.export_codes(&dir)?;
                println!("{} {}", "Saved".green(), path.display());
            }
            Ok(())
        }
        RedemptionCommands::Edit { id, name, quota } => {
            let mut editor = RedemptionEditor::edit(ctx.clone(), id).await?;
            let form = editor.form_mut();
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(quota) = quota {
                form.quota = quota;
            }
            editor.submit(&mut list).await?;
            Ok(())
        }
        RedemptionCommands::Delete { id } => {
            list.delete(id).await?;
            Ok(())
        }
    }
}
