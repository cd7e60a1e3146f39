use colored::Colorize;
use oneadmin_api::oauth::TelegramAuth;
use oneadmin_views::edit_user::UserEditor;
use oneadmin_views::personal::PersonalSettings;
use oneadmin_views::settings::visible_tabs;
use oneadmin_views::Console;

use super::{require, show_route, user};
use crate::cli::AccountCommands;
use crate::output::{pairs_table, print_json, OutputFormat};

pub async fn run(cmd: AccountCommands, ctx: &Console, format: OutputFormat) -> anyhow::Result<()> {
    require(ctx, false)?;
    let mut page = PersonalSettings::new(ctx.clone())?;
    match cmd {
        AccountCommands::Show => {
            let me = page.refresh_profile().await?;
            if format == OutputFormat::Json {
                return print_json(&me);
            }
            let tabs: Vec<&str> = visible_tabs(&ctx.auth).iter().map(|t| t.label()).collect();
            let table = pairs_table([
                ("ID", me.id.to_string()),
                ("Username", me.username.clone()),
                ("Display name", me.display_name.clone()),
                ("Role", me.role.to_string()),
                ("Group", me.group.clone()),
                ("Email", me.email.clone()),
                ("GitHub", me.github_id.clone()),
                ("Telegram", me.telegram_id.clone()),
                ("Balance", ctx.render_quota(me.quota)),
                ("Used", ctx.render_quota(me.used_quota)),
                ("Requests", me.request_count.to_string()),
                ("Invited", me.aff_count.to_string()),
                ("Pending rewards", ctx.render_quota(me.aff_quota)),
                ("Total rewards", ctx.render_quota(me.aff_history_quota)),
                ("Settings", tabs.join(", ")),
            ]);
            println!("{}", table);
        }
        AccountCommands::Edit { fields } => {
            let mut editor = UserEditor::open(ctx.clone(), None).await?;
            user::apply_fields(&mut editor, fields)?;
            editor.submit(&mut page).await?;
        }
        AccountCommands::Models => {
            let models = page.load_models().await?;
            if format == OutputFormat::Json {
                return print_json(&models);
            }
            for model in models {
                println!("{}", model);
            }
        }
        AccountCommands::AccessToken => {
            let token = page.generate_access_token().await?;
            println!("{}", token.bold());
        }
        AccountCommands::Invite => {
            let link = page.invite_link().await?;
            println!("{}", link.cyan());
        }
        AccountCommands::Transfer { quota } => page.transfer_aff_quota(quota).await?,
        AccountCommands::Password { password, confirm } => {
            page.change_password(&password, &confirm).await?
        }
        AccountCommands::SendCode { email } => page.send_verification(&email).await?,
        AccountCommands::BindEmail { email, code } => page.bind_email(&email, &code).await?,
        AccountCommands::BindGithub => show_route(&page.github_bind_url().await?),
        AccountCommands::BindTelegram { fields } => {
            let auth = TelegramAuth::from_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            page.bind_telegram(&auth).await?;
        }
        AccountCommands::Delete { confirm } => show_route(&page.delete_account(&confirm).await?),
    }
    Ok(())
}
