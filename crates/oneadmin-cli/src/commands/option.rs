use oneadmin_views::settings::operation::{self, OperationGroup};
use oneadmin_views::settings::{system, OperationSettings, SystemSettings};
use oneadmin_views::Console;
use serde_json::{Map, Value};

use crate::cli::OptionCommands;
use crate::output::{pairs_table, print_json, OutputFormat};

const GROUPS: [OperationGroup; 4] = [
    OperationGroup::General,
    OperationGroup::Monitor,
    OperationGroup::Quota,
    OperationGroup::Ratio,
];

/// How a system option is saved, mirroring the buttons on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SystemSave {
    ServerAddress,
    Smtp,
    DomainWhitelist,
    MessagePusher,
    GithubOauth,
    TelegramOauth,
    Notice,
}

fn system_save(key: &str) -> Option<SystemSave> {
    Some(match key {
        "ServerAddress" => SystemSave::ServerAddress,
        "SMTPServer" | "SMTPPort" | "SMTPAccount" | "SMTPFrom" | "SMTPToken" => SystemSave::Smtp,
        "EmailDomainWhitelist" => SystemSave::DomainWhitelist,
        "MessagePusherAddress" | "MessagePusherToken" => SystemSave::MessagePusher,
        "GitHubClientId" | "GitHubClientSecret" => SystemSave::GithubOauth,
        "TelegramBotName" | "TelegramBotToken" => SystemSave::TelegramOauth,
        "Notice" => SystemSave::Notice,
        _ => return None,
    })
}

fn operation_group(key: &str) -> Option<OperationGroup> {
    GROUPS.into_iter().find(|g| g.keys().contains(&key))
}

pub async fn run(cmd: OptionCommands, ctx: &Console, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        OptionCommands::List => {
            let page = SystemSettings::open(ctx.clone()).await?;
            let options = page.options();
            if format == OutputFormat::Json {
                let map: Map<String, Value> = options
                    .iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                    .collect();
                return print_json(&map);
            }
            println!("{}", pairs_table(options.iter().map(|(k, v)| (k, v.to_string()))));
            Ok(())
        }
        OptionCommands::Set { key, value } => set(ctx, &key, value).await,
        OptionCommands::Toggle { key, confirm } => {
            let enabled = if operation::TOGGLES.contains(&key.as_str()) {
                OperationSettings::open(ctx.clone()).await?.toggle(&key).await?
            } else if system::TOGGLES.contains(&key.as_str()) {
                SystemSettings::open(ctx.clone())
                    .await?
                    .toggle(&key, confirm)
                    .await?
            } else {
                anyhow::bail!("`{}` is not a boolean option", key);
            };
            println!("{} = {}", key, enabled);
            Ok(())
        }
        OptionCommands::Domains { add, remove } => {
            let mut page = SystemSettings::open(ctx.clone()).await?;
            for domain in &remove {
                page.remove_domain(domain);
            }
            for domain in &add {
                page.add_domain(domain);
            }
            if !add.is_empty() || !remove.is_empty() {
                page.save_domain_whitelist().await?;
            }
            for domain in page.domains() {
                println!("{}", domain);
            }
            Ok(())
        }
        OptionCommands::PurgeLogs { before } => {
            let mut page = OperationSettings::open(ctx.clone()).await?;
            if let Some(before) = before {
                page.set_history_before(before);
            }
            page.delete_history_logs().await?;
            Ok(())
        }
    }
}

async fn set(ctx: &Console, key: &str, value: String) -> anyhow::Result<()> {
    if let Some(group) = operation_group(key) {
        let mut page = OperationSettings::open(ctx.clone()).await?;
        page.set(key, value);
        page.save(group).await?;
        return Ok(());
    }
    let Some(save) = system_save(key) else {
        anyhow::bail!("`{}` cannot be set from the console", key);
    };
    let mut page = SystemSettings::open(ctx.clone()).await?;
    page.set(key, value.as_str());
    match save {
        SystemSave::DomainWhitelist => {
            for domain in page.domains().to_vec() {
                page.remove_domain(&domain);
            }
            for domain in value.split(',') {
                page.add_domain(domain);
            }
            page.save_domain_whitelist().await?;
        }
        SystemSave::ServerAddress => page.save_server_address().await?,
        SystemSave::Smtp => page.save_smtp().await?,
        SystemSave::MessagePusher => page.save_message_pusher().await?,
        SystemSave::GithubOauth => page.save_github_oauth().await?,
        SystemSave::TelegramOauth => page.save_telegram_oauth().await?,
        SystemSave::Notice => page.save_notice().await?,
    }
    Ok(())
}
