use colored::Colorize;
use oneadmin_api::user::RegisterForm;
use oneadmin_views::auth::{AuthPages, EditorAuthSuccess};
use oneadmin_views::home::{Home, HomeContent};
use oneadmin_views::Console;

use super::show_route;
use crate::cli::RegisterArgs;
use crate::output::{pairs_table, print_json, OutputFormat};

pub async fn login(ctx: &Console, username: &str, password: &str, source: Option<&str>) -> anyhow::Result<()> {
    let route = AuthPages::new(ctx.clone())
        .login(username, password, source)
        .await?;
    show_route(&route);
    Ok(())
}

pub async fn logout(ctx: &Console) -> anyhow::Result<()> {
    let route = AuthPages::new(ctx.clone()).logout().await?;
    show_route(&route);
    Ok(())
}

pub async fn register(ctx: &Console, args: RegisterArgs) -> anyhow::Result<()> {
    let pages = AuthPages::new(ctx.clone());
    if args.send_code {
        pages.send_register_code(&args.email).await?;
        return Ok(());
    }
    let form = RegisterForm {
        password2: args.password2.unwrap_or_else(|| args.password.clone()),
        username: args.username,
        password: args.password,
        email: args.email,
        verification_code: args.code,
        aff_code: args.aff,
    };
    let route = pages.register(form, None).await?;
    show_route(&route);
    Ok(())
}

pub async fn reset_password(ctx: &Console, email: &str) -> anyhow::Result<()> {
    AuthPages::new(ctx.clone())
        .request_password_reset(email)
        .await?;
    Ok(())
}

pub async fn github_url(ctx: &Console) -> anyhow::Result<()> {
    let route = AuthPages::new(ctx.clone()).github_login_url().await?;
    show_route(&route);
    Ok(())
}

pub async fn github_callback(ctx: &Console, code: &str, state: &str) -> anyhow::Result<()> {
    let route = AuthPages::new(ctx.clone())
        .github_callback(code, state)
        .await?;
    show_route(&route);
    Ok(())
}

pub async fn telegram_login(ctx: &Console, fields: &[(String, String)]) -> anyhow::Result<()> {
    let pairs = fields.iter().map(|(k, v)| (k.as_str(), v.as_str()));
    let route = AuthPages::new(ctx.clone()).telegram_login(pairs).await?;
    show_route(&route);
    Ok(())
}

pub fn editor_success(fields: &[(String, String)], format: OutputFormat) -> anyhow::Result<()> {
    let page = EditorAuthSuccess::from_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "provider": page.provider,
            "username": page.username,
            "session_id": page.session_id,
            "token": page.token,
        }));
    }
    println!("{}", page.title().green().bold());
    println!("{}", page.message());
    let mut rows = Vec::new();
    if let Some(username) = &page.username {
        rows.push(("Authenticated user", username.clone()));
    }
    if let Some(session_id) = &page.session_id {
        rows.push(("Session ID", session_id.clone()));
    }
    if !rows.is_empty() {
        println!("{}", pairs_table(rows));
    }
    if let Some(token) = &page.token {
        println!("{} {}", "API token:".bold(), token.cyan());
    }
    show_route(&page.next());
    Ok(())
}

pub async fn status(ctx: &Console, format: OutputFormat) -> anyhow::Result<()> {
    let status = Home::new(ctx.clone()).load_status().await?;
    if format == OutputFormat::Json {
        return print_json(&status);
    }
    let table = pairs_table([
        ("System name", status.system_name.clone()),
        ("Version", status.version.clone()),
        ("Server address", status.server_address.clone()),
        ("Quota per unit", status.quota_per_unit.to_string()),
        ("Display in currency", status.display_in_currency.to_string()),
        ("Email verification", status.email_verification.to_string()),
        ("GitHub OAuth", status.github_oauth.to_string()),
        ("Telegram OAuth", status.telegram_oauth.to_string()),
        ("Online top-up", status.enable_online_topup.to_string()),
        ("Top-up link", status.top_up_link.clone()),
        ("Chat link", status.chat_link.clone()),
    ]);
    println!("{}", table);
    Ok(())
}

fn print_content(content: &HomeContent) {
    match content {
        HomeContent::Default => {}
        HomeContent::Url(url) => println!("{} {}", "Open:".bold(), url.cyan()),
        HomeContent::Markdown(text) => println!("{}", text),
    }
}

/// Prints a new notice first, then the configured home content or the
/// default system overview.
pub async fn home(ctx: &Console) -> anyhow::Result<()> {
    let mut home = Home::new(ctx.clone());
    if let Ok(Some(notice)) = home.fresh_notice().await {
        println!("{}\n{}\n", "Notice".bold().yellow(), notice);
    }
    // a failed fetch already fell back to the default page
    let _ = home.load_content().await;
    if *home.content() == HomeContent::Default {
        let status = home.load_status().await?;
        println!("{} {}", status.system_name.bold(), status.version.dimmed());
        if !status.server_address.is_empty() {
            println!("Server: {}", status.server_address);
        }
        println!(
            "Email verification: {}  GitHub OAuth: {}  Telegram OAuth: {}",
            status.email_verification, status.github_oauth, status.telegram_oauth
        );
    } else {
        print_content(home.content());
    }
    Ok(())
}

pub async fn about(ctx: &Console) -> anyhow::Result<()> {
    let content = Home::new(ctx.clone()).about().await?;
    if content == HomeContent::Default {
        println!("The administrator has not set up the about page.");
    } else {
        print_content(&content);
    }
    Ok(())
}
