//! One module per console page; each command drives the page's logic and
//! prints what the page would show.

mod account;
mod channel;
mod mj;
mod option;
mod redemption;
mod session;
mod token;
mod topup;
mod user;

use colored::Colorize;
use oneadmin_views::{Console, Route};

use crate::cli::Commands;
use crate::output::OutputFormat;

pub async fn run(command: Commands, ctx: &Console, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Login {
            username,
            password,
            source,
        } => session::login(ctx, &username, &password, source.as_deref()).await,
        Commands::Logout => session::logout(ctx).await,
        Commands::Register(args) => session::register(ctx, args).await,
        Commands::ResetPassword { email } => session::reset_password(ctx, &email).await,
        Commands::GithubCallback { code, state } => {
            session::github_callback(ctx, &code, &state).await
        }
        Commands::TelegramLogin { fields } => session::telegram_login(ctx, &fields).await,
        Commands::EditorSuccess { fields } => session::editor_success(&fields, format),
        Commands::GithubUrl => session::github_url(ctx).await,
        Commands::Status => session::status(ctx, format).await,
        Commands::Home => session::home(ctx).await,
        Commands::About => session::about(ctx).await,
        Commands::Channel(cmd) => channel::run(cmd, ctx, format).await,
        Commands::User(cmd) => user::run(cmd, ctx, format).await,
        Commands::Token(cmd) => token::run(cmd, ctx, format).await,
        Commands::Redemption(cmd) => redemption::run(cmd, ctx, format).await,
        Commands::Options(cmd) => option::run(cmd, ctx, format).await,
        Commands::Mj(args) => mj::run(args, ctx, format).await,
        Commands::Topup(cmd) => topup::run(cmd, ctx, format).await,
        Commands::Account(cmd) => account::run(cmd, ctx, format).await,
    }
}

/// Checks page access before any request is made.
pub(crate) fn require(ctx: &Console, admin: bool) -> oneadmin_core::Result<()> {
    if admin {
        ctx.auth.require_admin()?;
    } else {
        ctx.auth.require_user()?;
    }
    Ok(())
}

/// Where the page would navigate next; external pages are printed so they
/// can be opened in a browser.
pub(crate) fn show_route(route: &Route) {
    match route {
        Route::External(url) => println!("{} {}", "Open:".bold(), url.cyan()),
        other => tracing::debug!(route = %other, "next page"),
    }
}
