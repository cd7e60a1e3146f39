use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use oneadmin_api::{ApiClient, HttpTransport};
use oneadmin_core::config::ConsoleConfig;
use oneadmin_core::render::QuotaDisplay;
use oneadmin_core::ConsoleError;
use oneadmin_session::{LocalStore, SharedStore, StoreKey};
use oneadmin_views::auth::AuthPages;
use oneadmin_views::Console;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod notify;
mod output;

use cli::Cli;
use notify::TerminalNotifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "oneadmin=debug"
    } else {
        "oneadmin=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // explicit --config > ONEADMIN_CONFIG env > ~/.oneadmin/oneadmin.toml
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .or_else(|| std::env::var("ONEADMIN_CONFIG").ok());
    let mut config = ConsoleConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        ConsoleConfig::default()
    });
    if let Some(server) = cli.server.clone() {
        config.server.base_url = server;
    }
    debug!(server = %config.server.base_url, storage = %config.storage.path, "starting");

    let store = SharedStore::new(LocalStore::open(&config.storage.path));
    let transport = Arc::new(
        HttpTransport::new(
            config.server.base_url.as_str(),
            Duration::from_secs(config.server.timeout_secs),
        )?
        .with_access_token(config.server.access_token.clone())
        .with_session_cookie(store.get(StoreKey::Session)),
    );

    let ctx = Console::new(
        ApiClient::new(transport.clone()),
        store.clone(),
        Arc::new(TerminalNotifier),
    )
    .with_display(
        QuotaDisplay::from(&config.display),
        config.display.page_size,
    );
    let origin = console_origin(&ctx.status.get().server_address, &config.server.base_url);
    let ctx = ctx.with_origin(origin);

    let outcome = commands::run(cli.command, &ctx, cli.output).await;

    persist_session(&ctx, &transport);

    if let Err(e) = outcome {
        match e.downcast_ref::<ConsoleError>() {
            Some(ConsoleError::Status { status: 401, .. }) => {
                if let Err(err) = ctx.auth.logout() {
                    warn!(error = %err, "could not clear the stored session");
                }
                AuthPages::new(ctx.clone()).open_login(true);
            }
            // already shown through the notifier
            Some(err) if already_reported(err) => {}
            Some(err) => eprintln!("{} {}", "✗".red(), err.to_string().red()),
            None => eprintln!("{} {:#}", "✗".red(), e),
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Failures the page logic has already passed to the notifier.
fn already_reported(err: &ConsoleError) -> bool {
    matches!(
        err,
        ConsoleError::Validation(_)
            | ConsoleError::Rejected(_)
            | ConsoleError::Transport(_)
            | ConsoleError::Status { .. }
            | ConsoleError::Serialization(_)
    )
}

/// The gateway serves the web console itself unless it advertises a
/// different public address.
fn console_origin(server_address: &str, base_url: &str) -> String {
    if server_address.trim().is_empty() {
        base_url.to_string()
    } else {
        server_address.to_string()
    }
}

/// Keeps the session cookie across invocations while someone is logged in.
fn persist_session(ctx: &Console, transport: &HttpTransport) {
    let result = match transport.session_cookie() {
        Some(cookie) if ctx.auth.is_logged_in() => ctx.store.set(StoreKey::Session, cookie),
        _ => ctx.store.remove(StoreKey::Session),
    };
    if let Err(e) = result {
        warn!(error = %e, "could not persist the session cookie");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_prefers_advertised_address() {
        assert_eq!(
            console_origin("https://api.example.com", "http://localhost:3000"),
            "https://api.example.com"
        );
        assert_eq!(console_origin("  ", "http://localhost:3000"), "http://localhost:3000");
    }

    #[test]
    fn local_failures_are_printed_by_main() {
        assert!(!already_reported(&ConsoleError::NotLoggedIn));
        assert!(!already_reported(&ConsoleError::PermissionDenied {
            reason: "admin only".into()
        }));
        assert!(already_reported(&ConsoleError::Rejected("bad".into())));
    }
}
