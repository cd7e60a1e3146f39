use colored::Colorize;
use oneadmin_views::topup::TopUp;
use oneadmin_views::Console;

use super::{require, show_route};
use crate::cli::TopupCommands;
use crate::output::{pairs_table, print_json, OutputFormat};

pub async fn run(cmd: TopupCommands, ctx: &Console, format: OutputFormat) -> anyhow::Result<()> {
    require(ctx, false)?;
    let mut page = TopUp::open(ctx.clone()).await?;
    match cmd {
        TopupCommands::Show => {
            println!("Balance: {}", ctx.render_quota(page.quota()).bold());
        }
        TopupCommands::Redeem { code } => {
            page.redeem(&code).await?;
            println!("Balance: {}", ctx.render_quota(page.quota()).bold());
        }
        TopupCommands::Link => show_route(&page.top_up_link()?),
        TopupCommands::Amount { count, promo } => {
            page.top_up_code = promo;
            let price = page.amount(count).await?;
            println!("Amount due: {:.2}", price);
        }
        TopupCommands::Pay {
            count,
            method,
            promo,
        } => {
            page.top_up_code = promo;
            let form = page.pay(count, &method).await?;
            if format == OutputFormat::Json {
                return print_json(&serde_json::json!({
                    "url": form.url,
                    "params": form.params,
                }));
            }
            println!("{} {}", "POST".bold(), form.url.cyan());
            let fields = form.params.iter().map(|(k, v)| {
                let value = match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.as_str(), value)
            });
            println!("{}", pairs_table(fields));
        }
    }
    Ok(())
}
