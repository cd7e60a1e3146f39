use colored::Colorize;
use oneadmin_views::mj_logs::{MjLogsFilter, MjLogsTable};
use oneadmin_views::{Console, Refresh};

use super::require;
use crate::cli::MjArgs;
use crate::output::{mj_table, print_rows, OutputFormat};

pub async fn run(args: MjArgs, ctx: &Console, format: OutputFormat) -> anyhow::Result<()> {
    require(ctx, false)?;
    let mut log = MjLogsTable::new(ctx.clone());
    let mut filter = MjLogsFilter::default();
    if let Some(channel) = args.channel {
        filter.channel_id = channel;
    }
    if let Some(task) = args.task {
        filter.mj_id = task;
    }
    if let Some(start) = args.start {
        filter.start_time = start;
    }
    if let Some(end) = args.end {
        filter.end_time = end;
    }
    log.set_filter(filter);

    if log.show_callback_banner() && format == OutputFormat::Table {
        println!(
            "{}",
            "Task callbacks are not enabled; task status only updates while someone polls it."
                .yellow()
        );
    }
    log.refresh().await?;
    for p in 2..=args.page.max(1) {
        log.set_page(p).await?;
    }
    let admin = ctx.auth.is_admin();
    print_rows(format, log.table().page_rows(), |rows| mj_table(rows, admin))
}
