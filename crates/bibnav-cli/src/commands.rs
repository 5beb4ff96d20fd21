use anyhow::Result;
use bibnav_runtime::logging;

use super::args::{Cli, Commands};
use super::context::ExecutionContext;
use super::handlers;

pub fn run(cli: Cli) -> Result<()> {
    let ctx = ExecutionContext::new(cli.data_dir, cli.config, cli.database)?;

    let log_path = cli
        .log_file
        .unwrap_or_else(|| logging::default_log_path(ctx.data_dir()));
    logging::init(&cli.log_level.to_string(), &log_path)?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => handlers::tui::handle(&ctx),
        Commands::List { args } => handlers::list::handle(&ctx, &args),
        Commands::Show { label } => handlers::show::handle(&ctx, &label),
        Commands::Search {
            query,
            context,
            args,
        } => handlers::search::handle(&ctx, &query, context, &args),
        Commands::Init { force } => handlers::init::handle(&ctx, force),
    }
}
