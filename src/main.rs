use clap::Parser;
use std::process;
use tracing::warn;

use tasktree::cli::commands::{Cli, Commands};
use tasktree::cli::{self, Context};
use tasktree::config::Config;
use tasktree::db::connection;
use tasktree::logging;

fn main() {
    let cli_args = Cli::parse();
    let json_output = cli_args.json;

    let db_path = match connection::resolve_db_path(cli_args.db.as_deref()) {
        Ok(path) => path,
        Err(e) => process::exit(cli::report_error(&e, json_output)),
    };
    // `init` runs even with a broken config file.
    let (config, config_error) = match Config::load(&connection::config_path(&db_path)) {
        Ok(config) => (config, None),
        Err(e) if matches!(cli_args.command, Commands::Init) => (Config::default(), Some(e)),
        Err(e) => process::exit(cli::report_error(&e, json_output)),
    };
    logging::init(
        cli_args
            .log_level
            .as_deref()
            .or(config.log_level.as_deref()),
    );
    if let Some(e) = config_error {
        warn!("ignoring config: {}", e.message);
    }

    let ctx = Context {
        db_path,
        config,
        json: json_output,
    };
    let exit_code = match cli_args.command {
        Commands::Init => cli::init::run(&ctx),
        Commands::Task(cmd) => cli::task::run(cmd, &ctx),
        Commands::Subtask(cmd) => cli::subtask::run(cmd, &ctx),
    };

    process::exit(exit_code);
}
