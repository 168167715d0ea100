mod commands;
mod handlers;
mod output;

use clap::Parser;
use commands::Cli;
use output::print_error;
use sensorchart_core::ChartConfig;

fn init_logger(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = match ChartConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            print_error(&err.to_string());
            std::process::exit(1);
        }
    };
    init_logger(&config.log_level);

    if let Err(err) = handlers::handle_command(cli.command, &config) {
        print_error(&err.to_string());
        std::process::exit(1);
    }
}
