use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use jiff::Zoned;

use fixer_usd_rates::output::{assemble_records, default_output_path, write_csv};
use fixer_usd_rates::rebase::rebase_to_usd;
use fixer_usd_rates::{Cli, Config, FixerClient, Result};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(path) => {
            log::info!("data saved to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let config = Config::from_cli(cli)?;

    match config.date {
        Some(date) => log::info!(
            "fetching historical rates for {date} ({} currencies)",
            config.currencies.len()
        ),
        None => log::info!(
            "fetching latest rates ({} currencies)",
            config.currencies.len()
        ),
    }

    let client = FixerClient::new(&config);
    let fetched = client.fetch_rates(config.date, &config.currencies)?;
    log::info!("got {} rates from provider", fetched.rates.len());

    let rebased = rebase_to_usd(&fetched, &config.currencies)?;

    // Latest rates are stamped with today's date.
    let run_date = config.date.unwrap_or_else(|| Zoned::now().date());
    let records = assemble_records(run_date, &rebased);

    let path = config
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(run_date));
    write_csv(&path, &records)?;

    Ok(path)
}
