use clap::Parser;
use log::{debug, info};
use snafu::ErrorCompat;

mod args;
mod tally;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("args: {:?}", args);

    match tally::run_session(&args) {
        Ok(report) => {
            info!(
                "Done: {} item(s), {} expected, {} scanned",
                report.len(),
                report.total_expected(),
                report.total_observed()
            );
        }
        Err(e) => {
            eprintln!("An error occured: {}", e);
            let mut cause = std::error::Error::source(&e);
            while let Some(c) = cause {
                eprintln!("  caused by: {}", c);
                cause = c.source();
            }
            if let Some(bt) = ErrorCompat::backtrace(&e) {
                eprintln!("trace: {}", bt);
            }
            std::process::exit(1);
        }
    }
}
