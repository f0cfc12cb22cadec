use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use dental2yolo::io::write_report;
use dental2yolo::{process_dataset, scan_report, Cli, Command, ConvertConfig};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Convert(args) => {
            let config = ConvertConfig::from(args);
            info!("Starting the conversion process...");
            match process_dataset(&config) {
                Ok(stats) => {
                    info!(
                        "Conversion finished: {} of {} images written.",
                        stats.successful_conversions, stats.total_images
                    );
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("Failed to process dataset: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Scan(args) => {
            let lines = scan_report(&args.dirs);
            match write_report(&args.report, &lines) {
                Ok(()) => {
                    info!("Wrote {}", args.report.display());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("Failed to write report {}: {}", args.report.display(), e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
