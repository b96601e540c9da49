use lane_lines::batch::{self, BatchOptions};
use lane_lines::error::LaneError;
use lane_lines::frontend::HoughFrontend;
use log::LevelFilter;
use std::process::ExitCode;

mod cli_app;

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

// Detect the lanes of every image in the input directory and write the annotated images
fn detect_lanes(args: &cli_app::Args) -> Result<(), LaneError> {
    let config = args.config()?;
    log::debug!("Running with arguments: {:?}", args);

    let frontend = HoughFrontend::new(config.frontend);
    let report = batch::process_directory(
        &args.input_dir,
        &args.output_dir,
        &config,
        &frontend,
        BatchOptions {
            intermediates: args.intermediates,
        },
    )?;

    log::info!(
        "{} images processed, {} failed in {:.2}s",
        report.processed,
        report.failed,
        report.elapsed_seconds
    );

    if let Some(data_filepath) = &args.data_filepath {
        std::fs::write(data_filepath, serde_json::to_string(&report)?).map_err(|source| {
            LaneError::Io {
                path: data_filepath.clone(),
                source,
            }
        })?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = match cli_app::parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    init_logging(args.verbosity);

    match detect_lanes(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
