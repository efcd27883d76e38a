/*!
 * Command-line interface for txtdump
 */

use std::io;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use tracing::{info, warn};

use txtdump::config::{Args, Config};
use txtdump::converter::Converter;
use txtdump::error::{Result, TxtDumpError};
use txtdump::logging::init_tracing;
use txtdump::report::{Reporter, ScanReport};
use txtdump::scanner::Scanner;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    if let Err(e) = init_tracing(args.verbose, args.log_level.as_deref()) {
        eprintln!("Warning: Failed to initialise logging: {}", e);
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(TxtDumpError::Interrupted) => {
            eprintln!("Stopped.");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_args(args);
    config.validate()?;

    match config.preset {
        Some(preset) => info!(preset = preset.label(), "using preset"),
        None => info!("using explicit extensions"),
    }

    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        warn!(error = %e, "failed to set thread pool size");
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst)) {
            warn!(error = %e, "failed to install Ctrl+C handler");
        }
    }

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) ⏱️  Elapsed: {elapsed_precise}  Remaining: {eta_precise}")
            .map_err(|e| TxtDumpError::Config(e.to_string()))?,
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📂 Scanning");
    let progress = Arc::new(progress);

    let scanner = Scanner::new(config.clone(), Arc::clone(&progress));
    let files = scanner.scan()?;

    progress.set_position(0);
    progress.set_prefix("📊 Converting");

    let converter = Converter::new(config.clone(), Arc::clone(&progress)).with_stop_flag(stop);
    let outcome = converter.run(&files)?;
    progress.finish_and_clear();

    let report = ScanReport::from_outcome(&outcome, &config);
    Reporter::new(config.report_format).print_report(&report)?;

    if outcome.interrupted {
        return Err(TxtDumpError::Interrupted);
    }
    Ok(())
}
