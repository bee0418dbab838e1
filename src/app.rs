//! Application entry point: config → scanner → analyzer → reporter → relocate.

use std::collections::HashSet;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::{PlanOnly, RelocateDuplicates};
use crate::cli::{Cli, Commands, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{analyze_result, DuplicateAnalysis};
use crate::error::ExitCode;
use crate::logging::init_logging;
use crate::output::text::comparison_line;
use crate::output::{CsvOutput, JsonOutput, TextReport};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::{FileRecord, ScanConfig, ScanResult, ScanStrategy, Scanner};
use crate::signal::install_handler;

/// Run the CLI and return the process exit code.
///
/// # Errors
///
/// Returns an error for configuration problems, a fatal walk error, an
/// interrupted scan, or a failure to write the report. Map it to an exit
/// code with [`ExitCode::from_error`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    match cli.command {
        Commands::Scan(ref args) => run_scan(&cli, args),
    }
}

fn run_scan(cli: &Cli, args: &ScanArgs) -> Result<ExitCode> {
    let config = args.apply_to(Config::load(args.config.as_deref())?);
    let scan_config = Arc::new(config.to_scan_config()?);
    log::debug!("Scan configuration: {:?}", scan_config);

    let handler = install_handler()?;
    let mut scanner =
        Scanner::new(Arc::clone(&scan_config)).with_shutdown_flag(handler.get_flag());
    if !cli.quiet && args.output == OutputFormat::Text {
        let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(false));
        scanner = scanner
            .with_progress_callback(progress)
            .with_pre_count(true);
    }

    let result = if args.compare {
        run_comparison(&mut scanner, &scan_config, args.output)?
    } else {
        scanner.scan().cloned()?
    };

    let analysis = analyze_result(&result);
    let exit_code = ExitCode::for_outcome(analysis.has_duplicates(), result.has_errors());

    write_report(cli, args, &config, &result, &analysis, exit_code)
        .context("Failed to write report")?;

    if let Some(ref backup) = config.backup_folder {
        if analysis.has_duplicates() {
            let plan = PlanOnly::new(result.root())
                .relocate(backup, &analysis.groups, config.dry_run)
                .context("Relocation request rejected")?;
            log::info!(
                "Relocation plan: {} files ({} bytes), performed: {}",
                plan.len(),
                plan.bytes,
                plan.performed
            );
        }
    }

    Ok(exit_code)
}

/// Run the concurrent strategy, then the sequential one, and report both
/// timings. Returns the result of the strategy the config selects.
fn run_comparison(
    scanner: &mut Scanner,
    scan_config: &ScanConfig,
    format: OutputFormat,
) -> Result<ScanResult> {
    let workers = scan_config.resolved_workers();
    let concurrent = scanner
        .scan_with(ScanStrategy::Concurrent { workers })
        .cloned()?;
    let sequential = scanner.scan_with(ScanStrategy::Sequential).cloned()?;

    for result in [&concurrent, &sequential] {
        let line = comparison_line(result);
        if format == OutputFormat::Text {
            println!("{line}");
        } else {
            log::info!("{}", line);
        }
    }

    let concurrent_set: HashSet<&FileRecord> = concurrent.records().iter().collect();
    let sequential_set: HashSet<&FileRecord> = sequential.records().iter().collect();
    if concurrent_set != sequential_set {
        log::warn!(
            "Strategies disagree: concurrent found {} files, sequential found {}",
            concurrent.len(),
            sequential.len()
        );
    }

    Ok(if scan_config.concurrent { concurrent } else { sequential })
}

fn write_report(
    cli: &Cli,
    args: &ScanArgs,
    config: &Config,
    result: &ScanResult,
    analysis: &DuplicateAnalysis,
    exit_code: ExitCode,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.output {
        OutputFormat::Text => {
            let color = !cli.no_color && io::stdout().is_terminal();
            TextReport::new(result, analysis)
                .with_backup_folder(config.backup_folder.clone())
                .with_max_depth(config.max_depth())
                .with_algorithm(config.hash_algorithm)
                .with_list_files(args.list_files)
                .with_color(color)
                .write_to(&mut out)?;
        }
        OutputFormat::Json => {
            JsonOutput::new(result, analysis, exit_code).write_to(&mut out, true)?;
        }
        OutputFormat::Csv => {
            CsvOutput::new(&analysis.groups).write_to(&mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
