use accident_analyzer::config::runtime::ReportPreferences;
use accident_analyzer::logging::codes;
use accident_analyzer::{batch, file_processor, logging, pipeline};
use chrono::{DateTime, Utc};
use std::env;
use std::path::{Path, PathBuf};

/// Exit status when a report was produced with `status: error`
const EXIT_REPORT_ERRORS: i32 = 2;
/// Exit status for hard failures
const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Default)]
struct CliOptions {
    output: Option<PathBuf>,
    now: Option<DateTime<Utc>>,
    compact: bool,
    quiet: bool,
    batch: batch::BatchConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(message) =
        logging::init_global_logging().and_then(|_| file_processor::init_file_processor_logging())
    {
        logging::safe_log_error(codes::system::INITIALIZATION_FAILURE, &message);
        std::process::exit(EXIT_FAILURE);
    }

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input.csv|directory> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(EXIT_FAILURE);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let options = match parse_options(&args[2..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(EXIT_FAILURE);
        }
    };

    let input_path = Path::new(&args[1]);
    let status = if input_path.is_file() {
        process_single_file(input_path, &options)
    } else if input_path.is_dir() {
        process_directory_batch(input_path, &options)
    } else {
        eprintln!("Error: Input must be a file (.csv) or directory");
        eprintln!("  Path: {}", input_path.display());
        EXIT_FAILURE
    };

    if status != 0 {
        std::process::exit(status);
    }
    Ok(())
}

fn print_help(program_name: &str) {
    println!("Accident Analyzer v{}", env!("CARGO_PKG_VERSION"));
    println!("Staged validation and aggregation of traffic accident records");
    println!();
    println!("USAGE:");
    println!("    {} <input.csv> [options]          # Analyze one file", program_name);
    println!("    {} <directory> [options]          # Analyze every .csv file", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --output PATH       Write the report to PATH (a directory in batch mode)");
    println!("    --now RFC3339       Judge dates against this moment instead of the clock");
    println!("    --compact           Emit single-line JSON");
    println!("    --sequential        Analyze files one at a time");
    println!("    --threads N         Set maximum number of worker threads");
    println!("    --no-recursive      Don't search subdirectories");
    println!("    --fail-fast         Stop after the first file that cannot be analyzed");
    println!("    --quiet             Suppress per-file status lines");
    println!();
    println!("EXIT STATUS:");
    println!("    0  every report has status success");
    println!("    2  at least one report has status error");
    println!("    1  input could not be read or analyzed");
    println!();
    println!("CONFIGURATION:");
    println!("    {}", accident_analyzer::config::build_info::source_info());
    println!("    {}", logging::config::get_config_summary());
}

fn required_value<'a>(args: &'a [String], i: usize, option: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(|s| s.as_str())
        .ok_or_else(|| format!("{} requires a value", option))
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--output" | "-o" => {
                options.output = Some(PathBuf::from(required_value(args, i, "--output")?));
                i += 1;
            }
            "--now" => {
                let value = required_value(args, i, "--now")?;
                let parsed = DateTime::parse_from_rfc3339(value)
                    .map_err(|e| format!("Invalid --now timestamp '{}': {}", value, e))?;
                options.now = Some(parsed.with_timezone(&Utc));
                i += 1;
            }
            "--compact" => options.compact = true,
            "--quiet" => options.quiet = true,
            "--sequential" => options.batch.max_threads = 1,
            "--threads" => {
                let value = required_value(args, i, "--threads")?;
                match value.parse::<usize>() {
                    Ok(threads) => options.batch.max_threads = threads.max(1),
                    Err(_) => eprintln!("Warning: Invalid thread count '{}', using default", value),
                }
                i += 1;
            }
            "--no-recursive" => options.batch.recursive = false,
            "--fail-fast" => options.batch.fail_fast = true,
            other => eprintln!("Warning: Unknown option '{}'", other),
        }
        i += 1;
    }

    options.batch.now = options.now;
    Ok(options)
}

fn pretty_output(options: &CliOptions) -> bool {
    !options.compact && ReportPreferences::default().pretty_json
}

fn process_single_file(file_path: &Path, options: &CliOptions) -> i32 {
    let now = options.now.unwrap_or_else(Utc::now);

    let result = match pipeline::process_file(file_path, now) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("FAILED: {}", error);
            print_cargo_summary();
            return EXIT_FAILURE;
        }
    };

    let pretty = pretty_output(options);
    let written = match &options.output {
        Some(path) => result.report.write_to(path, pretty),
        None => {
            let json = if pretty {
                result.report.to_json_pretty()
            } else {
                result.report.to_json()
            };
            json.map(|json| println!("{}", json))
        }
    };

    if let Err(error) = written {
        eprintln!("FAILED: {}", error);
        return EXIT_FAILURE;
    }

    print_cargo_summary();
    if result.report.is_success() {
        0
    } else {
        EXIT_REPORT_ERRORS
    }
}

fn process_directory_batch(dir_path: &Path, options: &CliOptions) -> i32 {
    let config = &options.batch;
    eprintln!("Starting batch analysis: {}", dir_path.display());
    eprintln!(
        "Configuration: {} threads, recursive={}, fail_fast={}",
        config.max_threads, config.recursive, config.fail_fast
    );

    let results = match batch::process_directory_with_config(dir_path, config) {
        Ok(results) => results,
        Err(error) => {
            eprintln!("Batch analysis failed: {}", error);
            print_cargo_summary();
            return EXIT_FAILURE;
        }
    };

    let mut write_failures = 0;
    if let Some(output_dir) = &options.output {
        if let Err(error) = std::fs::create_dir_all(output_dir) {
            eprintln!("Cannot create output directory {}: {}", output_dir.display(), error);
            return EXIT_FAILURE;
        }
        let pretty = pretty_output(options);
        for (file_path, result) in &results.successful_files {
            let target = report_path(output_dir, file_path);
            if let Err(error) = result.report.write_to(&target, pretty) {
                eprintln!("  {}: {}", target.display(), error);
                write_failures += 1;
            }
        }
    }

    if !options.quiet {
        print_batch_results(&results);
    }
    print_cargo_summary();
    eprintln!("{}", results.summary());

    if results.failure_count() > 0 || write_failures > 0 {
        EXIT_FAILURE
    } else if results.error_report_count() > 0 {
        EXIT_REPORT_ERRORS
    } else {
        0
    }
}

/// `<output_dir>/<stem>.report.json`
fn report_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output_dir.join(format!("{}.report.json", stem))
}

fn print_batch_results(results: &batch::BatchResults) {
    for (file_path, result) in &results.successful_files {
        eprintln!(
            "  {}: {} ({} records, {} errors)",
            file_path.display(),
            result.report.status.as_str(),
            result.record_count,
            result.report.errors().len()
        );
    }
    for (file_path, error) in &results.failed_files {
        eprintln!("  {}: failed [{}] {}", file_path.display(), error.error_code(), error);
    }
}

/// Cargo-style listing, only when some file logged an error or warning
fn print_cargo_summary() {
    let summary = logging::get_processing_summary();
    if logging::config::use_cargo_style_output() && (summary.has_errors() || summary.has_warnings()) {
        logging::print_cargo_style_summary();
    }
}
