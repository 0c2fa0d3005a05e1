// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! rangefix - rewrite Go counting loops as range-over-int loops.

mod files;
mod output;
mod report;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rangefix_ast::LineMap;
use rangefix_fix::{fix_file, FileOutcome, FixError, FixOptions};
use rangefix_rewrite::RewriteConfig;

use report::Report;

#[derive(Parser, Debug)]
#[command(
    name = "rangefix",
    version,
    about = "Rewrite `for i := 0; i < n; i++` loops as `for i := range n`"
)]
struct Cli {
    /// Go files or directories to process
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Compute and report changes without writing any file
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Skip loops whose body writes to the counter or the bound
    #[arg(long)]
    strict: bool,

    /// Print a JSON report instead of human output
    #[arg(long)]
    json: bool,

    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    output::init();
    init_tracing(cli.log_level());

    let options = FixOptions {
        dry_run: cli.dry_run,
        rewrite: RewriteConfig { strict: cli.strict },
        ..FixOptions::default()
    };

    let (paths, walk_errors) = files::collect(&cli.paths);
    let mut report = Report::default();

    for err in walk_errors {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        if !cli.json {
            output::show_error(&path.display().to_string(), &err.to_string());
        }
        report.record_walk_error(&path, err.to_string());
    }

    for path in &paths {
        match fix_file(path, &options) {
            Ok(outcome) => {
                if !cli.json {
                    print_outcome(path, outcome);
                }
                report.record_outcome(path, outcome);
            }
            Err(err) => {
                if !cli.json {
                    print_error(path, &err);
                }
                report.record_error(path, &err);
            }
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("{}: cannot encode report: {}", output::error_label(), err);
                return ExitCode::FAILURE;
            }
        }
    } else {
        let s = &report.summary;
        println!("{}", output::summary(s.files, s.changed, s.failed, cli.dry_run));
    }

    if report.summary.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_outcome(path: &Path, outcome: FileOutcome) {
    let shown = path.display().to_string();
    match outcome {
        FileOutcome::Unchanged => {}
        FileOutcome::WouldUpdate { rewrites } => {
            println!("{} {} ({})", output::status_would_update(), output::file_path(&shown), output::loop_count(rewrites));
        }
        FileOutcome::Updated { rewrites } => {
            println!("{} {} ({})", output::status_updated(), output::file_path(&shown), output::loop_count(rewrites));
        }
    }
}

fn print_error(path: &Path, err: &FixError) {
    let shown = path.display().to_string();
    match err {
        FixError::Parse { errors } => {
            let source = fs::read_to_string(path).unwrap_or_default();
            let lines = LineMap::new(&source);
            for error in errors {
                output::show_syntax_error(&shown, &source, &lines, error);
            }
        }
        FixError::Io { source, .. } => output::show_error(&shown, &source.to_string()),
        FixError::Print(_) => output::show_error(&shown, &err.to_string()),
    }
}
