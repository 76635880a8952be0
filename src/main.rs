// rpgcode: batch syntax checker for RPGCode programs

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as _;
use crossterm::style::Stylize;
use env_logger::{self as logger};

use rpgcode::driver::{self, DriverError, FileReport, Summary};
use rpgcode::parser::ParserOptions;

const RPGCODE_LOG: &str = "RPGCODE_LOG";
const RPGCODE_LOG_STYLE: &str = "RPGCODE_LOG_STYLE";

/// Parse RPGCode programs and report syntax errors
#[derive(clap::Parser, Debug)]
#[command(name = "rpgcode", version, about)]
struct Cli {
    /// Files or directories to check
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Extension of program files searched for in directories
    #[arg(short, long, default_value = driver::DEFAULT_EXTENSION)]
    extension: String,

    /// Print the token stream of each file
    #[arg(long)]
    tokens: bool,

    /// Print the syntax tree of each file
    #[arg(long)]
    ast: bool,

    /// Skip to the end of a statement after an error in it
    #[arg(long)]
    recover: bool,

    /// Stop reporting a file after this many errors
    #[arg(long, value_name = "N")]
    max_errors: Option<usize>,

    /// Only print the summary and failing files
    #[arg(short, long)]
    quiet: bool,
}

fn bootstrap() {
    if std::env::var(RPGCODE_LOG).is_ok() {
        logger::Builder::from_env(logger::Env::new().filter(RPGCODE_LOG).write_style(RPGCODE_LOG_STYLE))
            .format_timestamp_micros()
            .init();
        log::debug!("logging initialized");
    } else {
        logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .format_timestamp_millis()
            .init()
    }
}

fn main() -> ExitCode {
    bootstrap();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<Summary, DriverError> {
    let options = ParserOptions {
        recover_to_statement_boundary: cli.recover,
        max_errors: cli.max_errors,
    };

    let files = driver::collect_sources(&cli.paths, &cli.extension)?;
    let mut summary = Summary::default();

    for path in &files {
        let report = match driver::check_file(path, &options) {
            Ok(report) => report,
            Err(e) => {
                // an unreadable file counts as a failure, the batch goes on
                eprintln!("{} {}", "FAIL".red().bold(), e);
                summary.failed += 1;
                continue;
            }
        };

        summary.record(&report);
        print_report(cli, &report);
    }

    print_summary(&summary);
    Ok(summary)
}

fn print_report(cli: &Cli, report: &FileReport) {
    let path = report.path.display();

    if report.passed() {
        if !cli.quiet {
            println!("{} {}", "PASS".green().bold(), path);
        }
    } else {
        println!("{} {}", "FAIL".red().bold(), path);
        for error in &report.outcome.errors {
            println!("    {}:{}:{}: {}", path, error.line, error.column, error.message);
        }
    }

    if cli.tokens && !cli.quiet {
        print!("{}", driver::dump_tokens(&report.source));
    }
    if cli.ast && !cli.quiet {
        println!("{:#?}", report.outcome.unit);
    }
}

fn print_summary(summary: &Summary) {
    let line = format!(
        "{} passed, {} failed ({:.1}%)",
        summary.passed,
        summary.failed,
        summary.percentage()
    );
    if summary.is_success() {
        println!("{}", line.green());
    } else {
        println!("{}", line.yellow());
    }
}
