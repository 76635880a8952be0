//! Batch checking of RPGCode programs
//!
//! The driver gathers source files (directories are searched recursively
//! for a given extension), decodes them lossily, parses each one and keeps
//! a running pass/fail tally. Output formatting lives in the binary.

use crate::parser::lexer::Lexer;
use crate::parser::token::TokenKind;
use crate::parser::{parse_with_options, ParseOutcome, ParserOptions};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default extension of RPGCode programs
pub const DEFAULT_EXTENSION: &str = "prg";

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("no input files found")]
    NoInputs,

    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of checking one file
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub source: String,
    pub outcome: ParseOutcome,
}

impl FileReport {
    pub fn passed(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Pass/fail tally over a batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn record(&mut self, report: &FileReport) {
        if report.passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Share of passing files, `100.0` for an empty batch.
    pub fn percentage(&self) -> f64 {
        match self.total() {
            0 => 100.0,
            total => self.passed as f64 * 100.0 / total as f64,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Expand `paths` into the list of files to check.
///
/// Files named explicitly are kept whatever their extension; directories
/// contribute every file below them whose extension matches (ignoring
/// case). The result is sorted and free of duplicates.
pub fn collect_sources(paths: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>, DriverError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk(path, extension, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }

    files.sort();
    files.dedup();
    log::debug!("collected {} source files", files.len());

    if files.is_empty() {
        return Err(DriverError::NoInputs);
    }
    Ok(files)
}

fn walk(dir: &Path, extension: &str, files: &mut Vec<PathBuf>) -> Result<(), DriverError> {
    let entries = fs::read_dir(dir).map_err(|source| io_error(dir, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| io_error(dir, source))?;
        let path = entry.path();
        // symlinks are not followed
        let file_type = entry.file_type().map_err(|source| io_error(&path, source))?;
        if file_type.is_dir() {
            walk(&path, extension, files)?;
        } else if has_extension(&path, extension) {
            files.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn io_error(path: &Path, source: io::Error) -> DriverError {
    DriverError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a file as bytes and decode it, replacing invalid UTF-8.
pub fn read_source(path: &Path) -> Result<String, DriverError> {
    let bytes = fs::read(path).map_err(|source| io_error(path, source))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read and parse one file.
pub fn check_file(path: &Path, options: &ParserOptions) -> Result<FileReport, DriverError> {
    let source = read_source(path)?;
    let outcome = parse_with_options(&source, options.clone());
    log::debug!("{}: {} errors", path.display(), outcome.errors.len());

    Ok(FileReport {
        path: path.to_path_buf(),
        source,
        outcome,
    })
}

/// One line per token: position, kind and lexeme.
pub fn dump_tokens(source: &str) -> String {
    let mut out = String::new();
    for token in Lexer::new(source).tokenize() {
        match token.kind {
            TokenKind::End | TokenKind::Eol => {
                let _ = writeln!(out, "{token}");
            }
            _ => {
                let _ = writeln!(out, "{token} {:?}", token.lexeme(source));
            }
        }
    }
    out
}
