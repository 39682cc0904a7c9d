//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Thin CLI shell over [`webarchive_extract::extract`]. Owns argument
//! parsing, log-sink selection, and output-directory bootstrap; none of
//! which the library does on the caller's behalf.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use webarchive_extract::{extract, ExtractOptions};

/// Extracts a Safari .webarchive file into a directory of plain files.
#[derive(Parser, Debug)]
#[command(name = "webarchive-extract", version, about)]
struct Cli {
    /// Path to the .webarchive input file.
    input: PathBuf,

    /// Directory to extract into. Created if missing.
    output: PathBuf,

    /// Skip writing JavaScript sub-resources and blank out references to them.
    #[arg(long = "ignore-javascript")]
    ignore_javascript: bool,

    /// Where to send log lines: a file path, or "-" for stderr.
    #[arg(long = "log", value_name = "PATH")]
    log: Option<String>,
}

fn open_log(destination: &Option<String>) -> io::Result<Option<Box<dyn Write>>> {
    match destination.as_deref() {
        None => Ok(None),
        Some("-") => Ok(Some(Box::new(io::stderr()))),
        Some(path) => {
            let file: File = OpenOptions::new().create(true).append(true).open(path)?;
            Ok(Some(Box::new(file)))
        }
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();

    fs::create_dir_all(&cli.output).map_err(|e| format!("could not create output directory: {}", e))?;

    let mut log = open_log(&cli.log).map_err(|e| format!("could not open log destination: {}", e))?;
    let sink: Option<&mut dyn Write> = match log.as_mut() {
        Some(writer) => Some(writer.as_mut()),
        None => None,
    };

    let mut options = ExtractOptions::NONE;
    if cli.ignore_javascript {
        options |= ExtractOptions::IGNORE_JAVASCRIPT_FILES;
    }

    extract(&cli.input, &cli.output, options, sink).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("webarchive-extract: {}", message);
            ExitCode::FAILURE
        }
    }
}
