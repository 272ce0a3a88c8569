// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use keycode_gen::{
    Config, Policy, Radix, WriteMode,
    generate::{DEFAULT_CAPS_FILE, DEFAULT_CURSES_HEADER, DEFAULT_OUTPUT_PREFIX},
};

/// Generate the keycode lookup table sources
#[derive(Parser, Debug)]
#[command(name = "keycode-gen", version, about, long_about = None)]
#[command(args_override_self = true)]
struct Args {
    /// Output path prefix, `.h` and `.cc` are appended
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT_PREFIX)]
    output_prefix: PathBuf,

    /// Terminfo capability table
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CAPS_FILE)]
    caps_file: PathBuf,

    /// Curses header with KEY_* macros
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CURSES_HEADER)]
    curses_header: PathBuf,

    /// Radix of key codes in the capability table (octal or decimal)
    #[arg(long, value_name = "RADIX", default_value = "octal")]
    caps_radix: Radix,

    /// Radix of key codes in the curses header (octal or decimal)
    #[arg(long, value_name = "RADIX", default_value = "octal")]
    header_radix: Radix,

    /// Fail on unparsable key codes instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Write through a temporary file renamed into place
    #[arg(long)]
    atomic: bool,

    /// Year for the copyright lines [default: current year]
    #[arg(long)]
    year: Option<i32>,

    /// Template for the declaration file
    #[arg(long, value_name = "PATH")]
    header_template: Option<PathBuf>,

    /// Template for the definition file
    #[arg(long, value_name = "PATH")]
    source_template: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    fn into_config(self) -> Config {
        Config {
            output_prefix: self.output_prefix,
            caps_file: self.caps_file,
            curses_header: self.curses_header,
            caps_radix: self.caps_radix,
            header_radix: self.header_radix,
            policy: if self.strict {
                Policy::Strict
            } else {
                Policy::Lenient
            },
            write_mode: if self.atomic {
                WriteMode::Atomic
            } else {
                WriteMode::Direct
            },
            year: self.year,
            header_template: self.header_template,
            source_template: self.source_template,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    match keycode_gen::run(&args.into_config()) {
        Ok(summary) => {
            log::debug!("{summary:?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let err = anyhow::Error::from(err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
