// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! One generation run, from input files to written artifacts

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{Datelike, Local};

use crate::{
    caps::{self, CapsParser},
    emit::{self, Artifacts, Templates, WriteMode},
    entry::{EntryList, ParseReport, Policy, Radix},
    header::{self, HeaderParser},
    table::{self, KeycodeTable},
};

pub const DEFAULT_OUTPUT_PREFIX: &str = "src/keycode";
pub const DEFAULT_CAPS_FILE: &str = "third_party/Caps";
pub const DEFAULT_CURSES_HEADER: &str = "/usr/include/ncurses.h";

/// Errors that stop a generation run
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// An input file could not be read
    #[error("Cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Caps(#[from] caps::Error),
    #[error(transparent)]
    Header(#[from] header::Error),
    #[error(transparent)]
    Table(#[from] table::Error),
    #[error(transparent)]
    Emit(#[from] emit::Error),
}

/// Settings for a generation run
#[derive(Clone, Debug)]
pub struct Config {
    pub output_prefix: PathBuf,
    pub caps_file: PathBuf,
    pub curses_header: PathBuf,
    pub caps_radix: Radix,
    pub header_radix: Radix,
    pub policy: Policy,
    pub write_mode: WriteMode,
    /// Year for the generated copyright lines, the current year if `None`
    pub year: Option<i32>,
    /// Replacement for the built-in declaration template
    pub header_template: Option<PathBuf>,
    /// Replacement for the built-in definition template
    pub source_template: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_prefix: PathBuf::from(DEFAULT_OUTPUT_PREFIX),
            caps_file: PathBuf::from(DEFAULT_CAPS_FILE),
            curses_header: PathBuf::from(DEFAULT_CURSES_HEADER),
            caps_radix: Radix::Octal,
            header_radix: Radix::Octal,
            policy: Policy::Lenient,
            write_mode: WriteMode::Direct,
            year: None,
            header_template: None,
            source_template: None,
        }
    }
}

/// What a successful run produced
#[derive(Debug)]
pub struct Summary {
    pub caps_accepted: usize,
    pub header_accepted: usize,
    pub skipped: usize,
    pub max_code: u32,
    pub header_path: PathBuf,
    pub source_path: PathBuf,
}

/// Read a text file, replacing bytes that are not valid UTF-8
///
/// Only ASCII lines matter to the parsers, so a Latin-1 comment in a system
/// header must not stop the run.
fn read(path: &Path) -> Result<String, Error> {
    let bytes = fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl Config {
    fn templates(&self) -> Result<Templates, Error> {
        let mut templates = Templates::default();
        if let Some(path) = &self.header_template {
            templates.header = read(path)?;
        }
        if let Some(path) = &self.source_template {
            templates.source = read(path)?;
        }
        Ok(templates)
    }

    /// Parse both sources into one deduplicated list, capabilities first
    pub fn collect_entries(&self, caps_text: &str, header_text: &str) -> Result<Collected, Error> {
        let mut entries = EntryList::new();

        let caps =
            CapsParser::new(self.caps_radix, self.policy).parse(caps_text, &mut entries)?;
        log::info!(
            "{}: {} keys, {} duplicate codes, {} skipped",
            self.caps_file.display(),
            caps.accepted,
            caps.duplicates,
            caps.skipped.len()
        );

        let header =
            HeaderParser::new(self.header_radix, self.policy).parse(header_text, &mut entries)?;
        log::info!(
            "{}: {} keys, {} duplicate codes, {} skipped",
            self.curses_header.display(),
            header.accepted,
            header.duplicates,
            header.skipped.len()
        );

        Ok(Collected {
            entries,
            caps,
            header,
        })
    }
}

/// Merged entries with the per-source parse reports
#[derive(Debug)]
pub struct Collected {
    pub entries: EntryList,
    pub caps: ParseReport<caps::Error>,
    pub header: ParseReport<header::Error>,
}

/// Read the inputs, build the table and write both artifacts
///
/// Nothing is written unless both inputs parse and both artifacts render.
pub fn run(config: &Config) -> Result<Summary, Error> {
    let caps_text = read(&config.caps_file)?;
    let header_text = read(&config.curses_header)?;
    let templates = config.templates()?;

    let collected = config.collect_entries(&caps_text, &header_text)?;
    let table = KeycodeTable::build(&collected.entries)?;
    log::info!(
        "{} keys, max code {}, {} table cells",
        collected.entries.len(),
        table.max_code,
        table.array_size()
    );

    let year = config.year.unwrap_or_else(|| Local::now().year());
    let artifacts = Artifacts::render(&table, &templates, year, &config.output_prefix)?;
    artifacts.write(config.write_mode)?;

    Ok(Summary {
        caps_accepted: collected.caps.accepted,
        header_accepted: collected.header.accepted,
        skipped: collected.caps.skipped.len() + collected.header.skipped.len(),
        max_code: table.max_code,
        header_path: artifacts.header.path,
        source_path: artifacts.source.path,
    })
}
