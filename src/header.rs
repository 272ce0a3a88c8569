// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Extracting key code macros from a curses header
//!
//! Keycode macros are object-like macros with a numeric body and a comment:
//!
//! ```text
//! #define KEY_DOWN	0402		/* down-arrow key */
//! ```
//!
//! Everything else in the header is skipped without complaint.

use std::sync::LazyLock;

use regex::Regex;

use crate::entry::{Diagnose, EntryList, KeyEntry, ParseReport, Policy, Radix, Severity};

static DEFINE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#define (KEY_[A-Z_]+)\s+([0-9]+)\s+/\*(.*)\*/\s*$")
        .expect("define regex must compile")
});

/// Errors reported when parsing a curses header
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The macro value is not a valid number in the configured radix
    #[error("failed to parse {radix} value {token:?} of {name} on line {line_number}")]
    InvalidCode {
        line_number: usize,
        name: String,
        token: String,
        radix: Radix,
    },
}

impl Diagnose for Error {
    fn severity(&self) -> Severity {
        match self {
            Self::InvalidCode { .. } => Severity::Recoverable,
        }
    }
}

/// Curses header parser
///
/// Curses headers spell key codes in octal, which is the default radix.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeaderParser {
    pub radix: Radix,
    pub policy: Policy,
}

impl HeaderParser {
    pub const fn new(radix: Radix, policy: Policy) -> Self {
        Self { radix, policy }
    }

    /// Parse a single line
    ///
    /// Returns `Ok(None)` for lines that are not keycode macros.
    pub fn parse_line(&self, line_number: usize, line: &str) -> Result<Option<KeyEntry>, Error> {
        let Some(captures) = DEFINE_LINE.captures(line) else {
            return Ok(None);
        };
        let name = &captures[1];
        let token = &captures[2];
        let Some(code) = self.radix.parse_digits(token) else {
            return Err(Error::InvalidCode {
                line_number,
                name: name.to_string(),
                token: token.to_string(),
                radix: self.radix,
            });
        };
        Ok(Some(KeyEntry::new(name, name, code, captures[3].trim())))
    }

    /// Parse the whole header, appending keycode macros to `entries`
    ///
    /// Macros whose code is already in the list are dropped, so entries
    /// parsed earlier (the capability table) take precedence.
    pub fn parse(&self, text: &str, entries: &mut EntryList) -> Result<ParseReport<Error>, Error> {
        let mut report = ParseReport::default();
        for (index, line) in text.lines().enumerate() {
            match self.parse_line(index + 1, line) {
                Ok(Some(entry)) => {
                    if entries.push(entry) {
                        report.accepted += 1;
                    } else {
                        report.duplicates += 1;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    let err = self.policy.triage(err)?;
                    log::warn!("{err}, skipping");
                    report.skipped.push(err);
                }
            }
        }
        Ok(report)
    }
}
