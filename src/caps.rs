// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parsing the terminfo capability name table (ncurses `Caps` file)
//!
//! Only key capabilities are of interest. A key line looks like this:
//!
//! ```text
//! key_down   kcud1   str   kd   KEY_DOWN   0402   -----   down-arrow key
//! ```
//!
//! The columns are the capability name, the terminfo name, the type (always
//! `str` for keys), the termcap code, the curses macro, the key code (`-` if
//! the key has no code), the flags and the description.

use std::sync::LazyLock;

use regex::Regex;

use crate::entry::{
    Diagnose, EntryList, KEY_PREFIX, KeyEntry, ParseReport, Policy, Radix, Severity,
    UNBOUND_CODE, upcase_key_prefix,
};

/// Code column value for keys without a code
const UNBOUND_MARKER: &str = "-";

static KEY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^([_a-z0-9]+)\s+",            // capability name
        r"[a-zA-Z0-9]+\s+",             // terminfo name
        r"str\s+",                      // type
        r"[a-zA-Z0-9;@%&*#!]+\s+",      // termcap code
        r"([_A-Z()0-9]+)\s+",           // curses macro
        r"([-0-9]+)\s+",                // key code
        r"[-A-Z*]+\s+",                 // flags
        r"(.*)$",                       // description
    ))
    .expect("key line regex must compile")
});

/// Errors reported when parsing the capability table
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A key capability line does not have the expected columns
    #[error("failed to parse line {line_number}: {line:?}")]
    Grammar { line_number: usize, line: String },
    /// The key code column is neither `-` nor a valid number
    #[error("failed to parse code {token:?} on line {line_number}")]
    InvalidCode { line_number: usize, token: String },
}

impl Diagnose for Error {
    fn severity(&self) -> Severity {
        match self {
            Self::Grammar { .. } => Severity::Fatal,
            Self::InvalidCode { .. } => Severity::Recoverable,
        }
    }
}

/// Capability table parser
#[derive(Clone, Copy, Debug, Default)]
pub struct CapsParser {
    pub radix: Radix,
    pub policy: Policy,
}

impl CapsParser {
    pub const fn new(radix: Radix, policy: Policy) -> Self {
        Self { radix, policy }
    }

    /// Parse a single line
    ///
    /// Returns `Ok(None)` for lines that don't describe a key.
    pub fn parse_line(&self, line_number: usize, line: &str) -> Result<Option<KeyEntry>, Error> {
        if !line.starts_with(KEY_PREFIX) {
            return Ok(None);
        }
        let Some(captures) = KEY_LINE.captures(line) else {
            return Err(Error::Grammar {
                line_number,
                line: line.to_string(),
            });
        };

        let token = &captures[3];
        let code = if token == UNBOUND_MARKER {
            UNBOUND_CODE
        } else {
            self.radix
                .parse_code(token)
                .ok_or_else(|| Error::InvalidCode {
                    line_number,
                    token: token.to_string(),
                })?
        };

        Ok(Some(KeyEntry::new(
            upcase_key_prefix(&captures[1]),
            upcase_key_prefix(&captures[2]),
            code,
            &captures[4],
        )))
    }

    /// Parse the whole table, appending key entries to `entries`
    ///
    /// Entries whose code is already in the list are dropped.
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

#[cfg(test)]
mod test {
    use super::*;

    const CAPS: &str = "\
# This is a comment
key_down\t\tkcud1\tstr\tkd\tKEY_DOWN\t\t0402\t-----\tdown-arrow key
key_up\t\t\tkcuu1\tstr\tku\tKEY_UP\t\t\t0403\t-----\tup-arrow key
key_f0\t\t\tkf0\tstr\tk0\tKEY_F(0)\t\t0410\t-----\tF0 function key
key_sdc\t\t\tkDC\tstr\t*4\tKEY_SDC\t\t\t0577\t-----\tshifted delete-character key
newline\t\t\tnel\tstr\tnw\t-\t\t-\t\t-----\tnewline (behave like cr followed by lf)
key_mouse\t\tkmous\tstr\tKm\tKEY_MOUSE\t\t0631\t-----\tMouse event has occurred
";

    fn parser() -> CapsParser {
        CapsParser::default()
    }

    #[test]
    fn parse_key_line() {
        let entry = parser()
            .parse_line(1, "key_up kcuu1 str ku KEY_UP 0200 ----- up-arrow key")
            .unwrap()
            .unwrap();
        assert_eq!(entry, KeyEntry::new("KEY_UP", "KEY_UP", 128, "up-arrow key"));
    }

    #[test]
    fn non_key_lines_ignored() {
        assert_eq!(parser().parse_line(1, "#comment"), Ok(None));
        assert_eq!(parser().parse_line(1, ""), Ok(None));
        assert_eq!(
            parser().parse_line(1, "bell bel str bl - - YB-G- audible signal"),
            Ok(None)
        );
    }

    #[test]
    fn unbound_marker() {
        let entry = parser()
            .parse_line(1, "key_none knone str kn KEY_NONE - ----- no key")
            .unwrap()
            .unwrap();
        assert!(entry.is_unbound());
    }

    #[test]
    fn description_kept_verbatim() {
        let entry = parser()
            .parse_line(1, "key_a1 ka1 str K1 KEY_A1 0534 ----- upper left of keypad  ")
            .unwrap()
            .unwrap();
        assert_eq!(entry.description, "upper left of keypad  ");
    }

    #[test]
    fn missing_type_is_fatal() {
        let line = "key_up kcuu1 ku KEY_UP 0403 ----- up-arrow key";
        let err = parser().parse_line(7, line).unwrap_err();
        assert_eq!(
            err,
            Error::Grammar {
                line_number: 7,
                line: line.to_string()
            }
        );
        assert_eq!(err.severity(), Severity::Fatal);
        assert!(err.to_string().contains(line));
    }

    #[test]
    fn bad_code_is_recoverable() {
        let err = parser()
            .parse_line(3, "key_up kcuu1 str ku KEY_UP 403 ----- up-arrow key")
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidCode {
                line_number: 3,
                token: "403".to_string()
            }
        );
        assert_eq!(err.severity(), Severity::Recoverable);
    }

    #[test]
    fn decimal_radix() {
        let parser = CapsParser::new(Radix::Decimal, Policy::Lenient);
        let entry = parser
            .parse_line(1, "key_up kcuu1 str ku KEY_UP 403 ----- up-arrow key")
            .unwrap()
            .unwrap();
        assert_eq!(entry.code, 403);
    }

    #[test]
    fn parse_table() {
        let mut entries = EntryList::new();
        let report = parser().parse(CAPS, &mut entries).unwrap();
        assert_eq!(report.accepted, 5);
        assert_eq!(report.duplicates, 0);
        assert!(report.skipped.is_empty());
        let codes: Vec<(&str, u32)> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.code))
            .collect();
        assert_eq!(
            codes,
            [
                ("KEY_DOWN", 0o402),
                ("KEY_UP", 0o403),
                ("KEY_F0", 0o410),
                ("KEY_SDC", 0o577),
                ("KEY_MOUSE", 0o631),
            ]
        );
        assert_eq!(entries.iter().nth(2).unwrap().macro_name, "KEY_F(0)");
    }

    #[test]
    fn duplicate_code_first_wins() {
        let text = "\
key_enter kent str @8 KEY_ENTER 0527 ----- enter/send key
key_send ksend str @9 KEY_SEND 0527 ----- send key
";
        let mut entries = EntryList::new();
        let report = parser().parse(text, &mut entries).unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(entries.iter().next().unwrap().name, "KEY_ENTER");
    }

    #[test]
    fn three_unbound_collapse() {
        let text = "\
key_a ka str xa KEY_A - ----- first
key_b kb str xb KEY_B - ----- second
key_c kc str xc KEY_C - ----- third
";
        let mut entries = EntryList::new();
        let report = parser().parse(text, &mut entries).unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.duplicates, 2);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.iter().next().unwrap().name, "KEY_A");
    }

    #[test]
    fn grammar_error_aborts() {
        let text = "\
key_down kcud1 str kd KEY_DOWN 0402 ----- down-arrow key
key_broken
";
        let mut entries = EntryList::new();
        let err = parser().parse(text, &mut entries).unwrap_err();
        assert_eq!(
            err,
            Error::Grammar {
                line_number: 2,
                line: "key_broken".to_string()
            }
        );
    }

    #[test]
    fn lenient_skips_bad_code() {
        let text = "\
key_down kcud1 str kd KEY_DOWN 0902 ----- down-arrow key
key_up kcuu1 str ku KEY_UP 0403 ----- up-arrow key
";
        let mut entries = EntryList::new();
        let report = parser().parse(text, &mut entries).unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(entries.iter().next().unwrap().name, "KEY_UP");
    }

    #[test]
    fn strict_rejects_bad_code() {
        let text = "key_down kcud1 str kd KEY_DOWN 0902 ----- down-arrow key\n";
        let parser = CapsParser::new(Radix::Octal, Policy::Strict);
        let mut entries = EntryList::new();
        assert!(matches!(
            parser.parse(text, &mut entries),
            Err(Error::InvalidCode { line_number: 1, .. })
        ));
        assert!(entries.is_empty());
    }
}
