// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key records shared by both input sources

use std::{cmp::Ordering, fmt, str::FromStr};

/// Code used for capabilities that exist but have no key code assigned
pub const UNBOUND_CODE: u32 = 0;

/// Prefix of key capability names in the capability table
pub const KEY_PREFIX: &str = "key_";

/// One key binding extracted from either input source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEntry {
    pub name: String,
    pub macro_name: String,
    pub code: u32,
    pub description: String,
}

impl KeyEntry {
    pub fn new(
        name: impl Into<String>,
        macro_name: impl Into<String>,
        code: u32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            macro_name: macro_name.into(),
            code,
            description: description.into(),
        }
    }

    pub const fn is_unbound(&self) -> bool {
        self.code == UNBOUND_CODE
    }
}

/// Upper-case a token if it starts with `key_`, return it unchanged otherwise
pub fn upcase_key_prefix(token: &str) -> String {
    if token.starts_with(KEY_PREFIX) {
        token.to_uppercase()
    } else {
        token.to_string()
    }
}

/// Numeric base used to read key code literals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Radix {
    /// Capability table literals need a leading zero, like `0402`
    #[default]
    Octal,
    Decimal,
}

impl Radix {
    pub const fn base(self) -> u32 {
        match self {
            Self::Octal => 8,
            Self::Decimal => 10,
        }
    }

    /// Parse a code literal, returning `None` if it is not valid in this base
    ///
    /// Octal literals must be spelled with a leading zero, as in the
    /// capability table.
    pub fn parse_code(self, token: &str) -> Option<u32> {
        if self == Self::Octal && (token.len() < 2 || !token.starts_with('0')) {
            return None;
        }
        self.parse_digits(token)
    }

    /// Parse a run of digits in this base, with no requirement on the spelling
    pub fn parse_digits(self, token: &str) -> Option<u32> {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        u32::from_str_radix(token, self.base()).ok()
    }
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Octal => f.write_str("octal"),
            Self::Decimal => f.write_str("decimal"),
        }
    }
}

impl FromStr for Radix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "octal" | "oct" | "8" => Ok(Self::Octal),
            "decimal" | "dec" | "10" => Ok(Self::Decimal),
            other => Err(format!("unknown radix {other:?}, expected octal or decimal")),
        }
    }
}

/// How bad a parse error is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// The input cannot be trusted, the run must stop
    Fatal,
    /// Only the current record is lost
    Recoverable,
}

/// Classification of parser errors
pub trait Diagnose {
    fn severity(&self) -> Severity;
}

/// What to do with recoverable parse errors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Policy {
    /// Report the error, drop the record and continue
    #[default]
    Lenient,
    /// Treat every error as fatal
    Strict,
}

impl Policy {
    /// Returns `Err` if the error must stop parsing, `Ok` with the error to report otherwise
    pub fn triage<E: Diagnose>(self, err: E) -> Result<E, E> {
        match (err.severity(), self) {
            (Severity::Recoverable, Self::Lenient) => Ok(err),
            _ => Err(err),
        }
    }
}

/// Outcome of parsing one source into an [`EntryList`]
#[derive(Debug)]
pub struct ParseReport<E> {
    /// Records added to the list
    pub accepted: usize,
    /// Records dropped because their code was already taken
    pub duplicates: usize,
    /// Recoverable errors reported and skipped
    pub skipped: Vec<E>,
}

impl<E> Default for ParseReport<E> {
    fn default() -> Self {
        Self {
            accepted: 0,
            duplicates: 0,
            skipped: Vec::new(),
        }
    }
}

/// Ordered key records with at most one record per code
///
/// The first record for a code wins, including the unbound code, so only
/// one unbound capability survives. Sources parsed first take precedence.
#[derive(Clone, Debug, Default)]
pub struct EntryList {
    entries: Vec<KeyEntry>,
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_code(&self, code: u32) -> bool {
        self.entries.iter().any(|entry| entry.code == code)
    }

    /// Append the entry unless its code is already present
    ///
    /// Returns `true` if the entry was added.
    pub fn push(&mut self, entry: KeyEntry) -> bool {
        if self.contains_code(entry.code) {
            log::debug!(
                "dropping {} ({}), code {} already taken",
                entry.name,
                entry.macro_name,
                entry.code
            );
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyEntry> {
        self.entries.iter()
    }

    /// Entries sorted for table generation, see [`table_order`]
    pub fn sorted(&self) -> Vec<&KeyEntry> {
        let mut sorted: Vec<&KeyEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| table_order(a, b));
        sorted
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a KeyEntry;
    type IntoIter = std::slice::Iter<'a, KeyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Bound codes first in ascending order, unbound entries last ordered by name
pub fn table_order(a: &KeyEntry, b: &KeyEntry) -> Ordering {
    match (a.is_unbound(), b.is_unbound()) {
        (true, true) => a.name.cmp(&b.name),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.code.cmp(&b.code),
    }
}
