// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Dense keycode table built from the merged key entries

use std::{collections::BTreeMap, fmt};

use crate::entry::{EntryList, UNBOUND_CODE};

/// Characters rendered as themselves rather than as escapes
pub const PRINTABLE: &str = concat!(
    "0123456789",
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ ",
);

/// Column where the trailing comment of a cell line starts
pub const COMMENT_COLUMN: usize = 30;

const CELL_INDENT: &str = "      ";

/// Codes below this limit map to ASCII characters
const ASCII_LIMIT: u32 = 128;

/// Highest code the table may cover, the decoder keeps codes in 16 bits
pub const MAX_TABLE_CODE: u32 = 0xffff;

/// Errors reported when building the table
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Neither source produced a single key
    #[error("No key entries found")]
    Empty,
    /// A key code is too large for a dense table
    #[error("Key code {code} of {name} exceeds the table limit {limit}", limit = MAX_TABLE_CODE)]
    CodeTooLarge { code: u32, name: String },
}

/// Table value for one key code
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedCell {
    /// Code with a key name
    Named { name: String, description: String },
    /// Printable ASCII character
    Literal(char),
    /// Non-printable ASCII character
    EscapedByte(u8),
    /// Code with no name and no character
    Placeholder(u32),
}

/// Quote `\` and `"` for a C string literal
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn with_comment(f: &mut fmt::Formatter<'_>, value: &str, comment: &str) -> fmt::Result {
    let padding = COMMENT_COLUMN.saturating_sub(value.len());
    write!(f, "{value}{:padding$}// {comment}", "")
}

impl fmt::Display for RenderedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, description } => {
                with_comment(f, &format!("{CELL_INDENT}\"{name}\","), description)
            }
            Self::Literal(c) => write!(f, "{CELL_INDENT}\"{}\",", escape(&c.to_string())),
            Self::EscapedByte(byte) => write!(f, "{CELL_INDENT}\"\\x{byte:02x}\","),
            Self::Placeholder(code) => with_comment(
                f,
                &format!("{CELL_INDENT}nullptr,"),
                &format!("keycode {code}"),
            ),
        }
    }
}

/// Name to code pair for the secondary lookup structure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapAssignment {
    pub name: String,
    pub code: u32,
}

impl MapAssignment {
    /// Render using a statement template with `{name}` and `{code}` placeholders
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{name}", &escape(&self.name))
            .replace("{code}", &self.code.to_string())
    }
}

/// Dense table covering every code from 0 to `max_code`
#[derive(Clone, Debug)]
pub struct KeycodeTable {
    pub max_code: u32,
    pub cells: Vec<RenderedCell>,
    pub assignments: Vec<MapAssignment>,
}

impl KeycodeTable {
    /// Build the table from deduplicated entries
    pub fn build(entries: &EntryList) -> Result<Self, Error> {
        let names: BTreeMap<u32, (&str, &str)> = entries
            .sorted()
            .into_iter()
            .map(|entry| (entry.code, (entry.name.as_str(), entry.description.as_str())))
            .collect();
        let Some((&max_code, &(name, _))) = names.iter().next_back() else {
            return Err(Error::Empty);
        };
        if max_code > MAX_TABLE_CODE {
            return Err(Error::CodeTooLarge {
                code: max_code,
                name: name.to_string(),
            });
        }

        let mut cells = Vec::with_capacity(max_code as usize + 1);
        let mut assignments = Vec::new();
        for code in 0..=max_code {
            let cell = match names.get(&code) {
                Some(&(name, description)) if code != UNBOUND_CODE => RenderedCell::Named {
                    name: name.to_string(),
                    description: description.to_string(),
                },
                _ => Self::unnamed_cell(code),
            };
            match &cell {
                RenderedCell::Named { name, .. } => assignments.push(MapAssignment {
                    name: name.clone(),
                    code,
                }),
                RenderedCell::Literal(c) => assignments.push(MapAssignment {
                    name: c.to_string(),
                    code,
                }),
                RenderedCell::EscapedByte(_) | RenderedCell::Placeholder(_) => {}
            }
            cells.push(cell);
        }

        log::debug!(
            "built table of {} cells with {} named codes",
            cells.len(),
            assignments.len()
        );
        Ok(Self {
            max_code,
            cells,
            assignments,
        })
    }

    fn unnamed_cell(code: u32) -> RenderedCell {
        if code >= ASCII_LIMIT {
            return RenderedCell::Placeholder(code);
        }
        let byte = code as u8;
        let c = char::from(byte);
        if PRINTABLE.contains(c) {
            RenderedCell::Literal(c)
        } else {
            RenderedCell::EscapedByte(byte)
        }
    }

    /// Number of cells, always `max_code + 1`
    pub const fn array_size(&self) -> usize {
        self.max_code as usize + 1
    }

    /// One line per cell, in code order
    pub fn render_codes(&self) -> String {
        self.cells
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One statement per assignment, in code order
    pub fn render_assignments(&self, template: &str) -> String {
        self.assignments
            .iter()
            .map(|assignment| assignment.render(template))
            .collect::<Vec<_>>()
            .join("\n  ")
    }
}
