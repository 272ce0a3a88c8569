// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Keycode table generator
//!
//! Reads the key capabilities of a terminfo capability table and the keycode
//! macros of a curses header, and writes a dense code-indexed lookup table as
//! a pair of C++ source files.

pub mod caps;
pub mod emit;
pub mod entry;
pub mod generate;
pub mod header;
pub mod table;

pub use caps::CapsParser;
pub use emit::{Artifacts, Templates, WriteMode};
pub use entry::{EntryList, KeyEntry, Policy, Radix};
pub use generate::{Config, Summary, run};
pub use header::HeaderParser;
pub use table::{KeycodeTable, MapAssignment, RenderedCell};
