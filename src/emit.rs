// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rendering and writing the generated declaration and definition files

use std::{
    ffi::OsString,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::{Captures, Regex};
use tempfile::NamedTempFile;

use crate::table::KeycodeTable;

/// Built-in declaration file template
pub const HEADER_TEMPLATE: &str = include_str!("../templates/keycode.h.in");

/// Built-in definition file template
pub const SOURCE_TEMPLATE: &str = include_str!("../templates/keycode.cc.in");

/// Built-in statement for one `{map_code}` entry
pub const ASSIGNMENT_TEMPLATE: &str =
    r#"arr->Set(String::New("{name}"), Integer::New({code}), v8::ReadOnly);"#;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex must compile"));

/// Errors reported when rendering or writing the generated files
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The template refers to a value that is not provided
    #[error("Unknown placeholder {{{0}}} in template")]
    UnknownPlaceholder(String),
    /// The output file could not be written
    #[error("Cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How output files are written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Create or truncate the file and write it in place
    #[default]
    Direct,
    /// Write a temporary file next to the target and rename it over the target
    Atomic,
}

/// Templates for both generated files
#[derive(Clone, Debug)]
pub struct Templates {
    pub header: String,
    pub source: String,
    pub assignment: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            header: HEADER_TEMPLATE.to_string(),
            source: SOURCE_TEMPLATE.to_string(),
            assignment: ASSIGNMENT_TEMPLATE.to_string(),
        }
    }
}

/// Values substituted into the templates
#[derive(Clone, Debug)]
pub struct TemplateContext {
    pub year: i32,
    pub max_code: u32,
    pub array_size: usize,
    pub codes: String,
    pub map_code: String,
    pub header_basename: String,
}

impl TemplateContext {
    pub fn new(table: &KeycodeTable, templates: &Templates, year: i32, header: &Path) -> Self {
        let header_basename = header
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            year,
            max_code: table.max_code,
            array_size: table.array_size(),
            codes: table.render_codes(),
            map_code: table.render_assignments(&templates.assignment),
            header_basename,
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        let value = match name {
            "year" => self.year.to_string(),
            "max_code" => self.max_code.to_string(),
            "array_size" => self.array_size.to_string(),
            "codes" => self.codes.clone(),
            "map_code" => self.map_code.clone(),
            "header_basename" => self.header_basename.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Replace every `{placeholder}` in the template
    pub fn render(&self, template: &str) -> Result<String, Error> {
        let mut unknown = None;
        let rendered = PLACEHOLDER.replace_all(template, |captures: &Captures<'_>| {
            let name = &captures[1];
            self.lookup(name).unwrap_or_else(|| {
                unknown.get_or_insert_with(|| name.to_string());
                String::new()
            })
        });
        match unknown {
            Some(name) => Err(Error::UnknownPlaceholder(name)),
            None => Ok(rendered.into_owned()),
        }
    }
}

/// Paths of the generated files for the output prefix
pub fn output_paths(prefix: &Path) -> (PathBuf, PathBuf) {
    let with_suffix = |suffix: &str| {
        let mut path = OsString::from(prefix.as_os_str());
        path.push(suffix);
        PathBuf::from(path)
    };
    (with_suffix(".h"), with_suffix(".cc"))
}

/// A generated file that has been rendered but not written yet
#[derive(Clone, Debug)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

impl Artifact {
    /// Write the file
    ///
    /// Parent directories are not created.
    pub fn write(&self, mode: WriteMode) -> Result<(), Error> {
        let result = match mode {
            WriteMode::Direct => fs::write(&self.path, &self.contents),
            WriteMode::Atomic => self.write_atomic(),
        };
        result.map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })?;
        log::info!("wrote {}", self.path.display());
        Ok(())
    }

    fn write_atomic(&self) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(self.contents.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

/// Both generated files
#[derive(Clone, Debug)]
pub struct Artifacts {
    pub header: Artifact,
    pub source: Artifact,
}

impl Artifacts {
    /// Render both files completely in memory
    pub fn render(
        table: &KeycodeTable,
        templates: &Templates,
        year: i32,
        prefix: &Path,
    ) -> Result<Self, Error> {
        let (header_path, source_path) = output_paths(prefix);
        let context = TemplateContext::new(table, templates, year, &header_path);
        Ok(Self {
            header: Artifact {
                contents: context.render(templates.header.trim_start())?,
                path: header_path,
            },
            source: Artifact {
                contents: context.render(templates.source.trim_start())?,
                path: source_path,
            },
        })
    }

    /// Write the declaration file, then the definition file
    pub fn write(&self, mode: WriteMode) -> Result<(), Error> {
        self.header.write(mode)?;
        self.source.write(mode)
    }
}
