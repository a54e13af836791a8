//! X-macro asset manifest
//!
//! The manifest is stored as a C preprocessor list, one macro invocation per
//! row, so firmware code can expand it into tables, enums or switch arms:
//!
//! ```text
//! #define FILE_LIST(XX) \
//! 	XX(VERSION, "VERSION") \
//! 	XX(index_js, "assets/index.js.gz") \
//! 	XX(index_html, "index.html.gz")
//! ```
//!
//! Parsing only checks syntax. Uniqueness and path rules are checked by
//! [`Manifest::validate`] so a broken manifest can still be inspected.

use crate::error::ManifestError;
use crate::model::{check_path, is_valid_symbol, AssetEntry};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Macro name used when none is given
pub const DEFAULT_NAME: &str = "FILE_LIST";

/// Per-row macro parameter used when none is given
pub const DEFAULT_PARAM: &str = "XX";

const DEFINE: &str = "#define";

/// Ordered list of asset entries with a symbol index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    name: String,
    param: String,
    entries: Vec<AssetEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// Result of checking a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub entries: usize,
    pub expected: Option<usize>,
    pub ok: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Manifest {
    pub fn new(name: impl Into<String>, entries: Vec<AssetEntry>) -> Self {
        Self::with_param(name, DEFAULT_PARAM, entries)
    }

    pub fn with_param(
        name: impl Into<String>,
        param: impl Into<String>,
        entries: Vec<AssetEntry>,
    ) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            // First definition wins; repeats are reported by validate()
            index.entry(entry.symbol.clone()).or_insert(i);
        }
        Self {
            name: name.into(),
            param: param.into(),
            entries,
            index,
        }
    }

    /// Parse the X-macro text format
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

        let (header_line, header) = loop {
            match lines.next() {
                Some((_, line)) if line.trim().is_empty() => continue,
                Some(found) => break found,
                None => return Err(ManifestError::MissingHeader { line: 1 }),
            }
        };
        let (name, param, mut open) = parse_header(header)
            .ok_or(ManifestError::MissingHeader { line: header_line })?;

        let mut entries = Vec::new();
        for (line_no, line) in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                // A blank line terminates the macro body
                open = false;
                continue;
            }
            if !open {
                return Err(ManifestError::RowAfterEnd { line: line_no });
            }

            let (body, continued) = match trimmed.strip_suffix('\\') {
                Some(body) => (body.trim_end(), true),
                None => (trimmed, false),
            };
            let entry = parse_row(body, &param).map_err(|reason| ManifestError::MalformedRow {
                line: line_no,
                reason,
            })?;
            entries.push(entry);
            open = continued;
        }

        Ok(Self::with_param(name, param, entries))
    }

    /// Render the canonical X-macro text. Symbols and paths are written as
    /// they are; only a manifest that passes [`Manifest::validate`] is
    /// guaranteed to parse back to itself.
    pub fn render(&self) -> String {
        let mut out = format!("{DEFINE} {}({}) \\\n", self.name, self.param);
        let last = self.entries.len().saturating_sub(1);
        for (i, entry) in self.entries.iter().enumerate() {
            out.push_str(&format!(
                "\t{}({}, \"{}\")",
                self.param, entry.symbol, entry.path
            ));
            if i != last {
                out.push_str(" \\");
            }
            out.push('\n');
        }
        out
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.symbol.as_str())
    }

    pub fn get(&self, symbol: &str) -> Option<&AssetEntry> {
        self.index.get(symbol).map(|&i| &self.entries[i])
    }

    pub fn get_by_path(&self, path: &str) -> Option<&AssetEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Every rule violation, in row order
    pub fn validate(&self) -> Vec<ManifestError> {
        let mut errors = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();

        if !is_valid_symbol(&self.name) || !is_valid_symbol(&self.param) {
            errors.push(ManifestError::InvalidHeader {
                name: self.name.clone(),
                param: self.param.clone(),
            });
        }

        for (i, entry) in self.entries.iter().enumerate() {
            let row = i + 1;

            if !is_valid_symbol(&entry.symbol) {
                errors.push(ManifestError::InvalidSymbol {
                    row,
                    symbol: entry.symbol.clone(),
                });
            }

            if let Some(&first) = seen.get(entry.symbol.as_str()) {
                errors.push(ManifestError::DuplicateSymbol {
                    row,
                    first,
                    symbol: entry.symbol.clone(),
                });
            } else {
                seen.insert(&entry.symbol, row);
            }

            if let Err(problem) = check_path(&entry.path) {
                errors.push(ManifestError::InvalidPath {
                    row,
                    path: entry.path.clone(),
                    problem,
                });
            }
        }

        errors
    }

    /// Validate and, when given, compare the entry count against what a
    /// generated table expects
    pub fn check(&self, expected_count: Option<usize>) -> CheckReport {
        let mut errors: Vec<String> = self.validate().iter().map(|e| e.to_string()).collect();

        if let Some(expected) = expected_count {
            if expected != self.len() {
                errors.push(
                    ManifestError::CountMismatch {
                        expected,
                        found: self.len(),
                    }
                    .to_string(),
                );
            }
        }

        let mut warnings = Vec::new();
        let mut paths: HashMap<&str, &str> = HashMap::new();
        for entry in &self.entries {
            if let Some(other) = paths.insert(&entry.path, &entry.symbol) {
                warnings.push(format!(
                    "path `{}` is listed by both `{}` and `{}`",
                    entry.path, other, entry.symbol
                ));
            }
        }
        if self.is_empty() {
            warnings.push("manifest has no entries".to_string());
        } else if self.get_by_path("VERSION").is_none() {
            warnings.push("manifest has no VERSION entry".to_string());
        }

        CheckReport {
            name: self.name.clone(),
            entries: self.len(),
            expected: expected_count,
            ok: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// The manifest, or its first rule violation
    pub fn into_validated(self) -> Result<Self, ManifestError> {
        match self.validate().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

impl FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a AssetEntry;
    type IntoIter = std::slice::Iter<'a, AssetEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// `#define NAME(PARAM) \` -> (name, param, continued)
fn parse_header(line: &str) -> Option<(String, String, bool)> {
    let rest = line.trim().strip_prefix(DEFINE)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();

    let open = rest.find('(')?;
    let close = rest.find(')')?;
    if close < open {
        return None;
    }
    let name = &rest[..open];
    let param = rest[open + 1..close].trim();
    if !is_valid_symbol(name) || !is_valid_symbol(param) {
        return None;
    }

    let continued = match rest[close + 1..].trim() {
        "" => false,
        "\\" => true,
        _ => return None,
    };
    Some((name.to_string(), param.to_string(), continued))
}

/// `PARAM(SYMBOL, "path")`
fn parse_row(body: &str, param: &str) -> Result<AssetEntry, String> {
    let args = body
        .strip_prefix(param)
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('('))
        .ok_or_else(|| format!("expected `{param}(`"))?;
    let args = args
        .strip_suffix(')')
        .ok_or_else(|| "missing closing `)`".to_string())?;

    let (symbol, path) = args
        .split_once(',')
        .ok_or_else(|| "expected `SYMBOL, \"path\"`".to_string())?;
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err("missing symbol".to_string());
    }

    let path = path.trim();
    let path = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .ok_or_else(|| "path must be a double-quoted string".to_string())?;
    if path.contains('"') {
        return Err("path contains an unescaped quote".to_string());
    }

    Ok(AssetEntry::new(symbol, path))
}
