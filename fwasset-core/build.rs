//! Build script that expands `manifest/fileList.h` into Rust: one
//! `BuiltinAsset` variant per row plus parallel symbol/path tables.
//! `src/builtin.rs` includes the result from `OUT_DIR`.
//!
//! A malformed row or a repeated symbol fails the build.

use std::collections::HashSet;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const MANIFEST: &str = "manifest/fileList.h";
const OUTPUT: &str = "builtin_manifest.rs";

// Identifiers that cannot be raw identifiers
const RESERVED: &[&str] = &["_", "self", "Self", "super", "crate"];

fn main() {
    println!("cargo::rerun-if-changed={MANIFEST}");
    println!("cargo::rerun-if-changed=build.rs");

    let text = fs::read_to_string(MANIFEST).unwrap_or_else(|e| panic!("Failed to read {MANIFEST}: {e}"));
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next().unwrap_or_else(|| panic!("{MANIFEST} is empty"));
    let (name, param) = parse_header(header);

    let mut rows: Vec<(String, String)> = Vec::new();
    let mut seen = HashSet::new();
    for (index, line) in lines {
        let line_no = index + 1;
        let body = line.trim();
        let body = body.strip_suffix('\\').unwrap_or(body).trim_end();

        let args = body
            .strip_prefix(param.as_str())
            .and_then(|rest| rest.trim_start().strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or_else(|| panic!("{MANIFEST}:{line_no}: malformed row `{body}`"));
        let (symbol, path) = args
            .split_once(',')
            .unwrap_or_else(|| panic!("{MANIFEST}:{line_no}: expected `SYMBOL, \"path\"`"));
        let symbol = symbol.trim().to_string();
        let path = path
            .trim()
            .strip_prefix('"')
            .and_then(|p| p.strip_suffix('"'))
            .unwrap_or_else(|| panic!("{MANIFEST}:{line_no}: path must be quoted"))
            .to_string();

        if !is_identifier(&symbol) || RESERVED.contains(&symbol.as_str()) {
            panic!("{MANIFEST}:{line_no}: `{symbol}` cannot be used as a symbol");
        }
        if !seen.insert(symbol.clone()) {
            panic!("{MANIFEST}:{line_no}: duplicate symbol `{symbol}`");
        }
        rows.push((symbol, path));
    }

    let out_dir = env::var_os("OUT_DIR").unwrap();
    let out_path = Path::new(&out_dir).join(OUTPUT);
    fs::write(&out_path, generate(&name, &param, &rows)).expect("Failed to write builtin manifest");
}

fn parse_header(line: &str) -> (String, String) {
    let rest = line
        .trim()
        .strip_prefix("#define")
        .unwrap_or_else(|| panic!("{MANIFEST}: first line must be a #define"))
        .trim_start();
    let open = rest.find('(').expect("header has no `(`");
    let close = rest.find(')').expect("header has no `)`");
    (
        rest[..open].trim().to_string(),
        rest[open + 1..close].trim().to_string(),
    )
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn generate(name: &str, param: &str, rows: &[(String, String)]) -> String {
    let mut out = String::new();
    let count = rows.len();

    writeln!(out, "// Generated by build.rs from {MANIFEST}. Do not edit.").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "pub(crate) const BUILTIN_NAME: &str = {name:?};").unwrap();
    writeln!(out, "pub(crate) const BUILTIN_PARAM: &str = {param:?};").unwrap();
    writeln!(out).unwrap();

    writeln!(out, "/// Assets listed in the builtin manifest").unwrap();
    writeln!(out, "#[allow(non_camel_case_types)]").unwrap();
    writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]").unwrap();
    writeln!(out, "pub enum BuiltinAsset {{").unwrap();
    for (symbol, _) in rows {
        writeln!(out, "    r#{symbol},").unwrap();
    }
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();

    writeln!(out, "impl BuiltinAsset {{").unwrap();
    writeln!(out, "    /// Every builtin asset, in manifest order").unwrap();
    writeln!(out, "    pub const ALL: [BuiltinAsset; {count}] = [").unwrap();
    for (symbol, _) in rows {
        writeln!(out, "        BuiltinAsset::r#{symbol},").unwrap();
    }
    writeln!(out, "    ];").unwrap();
    writeln!(out).unwrap();

    for (getter, pick) in [("symbol", 0usize), ("path", 1usize)] {
        writeln!(out, "    pub const fn {getter}(self) -> &'static str {{").unwrap();
        writeln!(out, "        match self {{").unwrap();
        for row in rows {
            let value = if pick == 0 { &row.0 } else { &row.1 };
            writeln!(out, "            BuiltinAsset::r#{} => {value:?},", row.0).unwrap();
        }
        if rows.is_empty() {
            writeln!(out, "            _ => unreachable!(),").unwrap();
        }
        writeln!(out, "        }}").unwrap();
        writeln!(out, "    }}").unwrap();
        writeln!(out).unwrap();
    }
    writeln!(out, "}}").unwrap();

    out
}
