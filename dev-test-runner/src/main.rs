//! Checks every `X.json` / `X` pair under a fixtures directory in both
//! directions.
//!
//! ```text
//! dev-test-runner [FIXTURES_DIR] [NAME_REGEX]
//! ```
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use json_hcl::{Dialect, hcl_to_json, json_to_hcl};
use regex::Regex;
use serde_json::Value;

struct Fixture {
    name: String,
    json: PathBuf,
    hcl: PathBuf,
}

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let dir = PathBuf::from(args.next().unwrap_or_else(|| "fixtures".to_string()));
    let filter = match args.next().map(|pattern| Regex::new(&pattern)).transpose() {
        Ok(filter) => filter,
        Err(error) => {
            eprintln!("invalid filter: {error}");
            return ExitCode::FAILURE;
        }
    };

    let fixtures = match discover(&dir) {
        Ok(fixtures) => fixtures,
        Err(error) => {
            eprintln!("cannot read {}: {error}", dir.display());
            return ExitCode::FAILURE;
        }
    };

    let mut failed = 0;
    let mut ran = 0;
    for fixture in fixtures.iter().filter(|f| filter.as_ref().is_none_or(|re| re.is_match(&f.name))) {
        ran += 1;
        match check(fixture) {
            Ok(()) => println!("{} {}", "ok".green(), fixture.name),
            Err(report) => {
                failed += 1;
                println!("{} {}\n{report}", "FAIL".red().bold(), fixture.name);
            }
        }
    }

    println!("{} fixtures, {failed} failed", ran);
    if failed > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn discover(dir: &Path) -> std::io::Result<Vec<Fixture>> {
    let mut fixtures = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).and_then(|n| n.strip_suffix(".json")) else {
            continue;
        };
        let hcl = dir.join(name);
        if hcl.is_file() {
            fixtures.push(Fixture { name: name.to_string(), json: path.clone(), hcl });
        }
    }
    fixtures.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(fixtures)
}

/// HCL output is compared as text, JSON output as values.
fn check(fixture: &Fixture) -> Result<(), String> {
    let json_text = std::fs::read_to_string(&fixture.json).map_err(|e| e.to_string())?;
    let hcl_text = std::fs::read_to_string(&fixture.hcl).map_err(|e| e.to_string())?;

    let dialect = Dialect::for_output_name(&fixture.name);
    let rendered = json_to_hcl(&json_text, dialect).map_err(|e| format!("json → hcl: {e}"))?;
    if rendered != hcl_text {
        return Err(format!("json → hcl mismatch\n--- expected\n{hcl_text}--- actual\n{rendered}"));
    }

    let expected: Value = serde_json::from_str(&json_text).map_err(|e| e.to_string())?;
    let actual = hcl_to_json(&hcl_text).map_err(|e| format!("hcl → json: {e}"))?;
    if actual != expected {
        return Err(format!("hcl → json mismatch\n--- expected\n{expected:#}\n--- actual\n{actual:#}"));
    }
    Ok(())
}
