//! CLI: JSON → HCL (`hcl`) and HCL → JSON (`json`).
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use json_hcl::config::{Loader, PROJECT_FILE, Settings};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert between JSON documents and HCL native syntax
#[derive(Parser, Debug)]
#[command(name = "json-hcl", version)]
pub struct CommandLineInterface {
    /// settings file layered over the defaults and ./json-hcl.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// convert JSON to HCL
    Hcl(HclOut),
    /// convert HCL to JSON
    Json(JsonOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., default_value = "-")]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    /// output file (stdout if omitted)
    #[arg(short, long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// write one output per input into this directory; needed for several inputs
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct HclOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    output_settings: OutputSettings,

    /// turn well-known top-level keys into blocks
    #[arg(long, conflicts_with = "nested")]
    blocks: bool,

    /// keep objects as nested values (variable-definition files)
    #[arg(long)]
    nested: bool,
}

#[derive(clap::Parser, Debug)]
struct JsonOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    output_settings: OutputSettings,

    /// JSON indent width, 0 for compact output
    #[arg(long)]
    indent: Option<usize>,
}

/// Where one document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    ToHcl,
    ToJson,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let settings = self.settings()?;
        tracing::debug!(?settings, "loaded settings");
        let (direction, input_settings, output_settings) = match &self.cmd {
            Command::Hcl(target) => (Direction::ToHcl, &target.input_settings, &target.output_settings),
            Command::Json(target) => (Direction::ToJson, &target.input_settings, &target.output_settings),
        };
        let sources = input_settings.sources()?;
        if sources.len() > 1 && output_settings.out_dir.is_none() {
            bail!("{} inputs given; pass --out-dir to write one output per input", sources.len());
        }

        let results: Vec<(String, anyhow::Result<()>)> = sources
            .par_iter()
            .map(|source| (source.label(), convert_one(direction, source, output_settings, &settings)))
            .collect();

        let failed = results.iter().filter(|(_, result)| result.is_err()).count();
        for (label, result) in &results {
            if let Err(error) = result {
                eprintln!("{} {}: {error:#}", "error:".red().bold(), label.as_str().bold());
            }
        }
        if failed > 0 {
            bail!("{failed} of {} inputs failed", results.len());
        }
        Ok(())
    }

    /// Defaults, then ./json-hcl.toml, then --config, then flags.
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut loader = Loader::new().with_optional_file(PROJECT_FILE);
        if let Some(path) = &self.config {
            loader = loader.with_file(path);
        }
        match &self.cmd {
            Command::Hcl(target) if target.blocks => loader = loader.set_override("convert.dialect", "blocks")?,
            Command::Hcl(target) if target.nested => loader = loader.set_override("convert.dialect", "nested")?,
            Command::Json(JsonOut { indent: Some(indent), .. }) => {
                loader = loader.set_override("output.json_indent", *indent as i64)?;
            }
            _ => {}
        }
        loader.build().context("failed to load settings")
    }
}

impl InputSettings {
    fn sources(&self) -> anyhow::Result<Vec<Source>> {
        let (stdin, patterns): (Vec<&String>, Vec<&String>) = self.input.iter().partition(|raw| *raw == "-");
        let mut sources: Vec<Source> = stdin.iter().take(1).map(|_| Source::Stdin).collect();
        let paths = resolve_file_path_patterns(patterns).map_err(|error| anyhow::anyhow!("{error}"))?;
        sources.extend(paths.into_iter().map(Source::File));
        Ok(sources)
    }
}

impl Source {
    fn label(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }

    fn read(&self) -> anyhow::Result<String> {
        match self {
            Source::Stdin => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
                Ok(text)
            }
            Source::File(path) => {
                std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
            }
        }
    }
}

fn convert_one(direction: Direction, source: &Source, output: &OutputSettings, settings: &Settings) -> anyhow::Result<()> {
    let destination = destination(direction, source, output)?;
    let text = source.read()?;
    let rendered = match direction {
        Direction::ToHcl => {
            let output_name = destination.as_deref().and_then(Path::file_name).and_then(|name| name.to_str());
            let dialect = settings.convert.dialect.resolve(output_name);
            tracing::debug!(source = %source.label(), ?dialect, "json → hcl");
            json_hcl::json_to_hcl(&text, dialect)?
        }
        Direction::ToJson => {
            tracing::debug!(source = %source.label(), "hcl → json");
            let value = json_hcl::hcl_to_json(&text)?;
            let mut rendered = json_hcl::json::to_string(&value, settings.output.json_indent);
            if settings.output.trailing_newline {
                rendered.push('\n');
            }
            rendered
        }
    };
    match destination {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// `None` means stdout.
fn destination(direction: Direction, source: &Source, output: &OutputSettings) -> anyhow::Result<Option<PathBuf>> {
    if let Some(out) = &output.out {
        return Ok(Some(out.clone()));
    }
    let Some(dir) = &output.out_dir else {
        return Ok(None);
    };
    let Source::File(path) = source else {
        bail!("cannot name an output for stdin; use --out");
    };
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        bail!("cannot name an output for {}", path.display());
    };
    Ok(Some(dir.join(output_name(direction, name))))
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// `x.tf.json` → `x.tf`, `x.json` → `x.tf`, `x.tf` → `x.tf.json`.
fn output_name(direction: Direction, input_name: &str) -> String {
    match direction {
        Direction::ToHcl => {
            let stem = input_name.strip_suffix(".json").unwrap_or(input_name);
            if Path::new(stem).extension().is_some() {
                stem.to_string()
            } else {
                format!("{stem}.tf")
            }
        }
        Direction::ToJson => format!("{input_name}.json"),
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                match entry {
                    Ok(p) => {
                        matched_any = true;
                        out.push(p);
                    }
                    Err(e) => return Err(Box::new(e)),
                }
            }
            if !matched_any {
                return Err(format!("glob pattern matched no files: {pattern}").into());
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
