//! Minimal CLI: artifacts → (doc | check)
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use crate::abi::{self, AbiEntry, EntryKind};
use crate::openapi;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate OpenAPI documents from compiled contract interface artifacts
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate and write (or print) one OpenAPI document per artifact
    Doc(DocOut),
    /// parse artifacts and report endpoints and diagnostics without writing
    Check(CheckReport),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more artifact JSON files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// Contract name override for artifacts that carry none (bare ABI arrays)
    #[arg(long)]
    contract: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct DocOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// configured title suffix for the document info block
    #[arg(long, default_value = "Smart Contract API")]
    title: String,

    /// output directory for `{Contract}-openapi.json` files (stdout if omitted)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckReport {
    #[command(flatten)]
    input_settings: InputSettings,

    /// configured title suffix for the document info block
    #[arg(long, default_value = "Smart Contract API")]
    title: String,
}

/// One artifact after loading: a name to key the document by, plus its ABI.
#[derive(Debug, Clone)]
struct LoadedArtifact {
    contract_name: String,
    abi: Vec<AbiEntry>,
    source_path: PathBuf,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<LoadedArtifact>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut out = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read artifact file {}", source_path.display()))?;
            let artifact = abi::parse_artifact(&source)
                .with_context(|| format!("failed to parse artifact JSON ({})", source_path.display()))?;

            let contract_name = self
                .contract
                .clone()
                .or_else(|| artifact.contract_name().map(str::to_string))
                .ok_or_else(|| anyhow!(
                    "artifact {} carries no contract name; pass --contract",
                    source_path.display(),
                ))?;

            out.push(LoadedArtifact {
                contract_name,
                abi: artifact.abi().to_vec(),
                source_path,
            });
        }
        Ok(out)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Doc(target) => run_doc(target),
            Command::Check(target) => run_check(target),
        }
    }
}

fn run_doc(target: &DocOut) -> Result<()> {
    let artifacts = target.input_settings.load()?;

    match target.out_dir.as_ref() {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory {}", dir.display()))?;
            // each document is an independent invocation
            artifacts
                .par_iter()
                .map(|artifact| generate_to_dir(artifact, &target.title, dir))
                .collect::<Result<Vec<()>>>()?;
        }
        None => {
            for artifact in &artifacts {
                let json_src = generate_document(artifact, &target.title)?;
                println!("{json_src}");
            }
        }
    }
    Ok(())
}

fn generate_document(artifact: &LoadedArtifact, title: &str) -> Result<String> {
    let assembled = openapi::assemble(&artifact.abi, &artifact.contract_name, title)
        .with_context(|| format!(
            "failed to generate document for {} ({})",
            artifact.contract_name,
            artifact.source_path.display(),
        ))?;
    report_diagnostics(&artifact.contract_name, &assembled.diagnostics);
    Ok(serde_json::to_string_pretty(&assembled.document.to_json())?)
}

fn generate_to_dir(artifact: &LoadedArtifact, title: &str, dir: &std::path::Path) -> Result<()> {
    let json_src = generate_document(artifact, title)?;
    let out_path = dir.join(format!("{}-openapi.json", artifact.contract_name));
    std::fs::write(&out_path, &json_src)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    eprintln!(
        "{} generated {}",
        "✓".green(),
        out_path.display().to_string().bold(),
    );
    Ok(())
}

fn run_check(target: &CheckReport) -> Result<()> {
    let artifacts = target.input_settings.load()?;
    let mut failures = 0usize;

    for artifact in &artifacts {
        eprintln!(
            "{} ({})",
            artifact.contract_name.bold(),
            artifact.source_path.display(),
        );
        for entry in &artifact.abi {
            if entry.kind != EntryKind::Function {
                continue;
            }
            let verb = openapi::Verb::for_mutability(entry.state_mutability);
            eprintln!(
                "  {}  /api/{}/{}  [{}]",
                format!("{:<4}", verb.as_str()).cyan(),
                artifact.contract_name,
                entry.name,
                entry.state_mutability.as_str(),
            );
        }
        match openapi::assemble(&artifact.abi, &artifact.contract_name, &target.title) {
            Ok(assembled) => {
                report_diagnostics(&artifact.contract_name, &assembled.diagnostics);
            }
            Err(error) => {
                failures += 1;
                eprintln!("  {} {error}", "error:".red());
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} artifact(s) failed the check", artifacts.len());
    }
    Ok(())
}

fn report_diagnostics(contract_name: &str, diagnostics: &[crate::mapper::Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{} {contract_name}: {diagnostic}", "warning:".yellow());
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // Treat as a glob pattern
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // Treat as a literal path
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
