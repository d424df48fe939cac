//! Runs one bundle per entry and collects what the binary reports.

use crate::args::CliArgs;
use crate::config::{OutputConfig, load_config};
use anyhow::{Context, Result, bail};
use dtsz_binder::ProgramBuilder;
use dtsz_bundler::{BundleOptions, RenamedSymbol, bundle};
use dtsz_common::Diagnostic;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

/// One entry to bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleJob {
    pub entry: PathBuf,
    pub out_file: Option<PathBuf>,
    pub options: BundleOptions,
}

#[derive(Debug)]
pub struct EntryResult {
    pub entry: PathBuf,
    /// Where the bundle was written; `None` means the caller prints `text`.
    pub out_file: Option<PathBuf>,
    pub text: String,
    pub renamed: Vec<RenamedSymbol>,
    /// Sources of the bundled files, for the reporter.
    pub sources: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct CompilationResult {
    pub entries: Vec<EntryResult>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Entries from the config file followed by the ones named on the command
/// line. CLI output flags override per-entry settings.
pub fn resolve_jobs(args: &CliArgs, cwd: &Path) -> Result<Vec<BundleJob>> {
    let mut jobs = Vec::new();

    if let Some(config_path) = &args.config {
        let config = load_config(&cwd.join(config_path))?;
        for entry in config.entries {
            jobs.push(BundleJob {
                entry: entry.file_path,
                out_file: entry.out_file,
                options: apply_cli_overrides(entry.output.to_options(), args),
            });
        }
    }

    if args.out_file.is_some() && args.files.len() != 1 {
        bail!("--out-file requires exactly one entry file");
    }
    let cli_options = apply_cli_overrides(OutputConfig::default().to_options(), args);
    for file in &args.files {
        jobs.push(BundleJob {
            entry: cwd.join(file),
            out_file: args.out_file.as_ref().map(|out| cwd.join(out)),
            options: cli_options.clone(),
        });
    }

    if jobs.is_empty() {
        bail!("no entry files given; pass FILES or --config");
    }
    Ok(jobs)
}

fn apply_cli_overrides(mut options: BundleOptions, args: &CliArgs) -> BundleOptions {
    options.no_banner |= args.no_banner;
    options.sort_nodes |= args.sort;
    options.inline_declare_global |= args.inline_declare_global;
    options.inline_declare_externals |= args.inline_declare_externals;
    if let Some(export_referenced_types) = args.export_referenced_types {
        options.export_referenced_types = export_referenced_types;
    }
    options
}

pub fn run(args: &CliArgs, cwd: &Path) -> Result<CompilationResult> {
    let jobs = resolve_jobs(args, cwd)?;
    let mut result = CompilationResult::default();
    for job in &jobs {
        let entry = run_job(job, &mut result.diagnostics)?;
        result.entries.push(entry);
    }
    Ok(result)
}

/// Load, bundle and write one entry. Bundler errors are fatal.
pub fn run_job(job: &BundleJob, diagnostics: &mut Vec<Diagnostic>) -> Result<EntryResult> {
    let _span = info_span!("entry", entry = %job.entry.display()).entered();

    let mut builder = ProgramBuilder::new();
    builder
        .load_from_disk(std::slice::from_ref(&job.entry))
        .with_context(|| format!("failed to load {}", job.entry.display()))?;
    let program = builder.build();
    diagnostics.extend(program.all_diagnostics());

    let output = bundle(&program, &job.entry, &job.options)
        .with_context(|| format!("failed to bundle {}", job.entry.display()))?;
    diagnostics.extend(output.diagnostics);

    for renamed in &output.renamed {
        info!(
            file = %renamed.file,
            original = %renamed.original,
            name = %renamed.name,
            "renamed declaration"
        );
    }

    if let Some(out_file) = &job.out_file {
        if let Some(parent) = out_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(out_file, &output.text)
            .with_context(|| format!("failed to write {}", out_file.display()))?;
        info!(out_file = %out_file.display(), bytes = output.text.len(), "wrote bundle");
    }

    let sources = program
        .source_files()
        .map(|file| (file.file_name.clone(), file.arena.source_text().to_string()))
        .collect();

    Ok(EntryResult {
        entry: job.entry.clone(),
        out_file: job.out_file.clone(),
        text: output.text,
        renamed: output.renamed,
        sources,
    })
}
