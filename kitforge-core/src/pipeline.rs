use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::kit::{Document, Indent};
use crate::migrate::{migrate, needs_migration};
use crate::rewrite::{rewrite_document, SubstitutionTable};
use crate::variation::{instantiate_all, template_path, variant_path, GenerationPlan};
use crate::{KitError, Result};

pub const KIT_EXTENSION: &str = "kit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub indent: Indent,
    /// Log what would be written without touching disk.
    pub dry_run: bool,
}

impl PipelineOptions {
    pub fn new(indent: Indent) -> Self {
        Self {
            indent,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub files_seen: usize,
    pub files_written: usize,
    pub substitutions: usize,
}

/// Every `.kit` file under `base`, sorted by path.
pub fn find_kit_files(base: &Path) -> Result<Vec<PathBuf>> {
    if !base.exists() {
        return Err(KitError::Config(format!(
            "Input path does not exist: {}",
            base.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(base).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext == KIT_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn write_kit(doc: &Document, path: &Path, options: PipelineOptions) -> Result<bool> {
    if options.dry_run {
        warn!(path = %path.display(), "dry run, not writing");
        return Ok(false);
    }
    doc.save(path, options.indent)?;
    Ok(true)
}

/// Expands every template of `plan` into its numbered variants.
pub fn run_generate(
    plan: &GenerationPlan,
    root_override: Option<&Path>,
    options: PipelineOptions,
) -> Result<BatchReport> {
    let jobs = plan.resolve(root_override)?;
    let mut report = BatchReport::default();

    for job in &jobs {
        info!(prefix = %job.prefix.display(), "Processing");
        let template = Document::load(&template_path(&job.prefix))?;
        report.files_seen += 1;

        for (i, doc) in instantiate_all(&template, &job.variations)
            .iter()
            .enumerate()
        {
            let out = variant_path(&job.prefix, i + 1);
            info!(path = %out.display(), "Writing");
            if write_kit(doc, &out, options)? {
                report.files_written += 1;
            }
        }
    }

    Ok(report)
}

/// Migrates every legacy `.kit` under `base` in place. Up to date files are
/// left alone.
pub fn run_migrate(base: &Path, options: PipelineOptions) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for path in find_kit_files(base)? {
        report.files_seen += 1;
        let doc = Document::load(&path)?;
        if !needs_migration(&doc) {
            debug!(path = %path.display(), version = doc.version(), "already current");
            continue;
        }

        info!(path = %path.display(), "Converting");
        if write_kit(&migrate(&doc), &path, options)? {
            report.files_written += 1;
        }
    }

    Ok(report)
}

/// Applies `table` to every `.kit` under `base` and writes each one back.
pub fn run_substitute(
    base: &Path,
    table: &SubstitutionTable,
    options: PipelineOptions,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for path in find_kit_files(base)? {
        report.files_seen += 1;
        info!(path = %path.display(), "Processing");

        let doc = Document::load(&path)?;
        let rewritten = rewrite_document(&doc, table);
        report.substitutions += rewritten.substitutions;

        if write_kit(&rewritten.document, &path, options)? {
            report.files_written += 1;
        }
    }

    Ok(report)
}
